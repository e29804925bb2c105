//  Copyright (C) 2023 IBM Corp.
//
//  This library is free software; you can redistribute it and/or
//  modify it under the terms of the GNU Lesser General Public
//  License as published by the Free Software Foundation; either
//  version 2.1 of the License, or (at your option) any later version.
//
//  This library is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
//  Lesser General Public License for more details.
//
//  You should have received a copy of the GNU Lesser General Public
//  License along with this library; if not, write to the Free Software
//  Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301
//  USA

use std::io::Cursor;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use quick_xml::events::BytesText;
use quick_xml::writer::Writer;
use uuid::Uuid;

use crate::error::Error;

pub const NS_SOAP_ENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const NS_WST: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512";
pub const NS_WSU: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
pub const NS_WSSE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";

pub const WST_ISSUE: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Issue";
pub const WST_ISSUE_ACTION: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RST/Issue";
pub const WST_BEARER: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Bearer";
pub const SAML2_TOKEN_TYPE: &str = "urn:oasis:names:tc:SAML:2.0:assertion";
const PASSWORD_TEXT: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

/// Validity window requested for issued tokens.
pub const TOKEN_LIFETIME_HOURS: i64 = 2;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A SOAP 1.1 operation: the two fragments that go inside the envelope.
pub trait SoapRequest {
    fn header_xml(&self) -> Result<String, Error>;
    fn body_xml(&self) -> Result<String, Error>;

    fn envelope_xml(&self) -> Result<String, Error> {
        Ok(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="{soap}" xmlns:wst="{wst}" xmlns:wsu="{wsu}" xmlns:wsse="{wsse}">
  <soapenv:Header>{header}</soapenv:Header>
  <soapenv:Body>{body}</soapenv:Body>
</soapenv:Envelope>
"#,
            soap = NS_SOAP_ENV,
            wst = NS_WST,
            wsu = NS_WSU,
            wsse = NS_WSSE,
            header = self.header_xml()?,
            body = self.body_xml()?,
        ))
    }
}

/// WS-Trust `Issue` request for a bearer SAML token, authenticated with a
/// plaintext WS-Security username token.
pub struct IssueRequest {
    created: DateTime<Utc>,
    expires: DateTime<Utc>,
    delegatable: bool,
    token_id: String,
    username: String,
    password: String,
}

impl IssueRequest {
    pub fn new(username: &str, password: &str) -> Result<Self, Error> {
        Self::at(Utc::now(), username, password)
    }

    /// Request whose validity window starts at `now`.
    pub fn at(now: DateTime<Utc>, username: &str, password: &str) -> Result<Self, Error> {
        if username.is_empty() {
            return Err("SSO username must not be empty".into());
        }
        if password.is_empty() {
            return Err("SSO password must not be empty".into());
        }

        // whole milliseconds, so the rendered window is exactly the lifetime
        let created = now.trunc_subsecs(3);

        Ok(Self {
            created,
            expires: created + Duration::hours(TOKEN_LIFETIME_HOURS),
            delegatable: true,
            token_id: format!("SecurityToken-{}", Uuid::new_v4()),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn created(&self) -> String {
        self.created.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn expires(&self) -> String {
        self.expires.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    pub fn delegatable(&self) -> bool {
        self.delegatable
    }
}

impl SoapRequest for IssueRequest {
    fn header_xml(&self) -> Result<String, Error> {
        let created = self.created();
        let expires = self.expires();

        let mut w = Writer::new(Cursor::new(Vec::new()));
        w.create_element("wsse:Security")
            .write_inner_content(|w| {
                w.create_element("wsu:Timestamp")
                    .write_inner_content(|w| {
                        w.create_element("wsu:Created")
                            .write_text_content(BytesText::new(&created))?;
                        w.create_element("wsu:Expires")
                            .write_text_content(BytesText::new(&expires))?;
                        Ok(())
                    })?;

                w.create_element("wsse:UsernameToken")
                    .with_attribute(("wsu:Id", self.token_id.as_str()))
                    .write_inner_content(|w| {
                        w.create_element("wsse:Username")
                            .write_text_content(BytesText::new(&self.username))?;
                        w.create_element("wsse:Password")
                            .with_attribute(("Type", PASSWORD_TEXT))
                            .write_text_content(BytesText::new(&self.password))?;
                        Ok(())
                    })?;

                Ok(())
            })?;

        Ok(String::from_utf8(w.into_inner().into_inner())?)
    }

    fn body_xml(&self) -> Result<String, Error> {
        let created = self.created();
        let expires = self.expires();
        let delegatable = self.delegatable.to_string();

        let mut w = Writer::new(Cursor::new(Vec::new()));
        w.create_element("wst:RequestSecurityToken")
            .write_inner_content(|w| {
                w.create_element("wst:TokenType")
                    .write_text_content(BytesText::new(SAML2_TOKEN_TYPE))?;
                w.create_element("wst:RequestType")
                    .write_text_content(BytesText::new(WST_ISSUE))?;

                w.create_element("wst:Lifetime")
                    .write_inner_content(|w| {
                        w.create_element("wsu:Created")
                            .write_text_content(BytesText::new(&created))?;
                        w.create_element("wsu:Expires")
                            .write_text_content(BytesText::new(&expires))?;
                        Ok(())
                    })?;

                w.create_element("wst:KeyType")
                    .write_text_content(BytesText::new(WST_BEARER))?;
                w.create_element("wst:Delegatable")
                    .write_text_content(BytesText::new(&delegatable))?;

                Ok(())
            })?;

        Ok(String::from_utf8(w.into_inner().into_inner())?)
    }
}

#[cfg(test)]
mod test {
    use chrono::{NaiveDateTime, TimeZone};

    use super::*;

    fn parse_stamp(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    pub fn test_window_is_two_hours() {
        let r = IssueRequest::new("administrator@vsphere.local", "secret").unwrap();

        eprintln!("{} -> {}", r.created(), r.expires());

        let created = parse_stamp(&r.created());
        let expires = parse_stamp(&r.expires());
        assert_eq!(expires - created, Duration::hours(2));
        assert!(expires > created);
    }

    #[test]
    pub fn test_timestamp_format() {
        let now = Utc.with_ymd_and_hms(2023, 11, 5, 23, 30, 7).unwrap()
            + Duration::milliseconds(42)
            + Duration::microseconds(999);
        let r = IssueRequest::at(now, "user", "pass").unwrap();

        assert_eq!(r.created(), "2023-11-05T23:30:07.042Z");
        assert_eq!(r.expires(), "2023-11-06T01:30:07.042Z");
    }

    #[test]
    pub fn test_empty_credentials_rejected() {
        assert!(IssueRequest::new("", "pass").is_err());
        assert!(IssueRequest::new("user", "").is_err());
    }

    #[test]
    pub fn test_header() {
        let r = IssueRequest::new("user@vsphere.local", "p<ss&word").unwrap();
        let xml = r.header_xml().unwrap();

        eprintln!("{}", &xml);

        assert!(xml.starts_with("<wsse:Security>"));
        assert!(xml.contains(&format!("<wsu:Created>{}</wsu:Created>", r.created())));
        assert!(xml.contains(&format!("<wsu:Expires>{}</wsu:Expires>", r.expires())));
        assert!(xml.contains(&format!("wsu:Id=\"{}\"", r.token_id())));
        assert!(r.token_id().starts_with("SecurityToken-"));
        assert!(xml.contains("<wsse:Username>user@vsphere.local</wsse:Username>"));
        assert!(xml.contains("p&lt;ss&amp;word</wsse:Password>"));
        assert!(xml.contains("#PasswordText\""));
    }

    #[test]
    pub fn test_token_ids_differ() {
        let a = IssueRequest::new("u", "p").unwrap();
        let b = IssueRequest::new("u", "p").unwrap();
        assert_ne!(a.token_id(), b.token_id());
    }

    #[test]
    pub fn test_body() {
        let r = IssueRequest::new("user", "pass").unwrap();
        let xml = r.body_xml().unwrap();

        eprintln!("{}", &xml);

        assert!(xml.contains(&format!("<wst:RequestType>{}</wst:RequestType>", WST_ISSUE)));
        assert!(xml.contains("<wst:Delegatable>true</wst:Delegatable>"));
        assert!(xml.contains(&format!("<wst:KeyType>{}</wst:KeyType>", WST_BEARER)));
        assert!(r.delegatable());
    }

    #[test]
    pub fn test_envelope_namespaces() {
        let r = IssueRequest::new("user", "pass").unwrap();
        let xml = r.envelope_xml().unwrap();

        eprintln!("{}", &xml);

        for ns in [NS_SOAP_ENV, NS_WST, NS_WSU, NS_WSSE] {
            assert!(xml.contains(ns));
        }
        assert!(xml.contains("<soapenv:Header><wsse:Security>"));
        assert!(xml.contains("<soapenv:Body><wst:RequestSecurityToken>"));
    }
}
