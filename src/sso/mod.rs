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

//! Bearer token requests against the vCenter Single Sign-On STS.

use std::io::Write;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};
use url::Url;

pub mod request;
pub mod response;
pub mod token;
pub mod wsdl;

use request::{IssueRequest, SoapRequest};
pub use token::SamlToken;
use wsdl::ServiceDescription;

use crate::error::{Error, SoapFault};

pub struct SsoConnection {
    sso_url: Url,
    wsdl_url: Url,
    username: String,
    password: String,
    debug: bool,
    echo: Box<dyn Write + Send>,
    client: Client,
}

impl SsoConnection {
    /// Connection to the STS at `sso_url`. The WSDL is read from
    /// `<sso_url>?wsdl` unless `wsdl_url` is given. Raw SOAP traffic is
    /// echoed to stdout when `DEBUG` is set in the environment.
    pub fn new(sso_url: &str, wsdl_url: Option<&str>) -> Result<Self, Error> {
        let wsdl_url = match wsdl_url {
            Some(u) => Url::parse(u)?,
            None => default_wsdl_url(sso_url)?,
        };

        // the STS presents the vCenter's self-signed certificate
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .user_agent(concat!("knife-vcenter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            sso_url: Url::parse(sso_url)?,
            wsdl_url,
            username: String::new(),
            password: String::new(),
            debug: std::env::var_os("DEBUG").is_some(),
            echo: Box::new(std::io::stdout()),
            client,
        })
    }

    pub fn login(&mut self, username: &str, password: &str) -> &mut Self {
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    pub fn set_debug(&mut self, debug: bool) -> &mut Self {
        self.debug = debug;
        self
    }

    /// Send the debug echo somewhere other than stdout.
    pub fn set_debug_writer(&mut self, writer: Box<dyn Write + Send>) -> &mut Self {
        self.echo = writer;
        self
    }

    pub fn sso_url(&self) -> &Url {
        &self.sso_url
    }

    pub fn wsdl_url(&self) -> &Url {
        &self.wsdl_url
    }

    pub fn request_bearer_token(&mut self) -> Result<SamlToken, Error> {
        let request = IssueRequest::new(&self.username, &self.password)?;
        let envelope = request.envelope_xml()?;

        let service = self.describe_service()?;
        info!(
            "Requesting bearer token for {} from {}",
            self.username, service.endpoint
        );

        let (ok, body) = self.invoke(&service, envelope)?;

        match (ok, SamlToken::from_response(&body)) {
            (true, token) => token,
            (false, Err(e)) if e.is::<SoapFault>() => Err(e),
            (false, _) => Err(format!("STS at {} rejected the request", service.endpoint).into()),
        }
    }

    fn describe_service(&self) -> Result<ServiceDescription, Error> {
        debug!("Fetching WSDL from {}", self.wsdl_url);

        let wsdl = self
            .client
            .get(self.wsdl_url.clone())
            .send()?
            .error_for_status()?
            .text()?;

        ServiceDescription::parse(&wsdl)
    }

    /// POST the envelope, returning whether the HTTP status was a success
    /// and the response body.
    fn invoke(&mut self, service: &ServiceDescription, envelope: String) -> Result<(bool, String), Error> {
        self.echo(&envelope)?;

        let resp = self
            .client
            .post(service.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}\"", service.issue_action))
            .body(envelope)
            .send()?;

        let status = resp.status();
        debug!("STS answered {}", status);

        let body = resp.text()?;
        self.echo(&body)?;

        Ok((status.is_success(), body))
    }

    fn echo(&mut self, xml: &str) -> Result<(), Error> {
        if self.debug {
            writeln!(self.echo, "{}", xml)?;
            self.echo.flush()?;
        }
        Ok(())
    }
}

/// `<sso_url>?wsdl`
pub fn default_wsdl_url(sso_url: &str) -> Result<Url, Error> {
    Ok(Url::parse(&format!("{}?wsdl", sso_url))?)
}
