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

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use url::Url;

use crate::error::Error;
use crate::sso::request::WST_ISSUE_ACTION;

/// What the STS WSDL tells us about the `Issue` operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescription {
    pub endpoint: Url,
    pub issue_action: String,
}

fn attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>, Error> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

impl ServiceDescription {
    pub fn parse(wsdl: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(wsdl);

        let mut location = None;
        let mut issue_action = None;
        let mut operation: Option<String> = None;

        loop {
            let (e, empty) = match reader.read_event()? {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::End(e) => {
                    if e.local_name().as_ref() == b"operation" {
                        operation = None;
                    }
                    continue;
                }
                Event::Eof => break,
                _ => continue,
            };

            match e.local_name().as_ref() {
                b"address" if location.is_none() => {
                    location = attribute(&e, b"location")?;
                }
                b"operation" => {
                    // wsdl:operation carries the name, soap:operation the action
                    if let Some(action) = attribute(&e, b"soapAction")? {
                        let is_issue = operation
                            .as_deref()
                            .map_or(false, |op| op.eq_ignore_ascii_case("issue"));
                        if is_issue && issue_action.is_none() {
                            issue_action = Some(action);
                        }
                    } else if let Some(name) = attribute(&e, b"name")? {
                        if !empty {
                            operation = Some(name);
                        }
                    }
                }
                _ => {}
            }
        }

        let location = location.ok_or("WSDL does not name a service address")?;

        Ok(Self {
            endpoint: Url::parse(&location)?,
            issue_action: issue_action
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| WST_ISSUE_ACTION.to_string()),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const WSDL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/" xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/" xmlns:tns="http://docs.oasis-open.org/ws-sx/ws-trust/200512/wsdl" targetNamespace="http://docs.oasis-open.org/ws-sx/ws-trust/200512/wsdl">
  <wsdl:portType name="STSService_PortType">
    <wsdl:operation name="Issue">
      <wsdl:input message="tns:RequestSecurityTokenMsg"/>
      <wsdl:output message="tns:RequestSecurityTokenResponseCollectionMsg"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="STSService_Binding" type="tns:STSService_PortType">
    <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="Renew">
      <soap:operation soapAction="http://docs.oasis-open.org/ws-sx/ws-trust/200512/RST/Renew"/>
    </wsdl:operation>
    <wsdl:operation name="Issue">
      <soap:operation soapAction="http://docs.oasis-open.org/ws-sx/ws-trust/200512/RST/Issue"/>
      <wsdl:input><soap:body use="literal"/></wsdl:input>
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:service name="STSService">
    <wsdl:port name="STSService_Port" binding="tns:STSService_Binding">
      <soap:address location="https://vcsa.lab.example.com/sts/STSService/vsphere.local"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#;

    #[test]
    fn parse_sts_wsdl() {
        let d = ServiceDescription::parse(WSDL).unwrap();
        eprintln!("{:?}", d);

        assert_eq!(
            d.endpoint.as_str(),
            "https://vcsa.lab.example.com/sts/STSService/vsphere.local"
        );
        assert_eq!(d.issue_action, WST_ISSUE_ACTION);
    }

    #[test]
    fn default_action() {
        let wsdl = r#"<definitions><service><port><address location="https://sso.example.com/sts"/></port></service></definitions>"#;
        let d = ServiceDescription::parse(wsdl).unwrap();

        assert_eq!(d.endpoint.host_str(), Some("sso.example.com"));
        assert_eq!(d.issue_action, WST_ISSUE_ACTION);
    }

    #[test]
    fn missing_address() {
        let e = ServiceDescription::parse("<definitions/>").unwrap_err();
        assert!(e.to_string().contains("service address"));
    }

    #[test]
    fn bad_location() {
        let wsdl = r#"<definitions><address location="not a url"/></definitions>"#;
        assert!(ServiceDescription::parse(wsdl).is_err());
    }
}
