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
use quick_xml::name::{Namespace, PrefixDeclaration, QName, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::writer::Writer;

use crate::error::{Error, SoapFault};

pub const NS_SAML2: &str = "urn:oasis:names:tc:SAML:2.0:assertion";
const NS_SOAP11_ENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const NS_SOAP12_ENV: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Prefix ("" for the default namespace) to namespace URI.
type Bindings = Vec<(String, String)>;

#[derive(Default)]
struct FaultDetails {
    code: Option<String>,
    message: Option<String>,
}

impl From<FaultDetails> for Error {
    fn from(details: FaultDetails) -> Self {
        SoapFault {
            code: details.code.unwrap_or_else(|| "unknown".to_string()),
            message: details.message.unwrap_or_default(),
        }
        .into()
    }
}

fn namespace_uri(resolved: ResolveResult) -> Option<String> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => Some(String::from_utf8_lossy(ns).into_owned()),
        _ => None,
    }
}

/// Scan a SOAP response for the SAML 2.0 assertion and return it re-rendered
/// as a standalone document fragment. A SOAP fault anywhere before it is
/// returned as a [`SoapFault`] error.
pub fn extract_assertion(xml: &str) -> Result<String, Error> {
    let mut reader = NsReader::from_str(xml);
    let mut depth = 0;

    // depth of the open Fault element, if any
    let mut fault: Option<(usize, FaultDetails)> = None;
    let mut fault_field: Option<String> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let ns = namespace_uri(resolved);

        match event {
            Event::Start(e) => {
                depth += 1;
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

                match ns.as_deref() {
                    Some(NS_SAML2) if local == "Assertion" => {
                        return copy_assertion(&mut reader, e, false)
                    }
                    Some(NS_SOAP11_ENV | NS_SOAP12_ENV) if local == "Fault" => {
                        fault = Some((depth, FaultDetails::default()));
                    }
                    _ if fault.is_some() => fault_field = Some(local),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if ns.as_deref() == Some(NS_SAML2) && e.local_name().as_ref() == b"Assertion" {
                    return copy_assertion(&mut reader, e, true);
                }
            }
            Event::Text(t) => {
                if let (Some((_, details)), Some(field)) = (fault.as_mut(), fault_field.as_deref()) {
                    let text = t.unescape()?.trim().to_string();
                    if !text.is_empty() {
                        match field {
                            "faultcode" | "Value" if details.code.is_none() => {
                                details.code = Some(text)
                            }
                            "faultstring" | "Text" if details.message.is_none() => {
                                details.message = Some(text)
                            }
                            _ => {}
                        }
                    }
                }
            }
            Event::End(_) => {
                fault_field = None;
                if let Some((at, details)) = fault.take() {
                    if at == depth {
                        return Err(details.into());
                    }
                    fault = Some((at, details));
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Err(format!("no <saml2:Assertion> ({}) in response", NS_SAML2).into())
}

/// Copy the assertion whose start tag was just read. Namespaces its element
/// and attribute names use but that it does not declare itself are declared
/// on the copied root.
fn copy_assertion(reader: &mut NsReader<&[u8]>, start: BytesStart, empty: bool) -> Result<String, Error> {
    let own = declared_prefixes(&start)?;
    let mut used = Bindings::new();
    note_bindings(reader, &start, &mut used)?;

    let mut content = Writer::new(Vec::new());
    if !empty {
        let mut depth = 1;
        loop {
            let event = reader.read_event()?;
            match &event {
                Event::Start(e) => {
                    depth += 1;
                    note_bindings(reader, e, &mut used)?;
                }
                Event::Empty(e) => note_bindings(reader, e, &mut used)?,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Event::Eof => return Err("response ended inside <saml2:Assertion>".into()),
                _ => {}
            }
            content.write_event(event)?;
        }
    }

    let mut root = start;
    for (prefix, uri) in used.iter().filter(|(p, _)| !own.contains(p)) {
        let key = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };
        root.push_attribute((key.as_str(), uri.as_str()));
    }

    let mut w = Writer::new(Vec::new());
    if empty {
        w.write_event(Event::Empty(root))?;
    } else {
        w.write_event(Event::Start(root.clone()))?;
        w.get_mut().extend_from_slice(&content.into_inner());
        w.write_event(Event::End(root.to_end()))?;
    }

    Ok(String::from_utf8(w.into_inner())?)
}

/// Prefixes declared by `xmlns`/`xmlns:*` attributes on the element itself.
fn declared_prefixes(e: &BytesStart) -> Result<Vec<String>, Error> {
    let mut prefixes = Vec::new();
    for attr in e.attributes() {
        match attr?.key.as_namespace_binding() {
            Some(PrefixDeclaration::Default) => prefixes.push(String::new()),
            Some(PrefixDeclaration::Named(p)) => prefixes.push(std::str::from_utf8(p)?.to_string()),
            None => {}
        }
    }
    Ok(prefixes)
}

/// Record the namespace the reader resolves for the element name and for
/// each prefixed attribute.
fn note_bindings(reader: &NsReader<&[u8]>, e: &BytesStart, used: &mut Bindings) -> Result<(), Error> {
    let (ns, _) = reader.resolve_element(e.name());
    note_binding(used, e.name(), ns)?;

    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_namespace_binding().is_some() || attr.key.prefix().is_none() {
            continue;
        }
        let (ns, _) = reader.resolve_attribute(attr.key);
        note_binding(used, attr.key, ns)?;
    }
    Ok(())
}

fn note_binding(used: &mut Bindings, name: QName, ns: ResolveResult) -> Result<(), Error> {
    let prefix = match name.prefix() {
        Some(p) => std::str::from_utf8(p.into_inner())?,
        None => "",
    };

    // `xml` is bound implicitly; the first binding seen for a prefix wins
    if prefix == "xml" || used.iter().any(|(p, _)| p == prefix) {
        return Ok(());
    }

    if let Some(uri) = namespace_uri(ns) {
        used.push((prefix.to_string(), uri));
    }
    Ok(())
}
