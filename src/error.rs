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

/// Crate-wide error. Library errors (io, serde, url, reqwest, quick-xml) lift
/// into it with `?` and plain messages convert with `.into()`.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fault returned by a SOAP endpoint in place of a regular response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    pub code: String,
    pub message: String,
}

impl std::fmt::Display for SoapFault {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SOAP fault {}: {}", self.code, self.message)
    }
}

impl std::error::Error for SoapFault {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fault_downcasts_from_boxed_error() {
        let e: Error = SoapFault {
            code: "wst:FailedAuthentication".to_string(),
            message: "Authentication failed".to_string(),
        }
        .into();

        assert!(e.is::<SoapFault>());
        assert_eq!(
            e.to_string(),
            "SOAP fault wst:FailedAuthentication: Authentication failed"
        );
    }

    #[test]
    fn message_into_error() {
        let e: Error = format!("no value for {}", "vcenter.host").into();
        assert_eq!(e.to_string(), "no value for vcenter.host");
    }
}
