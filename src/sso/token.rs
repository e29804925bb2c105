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

use crate::error::Error;
use crate::sso::response;

/// A SAML 2.0 bearer assertion issued by the STS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamlToken {
    assertion: String,
}

impl SamlToken {
    /// Extract the assertion from an STS response (or from a bare assertion
    /// document).
    pub fn from_response(xml: &str) -> Result<Self, Error> {
        Ok(Self {
            assertion: response::extract_assertion(xml)?,
        })
    }

    /// The assertion as single-line UTF-8 XML, ready to be embedded in the
    /// header of another request.
    pub fn to_xml(&self) -> String {
        self.assertion
            .chars()
            .filter(|c| *c != '\n' && *c != '\r')
            .collect()
    }
}

impl std::fmt::Display for SamlToken {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_xml())
    }
}
