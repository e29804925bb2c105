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

use serde::{Deserialize, Serialize};

/// The vSphere Automation REST API wraps every payload in `{"value": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub value: T,
}

/// One entry of `GET /rest/vcenter/vm`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VmSummary {
    pub vm: String,
    pub name: String,
    pub power_state: PowerState,
    pub cpu_count: Option<u32>,

    #[serde(rename = "memory_size_MiB")]
    pub memory_size_mib: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum PowerState {
    PoweredOff,
    PoweredOn,
    Suspended,
    // anything newer servers report, kept verbatim
    Other(String),
}

impl PowerState {
    pub fn as_str(&self) -> &str {
        match self {
            PowerState::PoweredOff => "POWERED_OFF",
            PowerState::PoweredOn => "POWERED_ON",
            PowerState::Suspended => "SUSPENDED",
            PowerState::Other(s) => s,
        }
    }
}

impl From<String> for PowerState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "POWERED_OFF" => PowerState::PoweredOff,
            "POWERED_ON" => PowerState::PoweredOn,
            "SUSPENDED" => PowerState::Suspended,
            _ => PowerState::Other(s),
        }
    }
}

impl From<&str> for PowerState {
    fn from(s: &str) -> Self {
        PowerState::from(s.to_string())
    }
}

impl From<PowerState> for String {
    fn from(p: PowerState) -> Self {
        match p {
            PowerState::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
