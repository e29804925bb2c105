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

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml;

use crate::error::Error;

/// Settings read from the YAML config file. Every value can also be given
/// on the command line, which wins over the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub vcenter: VcenterConfig,
    #[serde(default)]
    pub sso: SsoConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VcenterConfig {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,

    #[serde(default)]
    pub disable_ssl_verify: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SsoConfig {
    pub url: Option<String>,
    pub wsdl_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("reading config {:?}: {}", path.as_ref(), e))?;
        Self::from_yaml(&data)
    }
}

impl VcenterConfig {
    /// Replace values with the ones set in `other`.
    pub fn overlay(&mut self, other: VcenterConfig) {
        overlay(&mut self.host, other.host);
        overlay(&mut self.username, other.username);
        overlay(&mut self.password, other.password);
        self.disable_ssl_verify |= other.disable_ssl_verify;
    }

    pub fn host(&self) -> Result<&str, Error> {
        required(&self.host, "vcenter host (--vcenter-host)")
    }

    pub fn username(&self) -> Result<&str, Error> {
        required(&self.username, "vcenter username (--vcenter-username)")
    }

    pub fn password(&self) -> Result<&str, Error> {
        required(&self.password, "vcenter password (--vcenter-password)")
    }
}

impl SsoConfig {
    pub fn overlay(&mut self, other: SsoConfig) {
        overlay(&mut self.url, other.url);
        overlay(&mut self.wsdl_url, other.wsdl_url);
        overlay(&mut self.username, other.username);
        overlay(&mut self.password, other.password);
    }

    pub fn url(&self) -> Result<&str, Error> {
        required(&self.url, "SSO url (--sso-url)")
    }

    pub fn username(&self) -> Result<&str, Error> {
        required(&self.username, "SSO username (--sso-username)")
    }

    pub fn password(&self) -> Result<&str, Error> {
        required(&self.password, "SSO password (--sso-password)")
    }
}

fn overlay(dst: &mut Option<String>, src: Option<String>) {
    if src.is_some() {
        *dst = src;
    }
}

fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str, Error> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("missing {}", what).into()),
    }
}
