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

use reqwest::blocking::Client;
use tracing::{debug, info};
use url::Url;

use crate::api::models::{Envelope, VmSummary};
use crate::config::VcenterConfig;
use crate::error::Error;

const SESSION_HEADER: &str = "vmware-api-session-id";

/// Source of VM records.
pub trait VmService {
    fn list_vms(&self) -> Result<Vec<VmSummary>, Error>;

    /// End the session the records were read through.
    fn logout(self) -> Result<(), Error>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Session against the vSphere Automation REST API.
pub struct VcenterClient {
    base: Url,
    session_id: String,
    client: Client,
}

impl VcenterClient {
    pub fn connect(conf: &VcenterConfig) -> Result<Self, Error> {
        let base = base_url(conf.host()?)?;

        let client = Client::builder()
            .danger_accept_invalid_certs(conf.disable_ssl_verify)
            .user_agent(concat!("knife-vcenter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!("Connecting to vCenter at {}", base);

        let session: Envelope<String> = client
            .post(base.join("rest/com/vmware/cis/session")?)
            .basic_auth(conf.username()?, Some(conf.password()?))
            .send()?
            .error_for_status()?
            .json()?;

        Ok(Self {
            base,
            session_id: session.value,
            client,
        })
    }
}

impl VmService for VcenterClient {
    fn list_vms(&self) -> Result<Vec<VmSummary>, Error> {
        let vms: Envelope<Vec<VmSummary>> = self
            .client
            .get(self.base.join("rest/vcenter/vm")?)
            .header(SESSION_HEADER, &self.session_id)
            .send()?
            .error_for_status()?
            .json()?;

        debug!("vCenter returned {} VMs", vms.value.len());
        Ok(vms.value)
    }

    fn logout(self) -> Result<(), Error> {
        debug!("Closing vCenter session");
        self.client
            .delete(self.base.join("rest/com/vmware/cis/session")?)
            .header(SESSION_HEADER, &self.session_id)
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

/// `https://<host>/` unless the host already names a scheme.
fn base_url(host: &str) -> Result<Url, Error> {
    let mut s = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };

    if !s.ends_with('/') {
        s.push('/');
    }

    Ok(Url::parse(&s)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base_from_host() {
        let u = base_url("vcsa.lab.example.com").unwrap();
        assert_eq!(u.as_str(), "https://vcsa.lab.example.com/");
        assert_eq!(
            u.join("rest/vcenter/vm").unwrap().as_str(),
            "https://vcsa.lab.example.com/rest/vcenter/vm"
        );
    }

    #[test]
    fn base_keeps_scheme_and_port() {
        let u = base_url("http://127.0.0.1:8989").unwrap();
        assert_eq!(u.as_str(), "http://127.0.0.1:8989/");
    }

    #[test]
    fn connect_requires_host() {
        let e = VcenterClient::connect(&VcenterConfig::default()).err().unwrap();
        assert!(e.to_string().contains("--vcenter-host"));
    }
}
