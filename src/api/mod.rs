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

use prettytable::Table;
use tracing::warn;

pub mod models;

use crate::config::{SsoConfig, VcenterConfig};
use crate::error::Error;
use crate::listing::ListOptions;
use crate::sso::{SamlToken, SsoConnection};
use crate::vcenter::{VcenterClient, VmService};
use crate::vmlist;

/// `vcenter vm list` table.
pub fn list_vms(conf: &VcenterConfig, opts: &ListOptions) -> Result<Table, Error> {
    let client = VcenterClient::connect(conf)?;
    render_and_logout(client, opts)
}

/// The session is closed whether or not the table could be built.
fn render_and_logout<S: VmService>(session: S, opts: &ListOptions) -> Result<Table, Error> {
    let table = vmlist::render(&session, opts);

    if let Err(e) = session.logout() {
        warn!("error closing vCenter session: {}", e);
    }

    table
}

pub fn request_bearer_token(conf: &SsoConfig) -> Result<SamlToken, Error> {
    let mut conn = SsoConnection::new(conf.url()?, conf.wsdl_url.as_deref())?;
    conn.login(conf.username()?, conf.password()?);
    conn.request_bearer_token()
}
