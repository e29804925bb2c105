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

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use knife_vcenter::api;
use knife_vcenter::config::{Config, SsoConfig, VcenterConfig};
use knife_vcenter::error::Error;
use knife_vcenter::listing::{Filter, ListOptions};
use knife_vcenter::logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML file with `vcenter` and `sso` settings
    #[arg(long, global = true, env = "KNIFE_VCENTER_CONFIG")]
    config: Option<PathBuf>,

    /// More logging on stderr (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// vCenter inventory
    Vcenter {
        #[command(subcommand)]
        command: VcenterCommands,
    },
    /// vCenter Single Sign-On
    Sso {
        #[command(subcommand)]
        command: SsoCommands,
    },
}

#[derive(Subcommand)]
enum VcenterCommands {
    Vm {
        #[command(subcommand)]
        command: VmCommands,
    },
}

#[derive(Subcommand)]
enum VmCommands {
    /// List virtual machines
    List(VmListArgs),
}

#[derive(Subcommand)]
enum SsoCommands {
    /// Request a SAML bearer token from the STS
    Token(TokenArgs),
}

#[derive(Args)]
struct VcenterArgs {
    #[arg(long, env = "VCENTER_HOST")]
    vcenter_host: Option<String>,
    #[arg(long, env = "VCENTER_USERNAME")]
    vcenter_username: Option<String>,
    #[arg(long, env = "VCENTER_PASSWORD", hide_env_values = true)]
    vcenter_password: Option<String>,
    /// Accept any TLS certificate from vCenter
    #[arg(long)]
    vcenter_disable_ssl_verify: bool,
}

impl From<VcenterArgs> for VcenterConfig {
    fn from(a: VcenterArgs) -> Self {
        Self {
            host: a.vcenter_host,
            username: a.vcenter_username,
            password: a.vcenter_password,
            disable_ssl_verify: a.vcenter_disable_ssl_verify,
        }
    }
}

#[derive(Args)]
struct VmListArgs {
    #[command(flatten)]
    vcenter: VcenterArgs,

    /// Column to sort by
    #[arg(long, default_value = "name")]
    sort_by: String,

    /// Only show rows where COLUMN equals VALUE
    #[arg(long, value_name = "COLUMN=VALUE")]
    filter: Vec<Filter>,
}

#[derive(Args)]
struct TokenArgs {
    /// STS endpoint, e.g. https://vcsa/sts/STSService/vsphere.local
    #[arg(long, env = "SSO_URL")]
    sso_url: Option<String>,
    /// Defaults to <sso-url>?wsdl
    #[arg(long, env = "SSO_WSDL_URL")]
    sso_wsdl_url: Option<String>,
    #[arg(long, env = "SSO_USERNAME")]
    sso_username: Option<String>,
    #[arg(long, env = "SSO_PASSWORD", hide_env_values = true)]
    sso_password: Option<String>,

    /// Write the token here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let result = tracing::subscriber::with_default(logging::subscriber(cli.verbose), || run(cli));

    if let Err(e) = result {
        eprintln!("{} {}", "ERROR:".bold().red(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let mut conf = match cli.config {
        Some(ref path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Vcenter {
            command: VcenterCommands::Vm {
                command: VmCommands::List(args),
            },
        } => {
            conf.vcenter.overlay(args.vcenter.into());
            list_vms(&conf.vcenter, args.sort_by, args.filter)
        }
        Commands::Sso {
            command: SsoCommands::Token(args),
        } => {
            conf.sso.overlay(SsoConfig {
                url: args.sso_url,
                wsdl_url: args.sso_wsdl_url,
                username: args.sso_username,
                password: args.sso_password,
            });
            request_token(&conf.sso, args.output)
        }
    }
}

fn list_vms(conf: &VcenterConfig, sort_by: String, filters: Vec<Filter>) -> Result<(), Error> {
    let opts = ListOptions {
        sort_by: Some(sort_by),
        filters,
    };

    api::list_vms(conf, &opts)?.printstd();
    Ok(())
}

fn request_token(conf: &SsoConfig, output: Option<PathBuf>) -> Result<(), Error> {
    let token = api::request_bearer_token(conf)?;

    match output {
        Some(path) => {
            std::fs::write(&path, token.to_xml())?;
            info!("Wrote token to {:?}", path);
        }
        None => println!("{}", token),
    }

    Ok(())
}
