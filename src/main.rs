// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `homey-cli`: command-line access to a Homey hub.

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use homey_cli::commands::{
    Options, Report, apps, auth, catalog, devices, flows, hubs, inventory, zones,
};
use homey_cli::config::{FileStore, Settings, resolve_token};
use homey_cli::context::HubContext;
use homey_cli::error::ConfigError;
use homey_cli::output::{format_table, parse_fields, pick_fields};
use homey_cli::protocol::{CloudClient, HttpConfig, HttpHubClient};
use homey_cli::write::CapabilityWriter;
use homey_cli::{Error, Result};

/// Log filter variable, checked before `RUST_LOG`.
const LOG_VAR: &str = "HOMEY_CLI_LOG";

#[derive(Parser)]
#[command(name = "homey-cli", version)]
#[command(about = "Safe command-line access to a Homey hub")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    /// JSON output (agent-friendly)
    #[arg(long, global = true, overrides_with = "human")]
    json: bool,

    /// Human-readable output (default)
    #[arg(long, global = true, overrides_with = "json")]
    human: bool,

    /// Limit JSON output to these fields
    #[arg(long, global = true, value_name = "a,b")]
    fields: Option<String>,

    /// Use a specific Homey
    #[arg(long = "homey", global = true, value_name = "ID")]
    homey: Option<String>,

    /// Fail on ambiguous name matches
    #[arg(long, global = true)]
    strict: bool,

    /// Validate without executing writes
    #[arg(long, global = true)]
    dry_run: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Store, check or clear the access token
    Auth {
        #[command(subcommand)]
        action: AuthCommand,
    },
    /// List and select Homeys
    Homey {
        #[command(subcommand)]
        action: HomeyCommand,
    },
    /// Zones
    Zones {
        #[command(subcommand)]
        action: ListCommand,
    },
    /// Read and control devices
    Devices {
        #[command(subcommand)]
        action: DevicesCommand,
    },
    /// List and trigger flows
    Flows {
        #[command(subcommand)]
        action: FlowsCommand,
    },
    /// Installed apps
    Apps {
        #[command(subcommand)]
        action: ListCommand,
    },
    /// Hub, zones, devices and flows in one payload
    Inventory,
    /// Capabilities across all devices
    Capabilities {
        #[command(subcommand)]
        action: CapabilitiesCommand,
    },
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Verify and store an access token
    Login {
        /// Cloud access token
        #[arg(long)]
        token: String,
    },
    /// Show whether a token is available
    Status,
    /// Forget the stored token
    Logout,
}

#[derive(Subcommand)]
enum HomeyCommand {
    /// Homeys owned by the account
    List,
    /// Make a Homey the default target
    Use {
        /// Homey id
        id: String,
    },
    /// Show the account and the target Homey
    Whoami,
}

#[derive(Subcommand)]
enum ListCommand {
    /// List all
    List,
}

#[derive(Subcommand)]
enum CapabilitiesCommand {
    /// Every capability id with type, range and device count
    Catalog,
}

#[derive(Subcommand)]
enum DevicesCommand {
    /// List devices
    List,
    /// Show one device
    Get { device_id: String },
    /// Capability descriptors of one device
    Capabilities { device_id: String },
    /// Current value of one capability
    Read {
        device_id: String,
        capability_id: String,
    },
    /// Write a capability: <capabilityId>=<value>
    Set {
        device_id: String,
        #[arg(allow_hyphen_values = true)]
        assignment: String,
    },
    /// Turn a device on
    On { device_id: String },
    /// Turn a device off
    Off { device_id: String },
    /// Set the dim level (0..1)
    Dim {
        device_id: String,
        #[arg(allow_hyphen_values = true)]
        level: String,
    },
    /// Set a color: #RRGGBB, hsv:h,s,v or temp:<value>
    Color { device_id: String, input: String },
}

#[derive(Subcommand)]
enum FlowsCommand {
    /// List flows and advanced flows
    List,
    /// Show one flow
    Get { flow_id: String },
    /// Trigger a flow by id
    Trigger { flow_id: String },
    /// Trigger a flow by its exact name (case-insensitive)
    TriggerByName {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,homey_cli=debug")
    } else {
        EnvFilter::try_from_env(LOG_VAR)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cloud_client(settings: &Settings, token: &str) -> Result<CloudClient> {
    let config = HttpConfig::new(settings.cloud_url())
        .with_token(token)
        .with_timeout(settings.timeout());
    Ok(CloudClient::from_config(config)?)
}

fn account(settings: &Settings, store: &FileStore) -> Result<CloudClient> {
    let token = resolve_token(settings, store)?;
    cloud_client(settings, &token)
}

async fn connect(
    settings: &Settings,
    store: &FileStore,
    hub_id: Option<&str>,
) -> Result<HubContext<HttpHubClient>> {
    let cloud = account(settings, store)?;
    HubContext::connect(&cloud, store, hub_id).await
}

async fn run(cli: Cli) -> Result<Report> {
    let settings = Settings::from_env()?;
    let store = FileStore::from_env()?;
    let options = Options {
        writer: CapabilityWriter::new(settings.allowed_capabilities()),
        dry_run: cli.global.dry_run,
        strict: cli.global.strict,
    };
    let hub_id = cli.global.homey.as_deref();

    match cli.command {
        Command::Auth { action } => match action {
            AuthCommand::Login { token } => {
                let cloud = cloud_client(&settings, token.trim())?;
                auth::login(&cloud, &store, &token).await
            }
            AuthCommand::Status => {
                let cloud = match resolve_token(&settings, &store) {
                    Ok(token) => Some(cloud_client(&settings, &token)?),
                    Err(ConfigError::MissingToken) => None,
                    Err(err) => return Err(err.into()),
                };
                auth::status(cloud.as_ref()).await
            }
            AuthCommand::Logout => auth::logout(&store),
        },
        Command::Homey { action } => match action {
            HomeyCommand::List => hubs::list(&account(&settings, &store)?).await,
            HomeyCommand::Use { id } => {
                hubs::use_hub(&account(&settings, &store)?, &store, &id).await
            }
            HomeyCommand::Whoami => Ok(hubs::whoami(&connect(&settings, &store, hub_id).await?)),
        },
        Command::Zones {
            action: ListCommand::List,
        } => zones::list(&connect(&settings, &store, hub_id).await?).await,
        Command::Apps {
            action: ListCommand::List,
        } => apps::list(&connect(&settings, &store, hub_id).await?).await,
        Command::Inventory => inventory::inventory(&connect(&settings, &store, hub_id).await?).await,
        Command::Capabilities {
            action: CapabilitiesCommand::Catalog,
        } => catalog::catalog(&connect(&settings, &store, hub_id).await?).await,
        Command::Devices { action } => {
            let ctx = connect(&settings, &store, hub_id).await?;
            match action {
                DevicesCommand::List => devices::list(&ctx).await,
                DevicesCommand::Get { device_id } => devices::get(&ctx, &device_id).await,
                DevicesCommand::Capabilities { device_id } => {
                    devices::capabilities(&ctx, &device_id).await
                }
                DevicesCommand::Read {
                    device_id,
                    capability_id,
                } => devices::read(&ctx, &device_id, &capability_id).await,
                DevicesCommand::Set {
                    device_id,
                    assignment,
                } => devices::set(&ctx, &options, &device_id, &assignment).await,
                DevicesCommand::On { device_id } => {
                    devices::switch(&ctx, &options, &device_id, true).await
                }
                DevicesCommand::Off { device_id } => {
                    devices::switch(&ctx, &options, &device_id, false).await
                }
                DevicesCommand::Dim { device_id, level } => {
                    devices::dim(&ctx, &options, &device_id, &level).await
                }
                DevicesCommand::Color { device_id, input } => {
                    devices::color(&ctx, &options, &device_id, &input).await
                }
            }
        }
        Command::Flows { action } => {
            let ctx = connect(&settings, &store, hub_id).await?;
            match action {
                FlowsCommand::List => flows::list(&ctx).await,
                FlowsCommand::Get { flow_id } => flows::get(&ctx, &flow_id).await,
                FlowsCommand::Trigger { flow_id } => flows::trigger(&ctx, &options, &flow_id).await,
                FlowsCommand::TriggerByName { name } => {
                    flows::trigger_by_name(&ctx, &options, &name.join(" ")).await
                }
            }
        }
    }
}

fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn print_report(report: Report, json: bool, fields: &[String]) {
    if json {
        println!("{}", to_pretty(&pick_fields(report.data, fields)));
    } else if !report.human.is_empty() {
        println!("{}", report.human);
    }
}

fn print_error(err: &Error, json: bool) {
    let homeys = err
        .hubs()
        .map(|hubs| serde_json::to_value(hubs).unwrap_or_default());

    if json {
        let mut error = json!({
            "message": err.to_string(),
            "code": err.code(),
            "kind": err.kind().as_str(),
        });
        if let Some(homeys) = homeys {
            error["homeys"] = homeys;
        }
        if let Error::PartialWrite { applied, .. } = err {
            error["applied"] = json!(applied);
        }
        println!("{}", to_pretty(&json!({ "error": error })));
        return;
    }

    eprintln!("Error: {err}");
    if let Some(Value::Array(rows)) = homeys {
        if !rows.is_empty() {
            eprintln!("\nAvailable Homeys:");
            eprintln!(
                "{}",
                format_table(&rows, &["id", "name", "platform", "softwareVersion"])
            );
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.global.verbose);
    let json = cli.global.json && !cli.global.human;
    let fields = cli
        .global
        .fields
        .as_deref()
        .map(parse_fields)
        .unwrap_or_default();

    match run(cli).await {
        Ok(report) => {
            print_report(report, json, &fields);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            print_error(&err, json);
            ExitCode::FAILURE
        }
    }
}
