//! Varlink CLI - inspect and call varlink services
//!
//! Commands:
//!   varlink resolve <INTERFACE>            - Print the address serving an interface
//!   varlink info                           - Show service (or resolver) information
//!   varlink help <INTERFACE>               - Print an interface description
//!   varlink format <FILE>                  - Print a local .varlink file in canonical form
//!   varlink scaffold <METHOD>              - Print default input parameters for a method
//!   varlink call <METHOD> [PARAMETERS]     - Call a method and print the replies

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use varlink::resolver::interface_of;
use varlink::{parse_interface, CallFlags, Config, Connection, Error, Resolver};

#[derive(Parser)]
#[command(name = "varlink")]
#[command(about = "Inspect and call varlink services", long_about = None)]
struct Cli {
    /// Resolver address (defaults to the well-known socket)
    #[arg(long, global = true, env = "VARLINK_RESOLVER")]
    resolver: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the address of the service implementing an interface
    Resolve { interface: String },

    /// Show vendor, product, version and interfaces of a service
    Info {
        /// Service address; the resolver is queried when omitted
        #[arg(long)]
        address: Option<String>,
    },

    /// Print the canonical description of an interface
    Help {
        interface: String,

        /// Service address; resolved from the interface name when omitted
        #[arg(long)]
        address: Option<String>,
    },

    /// Parse a local interface file and print it in canonical form
    Format { file: PathBuf },

    /// Print the zero-value input parameters of a method
    Scaffold {
        /// Fully-qualified method name, e.g. org.example.more.TestMore
        method: String,

        #[arg(long)]
        address: Option<String>,
    },

    /// Call a method and print its replies
    Call {
        /// Fully-qualified method name
        method: String,

        /// Parameters as a JSON object
        parameters: Option<String>,

        #[arg(long)]
        address: Option<String>,

        /// Accept multiple replies
        #[arg(long, conflicts_with = "oneway")]
        more: bool,

        /// Do not wait for a reply
        #[arg(long)]
        oneway: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(address) = cli.resolver {
        config.resolver_address = address;
    }
    let resolver = Resolver::from_config(&config);

    match cli.command {
        Commands::Resolve { interface } => resolve_command(&resolver, &interface),
        Commands::Info { address } => info_command(&resolver, address.as_deref()),
        Commands::Help { interface, address } => {
            help_command(&resolver, &interface, address.as_deref())
        }
        Commands::Format { file } => format_command(&file),
        Commands::Scaffold { method, address } => {
            scaffold_command(&resolver, &method, address.as_deref())
        }
        Commands::Call {
            method,
            parameters,
            address,
            more,
            oneway,
        } => {
            let mut flags = CallFlags::NONE;
            if more {
                flags |= CallFlags::MORE;
            }
            if oneway {
                flags |= CallFlags::ONEWAY;
            }
            call_command(
                &resolver,
                &method,
                parameters.as_deref(),
                address.as_deref(),
                flags,
            )
        }
    }
}

fn connect(resolver: &Resolver, interface: &str, address: Option<&str>) -> anyhow::Result<Connection> {
    let connection = match address {
        Some(address) => Connection::dial(address),
        None => resolver.connect(interface),
    };
    connection.map_err(|err| describe(err).context(format!("cannot connect to {interface}")))
}

/// Service errors carry their parameters into the message.
fn describe(err: Error) -> anyhow::Error {
    match err {
        Error::Service(service) => match service.parameters {
            Some(parameters) => anyhow!("{}: {}", service.name, parameters),
            None => anyhow!("{}", service.name),
        },
        other => other.into(),
    }
}

fn resolve_command(resolver: &Resolver, interface: &str) -> anyhow::Result<()> {
    let address = resolver.resolve(interface).map_err(describe)?;
    println!("{address}");
    Ok(())
}

fn info_command(resolver: &Resolver, address: Option<&str>) -> anyhow::Result<()> {
    let info = match address {
        Some(address) => Connection::dial(address)
            .and_then(|mut connection| connection.get_info())
            .map_err(describe)?,
        None => resolver.get_info().map_err(describe)?,
    };
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn help_command(resolver: &Resolver, interface: &str, address: Option<&str>) -> anyhow::Result<()> {
    let mut connection = connect(resolver, interface, address)?;
    let interface = connection.get_interface(interface).map_err(describe)?;
    println!("{interface}");
    Ok(())
}

fn format_command(file: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let interface = parse_interface(&text)
        .with_context(|| format!("{} is not a valid interface description", file.display()))?;
    println!("{interface}");
    Ok(())
}

fn scaffold_command(resolver: &Resolver, method: &str, address: Option<&str>) -> anyhow::Result<()> {
    let interface_name = interface_of(method)?;
    let member = &method[interface_name.len() + 1..];

    let mut connection = connect(resolver, interface_name, address)?;
    let interface = connection.get_interface(interface_name).map_err(describe)?;
    let Some(declaration) = interface.method(member) else {
        bail!("{interface_name} has no method {member}");
    };

    let default = interface.default_value(&declaration.input);
    for alias in &default.unresolved {
        warn!(alias = alias.as_str(), "type is not defined in {interface_name}; using null");
    }
    println!("{}", serde_json::to_string_pretty(&default.value)?);
    Ok(())
}

fn call_command(
    resolver: &Resolver,
    method: &str,
    parameters: Option<&str>,
    address: Option<&str>,
    flags: CallFlags,
) -> anyhow::Result<()> {
    let parameters: Option<Value> = parameters
        .map(serde_json::from_str)
        .transpose()
        .context("parameters are not valid JSON")?;

    let mut connection = connect(resolver, interface_of(method)?, address)?;
    let mut pending = connection
        .send(method, parameters, flags)
        .map_err(describe)?;

    while !pending.is_done() {
        let reply = pending.receive::<Value>().map_err(describe)?;
        let parameters = reply.parameters.unwrap_or_else(|| Value::Object(Default::default()));
        println!("{}", serde_json::to_string_pretty(&parameters)?);
    }

    drop(pending);
    connection.close()?;
    Ok(())
}
