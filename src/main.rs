//! Locator inspector - parses a connection locator and prints the resolved
//! settings and wire parameters. Handy for debugging what a given locator
//! actually tells the client and the server.

use std::collections::HashMap;
use std::process::ExitCode;

use clap::Parser;
use clickhouse_settings::{ClientSettings, Locator};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(
    name = "clickhouse-settings",
    about = "Inspect a ClickHouse connection locator: endpoints, resolved settings, wire parameters",
    version
)]
struct Cli {
    /// Connection locator, e.g. clickhouse://host:8123/db?compress=1
    locator: String,

    /// Fallback defaults applied under the locator's query parameters.
    /// Format: key=value, repeatable or comma-separated.
    #[arg(short = 'D', long = "default", value_name = "KEY=VALUE", value_delimiter = ',')]
    defaults: Vec<String>,

    /// Emit wire parameters even when they equal the built-in default
    #[arg(long)]
    include_defaults: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "CH_SETTINGS_LOG_LEVEL")]
    log_level: String,
}

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn parse_defaults(pairs: &[String]) -> Result<HashMap<String, String>, String> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| format!("expected key=value, got '{pair}'"))
        })
        .collect()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let defaults = match parse_defaults(&cli.defaults) {
        Ok(defaults) => defaults,
        Err(message) => {
            error!(%message, "invalid --default argument");
            eprintln!("Error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let locator = match Locator::parse(&cli.locator) {
        Ok(locator) => locator,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let settings = match ClientSettings::from_locator_with_defaults(&locator, &defaults) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let wire = settings.build_wire_parameters(cli.include_defaults);

    if cli.json {
        let report = serde_json::json!({
            "scheme": locator.scheme(),
            "endpoints": locator.endpoints(),
            "database": settings.database(),
            "properties": settings.as_flat_properties(),
            "wire_parameters": wire,
        });
        println!("{}", serde_json::to_string_pretty(&report).expect("report is valid JSON"));
        return ExitCode::SUCCESS;
    }

    println!("Endpoints:");
    for endpoint in locator.endpoints() {
        println!("  {endpoint}");
    }
    println!("Database: {}", settings.database());
    println!();
    println!("Resolved settings:");
    for (key, value) in settings.as_flat_properties() {
        println!("  {key} = {value}");
    }
    println!();
    if wire.is_empty() {
        println!("Wire parameters: (none)");
    } else {
        println!("Wire parameters:");
        for (key, value) in wire.iter() {
            println!("  {key} = {value}");
        }
    }
    ExitCode::SUCCESS
}
