//! geco-channels - Query timing system channel names
//!
//! Lists the channel names (or device descriptors) of the timing hubs and
//! child devices that match the given filters.

mod config;
mod filter;
mod report;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::filter::Filters;
use crate::report::QueryType;

#[derive(Parser, Debug)]
#[command(name = "geco-channels")]
#[command(about = "Query channel names used by the timing system. List all matching channel names.")]
#[command(version)]
struct Args {
    /// Site (interferometer), e.g. "h1" for Hanford, "l1" for Livingston
    #[arg(short = 'i', long)]
    site: Option<String>,

    /// Subsystem; most timing hardware belongs to "SYS-TIMING"
    #[arg(short, long)]
    subsystem: Option<String>,

    /// Location: "c" corner station, "x" X end station, "y" Y end station
    #[arg(short, long)]
    location: Option<String>,

    /// Hub kind: "m" for a master, "f" for a fanout
    #[arg(short = 'm', long)]
    hub_kind: Option<String>,

    /// Hub id ("a", "b", ...) when a location has several hubs of one kind
    #[arg(short = 'd', long)]
    hub_id: Option<String>,

    /// Hub port the device is connected to, 0-15
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..16))]
    port: Option<u8>,

    /// Device kind: "i" IRIG-B, "x" oscillator locking, "d" DuoTone,
    /// "c" timing comparator, "f" fanout (full names also accepted)
    #[arg(short = 't', long)]
    device_kind: Option<String>,

    /// Extra constraint on hubs, e.g. "description CONTAINS fanout"
    #[arg(short = 'w', long = "where", value_name = "EXPR")]
    hub_where: Vec<String>,

    /// Extra constraint on child devices, e.g. "port<8"
    #[arg(short = 'c', long = "child-where", value_name = "EXPR")]
    child_where: Vec<String>,

    /// What to list
    #[arg(short, long, value_enum, default_value_t = QueryType::All)]
    query: QueryType,

    /// Print matching hubs as structured JSON (with --query devices)
    #[arg(long)]
    json: bool,

    /// Path to configuration file
    #[arg(long, default_value = "geco.toml")]
    config: PathBuf,

    /// Additional hub as a canonical string
    #[arg(long = "hub", value_name = "HUB")]
    hubs: Vec<String>,

    /// Additional hub as a JSON descriptor file
    #[arg(long = "descriptor", value_name = "FILE")]
    descriptors: Vec<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn filters(&self) -> Filters {
        Filters {
            site: self.site.clone(),
            subsystem: self.subsystem.clone(),
            location: self.location.clone(),
            hub_kind: self.hub_kind.clone(),
            hub_id: self.hub_id.clone(),
            port: self.port,
            device_kind: self.device_kind.clone(),
            hub_where: self.hub_where.clone(),
            child_where: self.child_where.clone(),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    // Initialize logging; stdout is reserved for results
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("geco-channels v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;
    config.installation.hubs.extend(args.hubs.iter().cloned());
    config
        .installation
        .descriptors
        .extend(args.descriptors.iter().cloned());

    let hubs = config.installation.load_hubs()?;
    info!(hubs = hubs.len(), query = ?args.query, "Running query");

    let lines = report::render(&hubs, args.query, &args.filters(), args.json)?;
    for line in &lines {
        println!("{}", line);
    }

    Ok(())
}
