//! scenegen CLI
//!
//! Usage:
//!   scenegen [OPTIONS] <FILE>
//!
//! Options:
//!   --seed <N>   Override the scenario seed
//!   --pretty     Pretty-print the JSON output
//!   -h, --help   Print help
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `warn`).

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use scenegen::{run_scenario, Scenario};

#[derive(Parser)]
#[command(name = "scenegen")]
#[command(about = "Procedural room layouts and constrained object placement")]
struct Cli {
    /// Scenario file (TOML)
    input: PathBuf,

    /// Override the seed declared in the scenario
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print the world JSON
    #[arg(long)]
    pretty: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let scenario = match Scenario::from_file(&cli.input) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Error loading scenario '{}': {}", cli.input.display(), e);
            std::process::exit(1);
        }
    };

    let output = match run_scenario(scenario, cli.seed) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if !output.report.is_complete() {
        tracing::warn!(
            failed_engines = output.report.failures.len(),
            shortfalls = output.report.shortfalls().count(),
            "scene is incomplete"
        );
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing world: {}", e);
            std::process::exit(1);
        }
    }
}
