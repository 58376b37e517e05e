mod agent;
mod collector;
mod config;
mod telemetry;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::agent::{AgentConfig, AgentLoop, SensorSourceReader};
use crate::collector::CollectorConfig;

#[derive(Parser)]
#[command(name = "bot-telemetry")]
#[command(about = "Field unit telemetry agent and collection service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the on-unit agent: heartbeat plus sensor upload loop
    Agent {
        #[arg(short, long)]
        config: String,
    },
    /// Run the collection service
    Collector {
        #[arg(short, long)]
        config: String,
    },
    /// Read the sensor sources once and print the resulting record
    Read {
        #[arg(short, long)]
        config: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Agent { config } => run_agent(&config).await,
        Commands::Collector { config } => run_collector(&config).await,
        Commands::Read { config } => read_once(&config).await,
    }
}

async fn run_agent(path: &str) -> ExitCode {
    let config = match AgentConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mac = match config.unit_mac() {
        Ok(mac) => mac,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    AgentLoop::new(config, mac).run().await;
    ExitCode::SUCCESS
}

async fn run_collector(path: &str) -> ExitCode {
    let config = match CollectorConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match collector::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn read_once(path: &str) -> ExitCode {
    let config = match AgentConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Only a file handoff can carry a beat into a one-shot read.
    let (_writer, liveness) = agent::handoff(&config.liveness, config.liveness_path());
    let reader = SensorSourceReader::new(
        config.sources.orientation_path(),
        config.sources.position_path(),
        liveness,
    );
    let fields = reader.read().await;

    match serde_json::to_string_pretty(&fields) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error encoding record: {}", e);
            ExitCode::FAILURE
        }
    }
}
