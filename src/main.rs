use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use cell_pilot::bot::pilot::Pilot;
use cell_pilot::command::{Command, CommandSink, SinkError};
use cell_pilot::config::BotConfig;
use cell_pilot::runner;
use cell_pilot::world::provider::StreamProvider;

#[derive(Debug, Parser)]
#[command(name = "cell-pilot", version)]
#[command(about = "Steer an agar-style agent from JSON world snapshots")]
struct Args {
    /// Snapshot file, one JSON snapshot per line (stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,
}

/// Writes each command as one JSON line on stdout
struct StdoutSink {
    out: io::Stdout,
}

impl CommandSink for StdoutSink {
    fn send(&mut self, command: Command) -> Result<(), SinkError> {
        let line = serde_json::to_string(&command).map_err(|_| SinkError::Disconnected)?;
        let mut out = self.out.lock();
        writeln!(out, "{}", line).map_err(|_| SinkError::Disconnected)
    }
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead + Send>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("opening snapshot file {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr, stdout carries commands
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    info!("Cell Pilot v{}", env!("CARGO_PKG_VERSION"));

    let config = BotConfig::load_or_default();
    config.validate().context("invalid configuration")?;
    info!(
        "Configuration loaded: tick={}ms, ally={:?}, walls={} within {}",
        config.tick_ms, config.ally_id, config.wall_policy, config.wall_margin
    );

    let input = open_input(args.input.as_deref())?;
    let mut provider = StreamProvider::spawn(input).context("starting snapshot reader")?;
    let pilot = Pilot::new(config);
    let mut sink = StdoutSink { out: io::stdout() };

    // Shutdown signal handler
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    let outcome = tokio::select! {
        result = runner::run(&pilot, &mut provider, &mut sink, args.max_ticks) => Some(result),
        _ = shutdown => {
            info!("Shutting down...");
            None
        }
    };

    if let Some(result) = outcome {
        let summary = result?;
        info!(
            "Done: {} decisions, {} splits, {} no-safe-direction",
            summary.decisions, summary.splits, summary.no_safe_direction
        );
    }

    Ok(())
}
