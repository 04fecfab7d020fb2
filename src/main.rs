use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use netsketch::document::TopologyDocument;
use netsketch::persistence::{DiskGateway, PersistenceGateway};
use netsketch::topology::TopologyManager;

/// Inspect and validate saved network diagram files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print node, connection and endpoint counts for a diagram file
    Stats {
        /// Path to the diagram JSON file
        file: PathBuf,
    },
    /// Load a diagram and report connections that fail to resolve
    Validate {
        /// Path to the diagram JSON file
        file: PathBuf,
    },
    /// List diagrams in a directory with summary metadata
    List {
        /// Directory containing diagram JSON files
        #[arg(default_value = "diagrams")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match args.command {
        Command::Stats { file } => stats(&file),
        Command::Validate { file } => validate(&file),
        Command::List { dir } => list(&dir),
    }
}

fn read_document(file: &Path) -> Result<TopologyDocument> {
    let contents = fs::read_to_string(file)
        .wrap_err_with(|| format!("Failed to read diagram file '{}'", file.display()))?;
    TopologyDocument::from_json(&contents)
        .wrap_err_with(|| format!("'{}' is not a valid topology document", file.display()))
}

fn stats(file: &Path) -> Result<()> {
    let document = read_document(file)?;
    let mut manager = TopologyManager::new();
    let report = manager.load(document);
    let stats = manager.statistics();

    info!("Diagram: {}", file.display());
    println!("nodes:       {}", stats.total_nodes);
    println!("connections: {}", stats.total_connections);
    println!("endpoints:   {}", stats.total_endpoints);

    if report.connections_skipped > 0 {
        warn!(
            "{} connection(s) did not resolve and were ignored",
            report.connections_skipped
        );
    }
    Ok(())
}

fn validate(file: &Path) -> Result<()> {
    let document = read_document(file)?;
    let version = document.version.clone();
    let mut manager = TopologyManager::new();
    let report = manager.load(document);

    info!("Document version: {}", version);
    info!(
        "Loaded {} nodes and {} connections",
        report.nodes_loaded, report.connections_loaded
    );

    if report.connections_skipped > 0 {
        bail!(
            "{} connection(s) reference missing nodes or interfaces",
            report.connections_skipped
        );
    }
    info!("All connections resolve to existing nodes and interfaces");
    Ok(())
}

fn list(dir: &Path) -> Result<()> {
    let gateway = DiskGateway::new(dir)
        .wrap_err_with(|| format!("Failed to open diagram directory '{}'", dir.display()))?;
    let summaries = gateway.list()?;

    if summaries.is_empty() {
        info!("No diagrams found in '{}'", dir.display());
        return Ok(());
    }
    for summary in summaries {
        println!(
            "{:<24} {:>8} bytes  {:>4} nodes  {:>4} connections  {}",
            summary.filename,
            summary.size,
            summary.node_count,
            summary.connection_count,
            summary.created.format("%Y-%m-%d %H:%M:%S"),
        );
    }
    Ok(())
}
