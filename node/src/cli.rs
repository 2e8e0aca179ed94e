//! # CLI Interface
//!
//! Defines the command-line argument structure for `credledger-node` using
//! `clap` derive. Supports three subcommands: `run`, `init`, and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use credledger_protocol::config::{DEFAULT_API_PORT, DEFAULT_METRICS_PORT};

/// Credential ledger node.
///
/// Holds the credential world state, serves the HTTP gateway that submits
/// and evaluates ledger operations, and exposes Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "credledger-node",
    about = "Credential ledger node",
    version,
    propagate_version = true
)]
pub struct CredLedgerCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the node and serve the gateway.
    Run(RunArgs),
    /// Create the data directory and write the seed credentials.
    Init(InitArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the node data directory holding the world-state database.
    ///
    /// Created on first run if it does not exist.
    #[arg(
        long,
        short = 'd',
        env = "CREDLEDGER_DATA_DIR",
        default_value = "./credledger-data"
    )]
    pub data_dir: PathBuf,

    /// Port for the HTTP gateway.
    #[arg(long, env = "CREDLEDGER_API_PORT", default_value_t = DEFAULT_API_PORT)]
    pub api_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "CREDLEDGER_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "CREDLEDGER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Keep the world state in memory instead of on disk.
    ///
    /// Everything is lost when the node stops. `--data-dir` is ignored.
    #[arg(long)]
    pub in_memory: bool,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to the data directory to initialize.
    #[arg(
        long,
        short = 'd',
        env = "CREDLEDGER_DATA_DIR",
        default_value = "./credledger-data"
    )]
    pub data_dir: PathBuf,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "CREDLEDGER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}
