// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # CredLedger Node
//!
//! Entry point for the `credledger-node` binary. Parses CLI arguments,
//! initializes logging and metrics, opens the world state, and serves the
//! HTTP gateway.
//!
//! The binary supports three subcommands:
//!
//! - `run`     — serve the gateway and metrics endpoint
//! - `init`    — create the data directory and write the seed credentials
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;

use credledger_contracts::registry::CredentialRegistry;
use credledger_protocol::config::{DB_DIR_NAME, PROTOCOL_VERSION};
use credledger_protocol::crypto::digest_hex;
use credledger_protocol::storage::digest::entry_count;
use credledger_protocol::storage::{state_root, LedgerDB, MemoryStore, Transaction};

use cli::{Commands, CredLedgerCli};
use logging::LogFormat;
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CredLedgerCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Init(args) => init_node(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Opens the sled world state under `data_dir`, creating it if needed.
fn open_db(data_dir: &Path) -> Result<LedgerDB> {
    let db_path = data_dir.join(DB_DIR_NAME);
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create database directory: {}", db_path.display()))?;

    let db = LedgerDB::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    tracing::info!(path = %db_path.display(), entries = db.len(), "database opened");
    Ok(db)
}

/// Starts the node: gateway and metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        logging::DEFAULT_DIRECTIVE,
        LogFormat::from_str_lossy(&args.log_format),
    );

    tracing::info!(
        api_port = args.api_port,
        metrics_port = args.metrics_port,
        data_dir = %args.data_dir.display(),
        in_memory = args.in_memory,
        "starting credledger-node"
    );

    // --- World state ---
    let store: api::SharedStore = if args.in_memory {
        tracing::warn!("using in-memory world state, nothing will be persisted");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(open_db(&args.data_dir)?)
    };

    // --- Metrics ---
    let node_metrics =
        Arc::new(NodeMetrics::new().context("failed to register prometheus metrics")?);
    let entries = entry_count(store.as_ref()).context("failed to count stored entries")?;
    node_metrics.stored_entries.set(entries as i64);

    // --- Application state ---
    let app_state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            PROTOCOL_VERSION,
        ),
        store,
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.api_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("credledger-node stopped");
    Ok(())
}

/// Creates the data directory and writes the seed credentials once.
fn init_node(args: cli::InitArgs) -> Result<()> {
    logging::init_logging("credledger_node=info", LogFormat::from_str_lossy(&args.log_format));

    let data_dir = &args.data_dir;
    tracing::info!(data_dir = %data_dir.display(), "initializing node");

    let db = open_db(data_dir)?;

    let tx = Transaction::begin(&db);
    CredentialRegistry::new(&tx)
        .init_ledger()
        .context("failed to write seed credentials")?;
    tx.commit().context("failed to commit seed credentials")?;
    db.flush().context("failed to flush database")?;

    let root = state_root(&db).context("failed to compute state root")?;
    tracing::info!(state_root = %digest_hex(&root), "ledger initialized");

    println!("Node initialized successfully.");
    println!("  Data directory : {}", data_dir.display());
    println!("  Entries        : {}", db.len());
    println!("  State root     : {}", digest_hex(&root));

    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("credledger-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol        {}", PROTOCOL_VERSION);
    println!("rustc           {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported. If a handler cannot be
/// installed, that branch never completes.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
