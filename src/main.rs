//! devstack: local development stack for a decentralized app.
//!
//! # Architecture Overview
//!
//! ```text
//!   devstack up ──▶ Orchestrator::start
//!                      │
//!                      ├─▶ net::probe ──(8545 free?)──▶ chain emulator   (JSON-RPC :8545)
//!                      ├─▶ contracts ──▶ migration executable (inherits stdio)
//!                      ├─▶ net::probe ──(5002 free?)──▶ storage node     (API :5002, gateway :8080)
//!                      └─▶ fixtures ──HTTP──▶ storage API
//!
//!   SIGINT/SIGTERM ──▶ ShutdownHandle::shutdown (only what we started)
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use devstack::chain::ChainOptions;
use devstack::config::{load_config, StackConfig};
use devstack::lifecycle::signals::wait_for_signal;
use devstack::net::is_port_in_use;
use devstack::observability::logging::init_logging;
use devstack::{Orchestrator, StartConfig};

#[derive(Parser)]
#[command(name = "devstack")]
#[command(about = "Bring up and tear down the local dev stack", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the requested services and keep them up until interrupted
    Up(UpArgs),
    /// Report whether a local port is already bound
    Probe {
        port: u16,
    },
    /// Load and validate a configuration file
    CheckConfig {
        path: PathBuf,
    },
}

#[derive(Args)]
struct UpArgs {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start the chain emulator
    #[arg(long)]
    chain: bool,

    /// Keep chain state in memory instead of the data directory
    #[arg(long, requires = "chain")]
    in_memory: bool,

    /// Run the contract migration after the chain is up
    #[arg(long)]
    deploy: bool,

    /// Start the storage node
    #[arg(long)]
    storage: bool,

    /// Upload the fixture tree into the storage node
    #[arg(long, requires = "storage")]
    populate: bool,

    /// Log every uploaded fixture
    #[arg(long)]
    log_files: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Up(args) => up(args).await?,
        Commands::Probe { port } => {
            init_logging("info");
            let state = if is_port_in_use(port).await { "in use" } else { "free" };
            println!("port {} is {}", port, state);
        }
        Commands::CheckConfig { path } => {
            let config = load_config(&path)?;
            println!("{} is valid", path.display());
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

async fn up(args: UpArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => StackConfig::default(),
    };
    if args.log_files {
        config.fixtures.log_files = true;
    }

    init_logging(&config.observability.log_level);
    tracing::info!("devstack v{} starting", env!("CARGO_PKG_VERSION"));

    let mut request = StartConfig::new();
    if args.chain {
        request = request.chain_with(ChainOptions {
            in_memory: args.in_memory,
        });
    }
    request.deploy_contracts = args.deploy;
    request.storage = args.storage;
    request.populate_fixtures = args.populate;

    let orchestrator = Orchestrator::new(config);
    let handle = match orchestrator.start(request).await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(service = ?e.service(), error = %e, "Dev stack failed to start");
            return Err(e.into());
        }
    };

    let config = orchestrator.config();
    tracing::info!(
        status = %orchestrator.status().await,
        chain_port = config.chain.port,
        storage_api_port = config.storage.api_port,
        gateway_port = config.storage.gateway_port,
        "Dev stack ready, press Ctrl-C to stop"
    );
    wait_for_signal().await?;

    handle.shutdown().await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
