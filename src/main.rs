use std::process::ExitCode;

use clap::Parser;
use orbit::cli::{dump, Cli, Commands, CommonArgs};
use orbit::node::OrbitNode;
use orbit::error::OrbitError;
use orbit::storage::Storage;

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve {
        common: CommonArgs::default(),
        port: None,
        ephemeral: false,
    });

    let result = match command {
        Commands::Serve {
            common,
            port,
            ephemeral,
        } => run_serve(common, port, ephemeral).await,
        Commands::Dump { common } => run_dump(common).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("orbit: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_serve(common: CommonArgs, port: Option<u16>, ephemeral: bool) -> Result<(), OrbitError> {
    // Config is resolved before the subscriber exists so its level can apply.
    let mut config = common
        .resolve()
        .map_err(|e| OrbitError::Internal(e.to_string()))?;
    init_tracing(&config.server.log_level);

    if let Some(port) = port {
        config.server.port = port;
    }

    let node = if ephemeral {
        OrbitNode::ephemeral(config)?
    } else {
        OrbitNode::persistent(config)?
    };
    node.run().await
}

async fn run_dump(common: CommonArgs) -> Result<(), OrbitError> {
    let config = common
        .resolve()
        .map_err(|e| OrbitError::Internal(e.to_string()))?;
    init_tracing(&config.server.log_level);

    let storage = Storage::open(&config.storage.db_path)?;
    dump::handle_dump_command(&storage, &storage).await
}
