pub mod dump;

use clap::{Args, Parser, Subcommand};

use crate::config::OrbitConfig;
use crate::error::ConfigError;

#[derive(Parser)]
#[command(name = "orbit")]
#[command(about = "Orbit purchase-request backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long)]
        port: Option<u16>,
        /// Keep everything in memory instead of opening the database
        #[arg(long, default_value = "false")]
        ephemeral: bool,
    },
    /// Print stored identities and cards
    Dump {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, default_value = "orbit.toml")]
    pub config: String,
    #[arg(long)]
    pub db_path: Option<String>,
}

impl CommonArgs {
    /// File config, then environment, then command-line flags.
    pub fn resolve(&self) -> Result<OrbitConfig, ConfigError> {
        let mut config = OrbitConfig::load_or_default(&self.config);
        config.apply_env()?;
        if let Some(path) = &self.db_path {
            config.storage.db_path = path.clone();
        }
        Ok(config)
    }
}

impl Default for CommonArgs {
    fn default() -> Self {
        Self {
            config: "orbit.toml".to_string(),
            db_path: None,
        }
    }
}
