use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve a 2048 game over HTTP")]
pub struct Args {
    /// Optional TOML configuration file; flags below override it.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Host interface to bind.
    #[arg(long)]
    pub host: Option<String>,
    /// Port to bind.
    #[arg(long)]
    pub port: Option<u16>,
    /// Directory for scores.db.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
    /// Fixed RNG seed for reproducible games.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Optional tracing filter, e.g. "info", "debug".
    #[arg(long, default_value = "info")]
    pub log: String,
}

impl Args {
    /// Load the config file (if any) and apply command-line overrides.
    pub fn resolve(&self) -> anyhow::Result<Config> {
        let mut cfg = Config::load(self.config.as_deref())?;
        if let Some(host) = &self.host {
            cfg.server.host = host.clone();
        }
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
        if let Some(dir) = &self.data_dir {
            cfg.storage.data_dir = dir.clone();
        }
        if self.seed.is_some() {
            cfg.game.seed = self.seed;
        }
        Ok(cfg)
    }
}
