use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;

#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub game: GameSettings,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Server {
    #[serde(default = "defaults::host")]
    pub host: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Storage {
    /// Directory holding `scores.db`.
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,
    /// Finished games kept in history; older ones are evicted first.
    #[serde(default = "defaults::history_limit")]
    pub history_limit: usize,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct GameSettings {
    /// Fixed RNG seed for reproducible games. Entropy when omitted.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
            history_limit: defaults::history_limit(),
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let cfg: Self = toml::from_str(&contents)?;
        Ok(cfg)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_toml(p)
                .map_err(|e| anyhow::anyhow!("failed to load config {}: {e}", p.display())),
            None => Ok(Self::default()),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn host() -> String { "127.0.0.1".to_string() }
    pub fn port() -> u16 { 8080 }
    pub fn data_dir() -> PathBuf { PathBuf::from("data") }
    pub fn history_limit() -> usize { 10 }
}
