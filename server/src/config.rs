use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tokio::fs;
use tracing::Level;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    #[serde(default)]
    pub server: ServerConfiguration,
    #[serde(default)]
    pub logging: LoggingConfiguration,
    #[serde(default)]
    pub monitor: jobmon::Configuration,
}

impl Configuration {
    pub async fn load<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfiguration {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Default for ServerConfiguration {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfiguration {
    #[serde(default = "default_level")]
    pub level: String,
}

impl LoggingConfiguration {
    pub fn level(&self) -> Result<Level> {
        self.level
            .parse()
            .with_context(|| format!("invalid log level `{}`", self.level))
    }
}

impl Default for LoggingConfiguration {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0, 0, 0, 0, 1], 50051))
}

fn default_level() -> String {
    "info".into()
}
