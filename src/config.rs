use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub connectors: ConnectorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// ISO-like language code stamped on every ingested record.
    #[serde(default = "default_language")]
    pub language: String,
    /// Messages with fewer non-empty body lines than this are skipped.
    #[serde(default = "default_min_body_lines")]
    pub min_body_lines: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            min_body_lines: default_min_body_lines(),
        }
    }
}

fn default_language() -> String {
    "sk".to_string()
}

fn default_min_body_lines() -> usize {
    2
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConnectorsConfig {
    pub json: Option<JsonConnectorConfig>,
    pub html: Option<HtmlConnectorConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JsonConnectorConfig {
    /// Path to a mailbox export: a JSON array of {subject, from, body, date}.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HtmlConnectorConfig {
    /// Path to a static commentary HTML page.
    pub path: PathBuf,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }
    if config.ingest.language.trim().is_empty() {
        anyhow::bail!("ingest.language must not be empty");
    }
    if config.ingest.min_body_lines == 0 {
        anyhow::bail!("ingest.min_body_lines must be >= 1");
    }

    Ok(config)
}
