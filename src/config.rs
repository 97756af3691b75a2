use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use logdeck_logs::{FilterSpec, Severity};

/// Config file read from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "logdeck.toml";

/// Channels shown in the toolbar before any log arrives
pub const DEFAULT_CHANNELS: [&str; 4] = ["Gameplay", "Network", "UI", "AI"];

const DEFAULT_TICK_MS: u64 = 100;

/// Settings from `logdeck.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub channels: Option<Vec<String>>,
    pub severities: Option<Vec<Severity>>,
    pub collapse: bool,
    pub follow: bool,
    pub tick_ms: Option<u64>,
    pub open_command: Option<String>,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Load an explicit config file, or `logdeck.toml` if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Toolbar channels: configured ones or the defaults
    pub fn channels(&self) -> Vec<String> {
        match &self.channels {
            Some(channels) => channels.clone(),
            None => DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Initial filter: every toolbar channel checked
    pub fn filter_spec(&self) -> FilterSpec {
        let spec = FilterSpec::show_all(self.channels()).with_collapse(self.collapse);
        match &self.severities {
            Some(severities) => spec.with_severities(severities.iter().copied()),
            None => spec,
        }
    }

    pub fn tick_ms(&self) -> u64 {
        self.tick_ms.unwrap_or(DEFAULT_TICK_MS).max(1)
    }
}
