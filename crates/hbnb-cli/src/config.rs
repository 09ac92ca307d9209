use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use hbnb_console::DEFAULT_PROMPT;
use hbnb_store::file::DEFAULT_STORAGE_PATH;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub storage_path: PathBuf,
    pub prompt: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Read a TOML configuration file. Missing keys take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
