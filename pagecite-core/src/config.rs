//! Session configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunables for one document/question session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound on a single QA engine call
    pub answer_timeout_secs: u64,
    /// Upper bound on parsing a document
    pub load_timeout_secs: u64,
    /// Longest accepted question, in characters
    pub max_question_chars: usize,
    /// Start a fresh history whenever a new document is loaded
    pub clear_history_on_load: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            answer_timeout_secs: 30,
            load_timeout_secs: 60,
            max_question_chars: 2000,
            clear_history_on_load: true,
        }
    }
}

impl SessionConfig {
    pub fn answer_timeout(&self) -> Duration {
        Duration::from_secs(self.answer_timeout_secs)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse session config")
    }

    /// Load a JSON config file; missing keys take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Invalid config: {}", path.display()))
    }
}
