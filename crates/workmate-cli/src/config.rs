use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use workmate_platforms::PlatformsConfig;

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "workmate.toml";

/// Top-level `workmate.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct WorkmateConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(flatten)]
    pub platforms: PlatformsConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl WorkmateConfig {
    pub fn from_toml(source: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read `path`. A missing file is an error only when it was asked for
    /// explicitly; otherwise defaults apply.
    pub fn load(path: &Path, explicit: bool) -> anyhow::Result<Self> {
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&source)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    /// Fill the GitHub token from `token` when the file has none.
    pub fn apply_github_token(&mut self, token: Option<String>) {
        let has_token = self
            .platforms
            .github
            .token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !has_token {
            self.platforms.github.token = token.filter(|t| !t.trim().is_empty());
        }
    }
}
