use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use anyhow::{Result, anyhow};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8005";
pub const DEFAULT_ERROR_MESSAGE: &str = "오류가 발생했습니다.";
pub const BASE_URL_ENV: &str = "RAGCHAT_BASE_URL";

/// How bot and user text is turned into bubble lines
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Control characters are stripped; only line breaks survive
    #[default]
    Plain,
    /// Text is passed through untouched, escape sequences included
    Raw,
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(RenderMode::Plain),
            "raw" => Ok(RenderMode::Raw),
            _ => Err(format!("unknown render mode '{s}' (expected plain or raw)")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub error_message: Option<String>,
    pub render_mode: Option<RenderMode>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Like `load`, but an unreadable or corrupt file yields the defaults so
    /// it can be repaired with `ragchat config`.
    pub fn load_or_new() -> Result<Self> {
        Ok(Self::load_or_new_from(&Self::get_config_path()?))
    }

    pub fn load_or_new_from(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
            Self::new()
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Backend base URL: the `RAGCHAT_BASE_URL` environment variable wins over
    /// the file, which wins over the built-in default.
    pub fn base_url(&self) -> String {
        Self::resolve_base_url(std::env::var(BASE_URL_ENV).ok(), self.base_url.as_deref())
    }

    fn resolve_base_url(env: Option<String>, file: Option<&str>) -> String {
        env.filter(|url| !url.trim().is_empty())
            .or_else(|| file.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn error_message(&self) -> &str {
        self.error_message.as_deref().unwrap_or(DEFAULT_ERROR_MESSAGE)
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode.unwrap_or_default()
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }

        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not determine cache directory"))?;

        Ok(cache_dir.join("ragchat").join("ragchat.log"))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("ragchat").join("config.json"))
    }
}
