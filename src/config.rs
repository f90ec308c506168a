use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::BASE_URL;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub ui: UiConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL every endpoint path is joined to
  #[serde(default = "default_base_url")]
  pub base_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
    }
  }
}

fn default_base_url() -> String {
  BASE_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
  /// How long the "post created" banner stays up
  #[serde(default = "default_banner_secs")]
  pub banner_secs: u64,
  /// Route shown at startup (`/`, `/posts`, `/users`)
  #[serde(default = "default_start_route")]
  pub start_route: String,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      banner_secs: default_banner_secs(),
      start_route: default_start_route(),
    }
  }
}

impl UiConfig {
  pub fn banner_duration(&self) -> Duration {
    Duration::from_secs(self.banner_secs)
  }
}

fn default_banner_secs() -> u64 {
  3
}

fn default_start_route() -> String {
  "/".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// tracing filter directive, e.g. `jpq=debug`; `RUST_LOG` wins if set
  pub filter: Option<String>,
  /// Directory for log files (default: platform data dir)
  pub dir: Option<PathBuf>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./jpq.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/jpq/config.yaml
  ///
  /// With no file found the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("jpq.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("jpq").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn parse(contents: &str) -> Result<Self> {
    // An empty file is valid and means "all defaults"
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Bearer token for the request header hook, from `JPQ_API_TOKEN`.
  pub fn get_api_token() -> Option<String> {
    std::env::var("JPQ_API_TOKEN").ok()
  }
}
