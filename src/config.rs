use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheConfig, TypeAliases};
use crate::loader::LoaderConfig;
use crate::platform::{ClientOptions, PlatformClient};
use crate::transport::HttpTransport;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Default installation scope for storage commands
  pub install_id: Option<String>,
  #[serde(default)]
  pub loader: LoaderSettings,
  /// Alias type label -> canonical type label
  #[serde(
    default = "default_type_aliases",
    deserialize_with = "deserialize_alias_table"
  )]
  pub type_aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoaderSettings {
  /// Batching window in milliseconds (0 = one scheduler tick)
  #[serde(default)]
  pub batch_window_ms: u64,
  /// Cache capacity; unbounded when unset
  pub max_entries: Option<u64>,
  /// Cache entry lifetime; entries never expire when unset
  pub ttl_secs: Option<u64>,
}

fn default_type_aliases() -> BTreeMap<String, String> {
  BTreeMap::from([("employee-screening-flows".to_string(), "flows".to_string())])
}

fn deserialize_alias_table<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let v: BTreeMap<String, String> = BTreeMap::deserialize(deserializer)?;
  Ok(
    v.into_iter()
      .map(|(alias, canonical)| (alias.trim().to_lowercase(), canonical.trim().to_lowercase()))
      .collect(),
  )
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./waypost.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/waypost/config.yaml
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
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/waypost/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("waypost.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("waypost").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  pub fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Get the API token from environment variables.
  ///
  /// Checks WAYPOST_API_TOKEN first, then PLATFORM_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("WAYPOST_API_TOKEN")
      .or_else(|_| std::env::var("PLATFORM_API_TOKEN"))
      .map_err(|_| {
        eyre!("API token not found. Set WAYPOST_API_TOKEN or PLATFORM_API_TOKEN environment variable.")
      })
  }

  pub fn client_options(&self) -> ClientOptions {
    let mut cache = CacheConfig::unbounded();
    if let Some(max_entries) = self.loader.max_entries {
      cache = cache.with_max_entries(max_entries);
    }
    if let Some(ttl_secs) = self.loader.ttl_secs {
      cache = cache.with_ttl(Duration::from_secs(ttl_secs));
    }

    ClientOptions {
      aliases: self.type_aliases.clone().into_iter().collect::<TypeAliases>(),
      cache,
      loader: LoaderConfig {
        batch_window: Duration::from_millis(self.loader.batch_window_ms),
      },
      install_id: self.install_id.clone(),
    }
  }

  /// Build an HTTP-backed client using the token from the environment.
  pub fn connect(&self) -> Result<PlatformClient> {
    let token = Self::get_api_token()?;
    let transport = HttpTransport::new(&self.api.url, token)
      .map_err(|e| eyre!("Failed to create API transport: {}", e))?;
    Ok(PlatformClient::new(Arc::new(transport), self.client_options()))
  }
}
