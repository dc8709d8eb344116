//! Server configuration: an optional TOML file layered with `TALLY_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// Header carrying the real client address when behind a proxy.
  #[serde(default)]
  pub address_header:   Option<String>,
  /// reCAPTCHA secret. Comments are not captcha-checked when unset.
  #[serde(default)]
  pub recaptcha_secret: Option<String>,
  #[serde(default = "default_recaptcha_url")]
  pub recaptcha_url:    String,
  /// Key shared with the image proxy that serves listing thumbnails.
  #[serde(default)]
  pub camo_key:         String,
  #[serde(default = "default_camo_url")]
  pub camo_url:         String,
  /// Prefix that turns a stored image path into a fetchable URL.
  #[serde(default)]
  pub image_base_url:   String,
  /// Display names inserted into the name pool at startup.
  #[serde(default)]
  pub names:            Vec<String>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("tally.db") }

fn default_camo_url() -> String { "http://127.0.0.1:8081".to_owned() }

fn default_recaptcha_url() -> String {
  tally_api::captcha::DEFAULT_SITEVERIFY_URL.to_owned()
}

impl ServerConfig {
  /// Read `path` (if it exists) and apply environment overrides.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("TALLY")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("names"),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn bind_address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
