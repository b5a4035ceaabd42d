//! Runtime configuration, layered from `config.toml` and `SHELF_*` variables.

use std::path::PathBuf;

use serde::Deserialize;
use shelf_api::TokenConfig;

/// Everything the server needs to start.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  pub access_secret:    String,
  pub refresh_secret:   String,
  #[serde(default = "default_access_ttl")]
  pub access_ttl_secs:  i64,
  #[serde(default = "default_refresh_ttl")]
  pub refresh_ttl_secs: i64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("shelf.db") }

fn default_access_ttl() -> i64 { 24 * 60 * 60 }

fn default_refresh_ttl() -> i64 { 7 * 24 * 60 * 60 }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn tokens(&self) -> TokenConfig {
    TokenConfig {
      access_secret:    self.access_secret.clone(),
      refresh_secret:   self.refresh_secret.clone(),
      access_ttl_secs:  self.access_ttl_secs,
      refresh_ttl_secs: self.refresh_ttl_secs,
    }
  }
}
