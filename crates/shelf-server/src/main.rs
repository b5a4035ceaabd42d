//! shelf server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `SHELF_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP.
//!
//! # Granting staff
//!
//! ```
//! cargo run -p shelf-server -- --promote <user-id>
//! ```

mod config;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use shelf_api::{AppState, Argon2Passwords, TokenIssuer};
use shelf_core::{service::UserService, user::Role};
use shelf_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Shelf book-review server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Give the user with this id the staff role and exit.
  #[arg(long, value_name = "USER_ID")]
  promote: Option<Uuid>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = ::config::Config::builder()
    .add_source(::config::File::from(cli.config).required(false))
    .add_source(::config::Environment::with_prefix("SHELF"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: promote a user and exit.
  if let Some(user_id) = cli.promote {
    let users = UserService::new(Arc::new(store), Arc::new(Argon2Passwords::default()));
    let profile = users
      .set_role(user_id, Role::Staff)
      .await
      .with_context(|| format!("failed to promote {user_id}"))?;
    tracing::info!(user_id = %profile.id, username = %profile.username, "user promoted to staff");
    return Ok(());
  }

  let state = AppState::new(store, TokenIssuer::new(&server_cfg.tokens()));
  let app = shelf_api::router(state)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
