//! tally server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, seeds the name pool and serves the JSON API over HTTP.

mod settings;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use settings::{ServerConfig, expand_tilde};
use tally_api::{
  AppState, ThumbnailSigner,
  captcha::{Captcha, RecaptchaVerifier},
};
use tally_core::{Context, store::Store as _};
use tally_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tally voting server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if !server_cfg.names.is_empty() {
    let added = store
      .add_names(server_cfg.names.clone())
      .await
      .context("failed to seed the name pool")?;
    info!(added, "seeded name pool from config");
  }

  let ctx = Context::load(Arc::new(store))
    .await
    .context("failed to load the name pool")?;

  let captcha = match &server_cfg.recaptcha_secret {
    Some(secret) => Captcha::Recaptcha(
      RecaptchaVerifier::new(server_cfg.recaptcha_url.clone(), secret.clone())
        .context("failed to build the reCAPTCHA client")?,
    ),
    None => {
      warn!("no recaptcha_secret configured; comments are not captcha-checked");
      Captcha::Disabled
    }
  };

  if server_cfg.camo_key.is_empty() {
    warn!("no camo_key configured; thumbnail URLs are signed with an empty key");
  }
  let thumbnails = ThumbnailSigner::new(
    server_cfg.camo_key.as_bytes(),
    server_cfg.camo_url.clone(),
    server_cfg.image_base_url.clone(),
  )
  .map_err(|e| anyhow::anyhow!("invalid camo_key: {e}"))?;

  let state = AppState {
    ctx,
    captcha: Arc::new(captcha),
    thumbnails: Arc::new(thumbnails),
    address_header: server_cfg.address_header.as_deref().map(Arc::from),
  };

  let app = tally_api::api_router(state);
  let address = server_cfg.bind_address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .await
    .context("server error")?;

  Ok(())
}
