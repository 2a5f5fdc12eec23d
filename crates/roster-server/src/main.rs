//! roster server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `ROSTER_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP.
//!
//! # Creating an account from the shell
//!
//! ```text
//! cargo run -p roster-server --bin server -- --create-user alice --email alice@example.com
//! ```
//!
//! The password is read from stdin.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use roster_core::store::UserStore;
use roster_server::{AppState, ServerConfig, account};
use roster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster contact server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create an account with this username (password read from stdin) and exit.
  #[arg(long, value_name = "USERNAME", requires = "email")]
  create_user: Option<String>,

  /// Email address for `--create-user`.
  #[arg(long)]
  email: Option<String>,

  /// First name for `--create-user`.
  #[arg(long, default_value = "")]
  first_name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("ROSTER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.session_ttl()?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: create an account and exit.
  if let Some(username) = cli.create_user {
    let password = read_password()?;
    let form = account::RegisterForm {
      username,
      first_name: cli.first_name,
      email: cli.email.unwrap_or_default(),
      confirm_password: password.clone(),
      password,
    };
    let input = account::validate_registration(form)
      .map_err(|e| anyhow::anyhow!("{e}"))?;
    let user = store.create_user(input).await.context("failed to create account")?;
    println!("created account {} ({})", user.username, user.user_id);
    return Ok(());
  }

  let state = AppState { store: Arc::new(store), config: Arc::new(server_cfg.clone()) };

  let app = roster_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']).to_string();
  anyhow::ensure!(!password.is_empty(), "password must not be empty");
  Ok(password)
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
