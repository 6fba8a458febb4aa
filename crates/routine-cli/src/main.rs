//! `routine` — terminal UI for Reset Routine.
//!
//! # Usage
//!
//! ```
//! routine --url http://localhost:8080 --email alice@example.com --password secret
//! routine --config ~/.config/routine/config.toml
//! ```

mod app;
mod client;
mod ui;

use std::{
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::{Duration, Instant},
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "routine", about = "Terminal UI for Reset Routine")]
struct Args {
  /// Path to a TOML config file (url, email, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the routine server (default: http://localhost:8080).
  #[arg(long, env = "ROUTINE_URL")]
  url: Option<String>,

  /// Account email; with --password, signs in on start-up.
  #[arg(long, env = "ROUTINE_EMAIL")]
  email: Option<String>,

  /// Account password (plaintext).
  #[arg(long, env = "ROUTINE_PASSWORD")]
  password: Option<String>,

  /// Write logs to this file. The terminal is owned by the UI, so logging
  /// is off unless this is set.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  email:    String,
  #[serde(default)]
  password: String,
}

/// A CLI value, else the config file's if non-empty.
fn pick(flag: Option<String>, file: &str) -> Option<String> {
  flag.or_else(|| (!file.is_empty()).then(|| file.to_owned()))
}

fn init_logging(path: &Path) -> Result<()> {
  let file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_logging(path)?;
  }

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags (and env) override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: pick(args.url, &file_cfg.url).unwrap_or_else(|| DEFAULT_URL.to_string()),
  };
  let email = pick(args.email, &file_cfg.email);
  let password = pick(args.password, &file_cfg.password);

  let client = ApiClient::new(api_config)?;
  let mut app = App::new(client);

  if let Some(email) = email {
    app.auth_form.email = email;
    if let Some(password) = password {
      app.auth_form.password = password;
      app.authenticate(false);
    }
  }

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.poll_messages();
    app.expire_toasts(Instant::now());

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key).await? {
          break;
        }
      }
      // Resizes and the rest are picked up by the next draw.
      _ => {}
    }
  }

  Ok(())
}
