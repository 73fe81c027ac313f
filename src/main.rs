mod app;
mod config;
mod constants;
mod filter;
mod input;
mod loader;
mod model;
mod player;
mod theme;
mod ui;
mod video;

use anyhow::Result;
use clap::Parser;
use directories::ProjectDirs;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use constants::constants;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Base URL of the stream archive (serves streams/manifest.json).
  /// Defaults to the configured URL, then the built-in default.
  #[arg(short, long)]
  base_url: Option<String>,
}

// --- Logging ---

/// Log to a file under the platform data dir — stdout belongs to the TUI.
/// Returns the non-blocking writer guard, which must stay alive for the
/// lifetime of the program.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let proj_dirs = ProjectDirs::from("", "", "streamdex")?;
  let log_dir = proj_dirs.data_dir().join("logs");
  std::fs::create_dir_all(&log_dir).ok()?;

  let file_appender = tracing_appender::rolling::daily(log_dir, "streamdex.log");
  let (writer, guard) = tracing_appender::non_blocking(file_appender);
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();
  Some(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _log_guard = init_logging();

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args) -> Result<()> {
  let base_url = args
    .base_url
    .or_else(|| Config::load().base_url)
    .unwrap_or_else(|| constants().default_base_url.clone());

  let mut app = App::new(base_url);
  app.trigger_refresh();

  loop {
    app.check_pending();
    app.player.check_mpv_status();
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key).await?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  app.player.stop().await?;
  Ok(())
}
