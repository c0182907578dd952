//! ShopDash - a terminal dashboard for a shop backend.
//!
//! Keyboard-driven views of orders, products, analytics and store settings,
//! backed by the session and request pipeline in `shopdash-core`.

mod app;
mod ui;
mod utils;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shopdash_core::config::ENV_PASSWORD;
use shopdash_core::{ApiClient, ChannelNavigator, Config, SessionContext, TokenKind, TokenStorage};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE: &str = "shopdash.log";

const USAGE: &str = "Usage: shopdash [--ephemeral | --status | --login | --logout]";

/// What the command line asked for
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Tui,
    Status,
    Login,
    Logout,
}

/// Parse the first argument. `--ephemeral` runs the TUI with tokens kept
/// in memory only, so nothing outlives the process.
fn parse_command(arg: Option<&str>, config: &mut Config) -> Result<Command, String> {
    match arg {
        None => Ok(Command::Tui),
        Some("--ephemeral") => {
            config.token_storage = TokenStorage::Memory;
            Ok(Command::Tui)
        }
        Some("--status") => Ok(Command::Status),
        Some("--login") => Ok(Command::Login),
        Some("--logout") => Ok(Command::Logout),
        Some(other) => Err(format!("Unknown argument: {}", other)),
    }
}

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a file in the cache
/// directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = Config::cache_dir().ok().and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(LOG_FILE)
            .build(dir)
            .ok()
    });
    let (writer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    match writer {
        Some(writer) => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .with(filter)
            .init(),
        None => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::sink))
            .with(filter)
            .init(),
    }
    guard
}

/// Load config, falling back to defaults when the file is unreadable
fn load_config() -> Result<Config> {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    config.apply_env()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    let mut config = load_config()?;

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match parse_command(args.get(1).map(String::as_str), &mut config) {
        Ok(Command::Status) => return print_status(&config),
        Ok(Command::Logout) => return logout(&config),
        Ok(Command::Login) => return login_cli(config).await,
        Ok(Command::Tui) => {}
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    info!(
        api = %config.api_base_url,
        storage = ?config.token_storage,
        "ShopDash TUI starting"
    );

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Show the placeholder, then resolve the stored session
    terminal.draw(|f| render(f, &app))?;
    app.restore();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("ShopDash TUI shutting down");
    Ok(())
}

/// Print where the session lives and whether one is stored
fn print_status(config: &Config) -> Result<()> {
    let store = config.build_store()?;
    println!("API:      {}", config.api_base_url);
    println!("Storage:  {}", store.backend_name());
    match store.has(TokenKind::Access) {
        Ok(true) => println!("Session:  logged in"),
        Ok(false) => println!("Session:  logged out"),
        Err(e) => println!("Session:  unreadable ({})", e),
    }
    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let store = config.build_store()?;
    store.clear().context("Failed to clear stored session")?;
    println!("Logged out of {}", config.api_base_url);
    Ok(())
}

/// Log in from the command line, storing tokens for the next TUI run
async fn login_cli(config: Config) -> Result<()> {
    let default_user = config.last_username.clone().unwrap_or_default();
    if default_user.is_empty() {
        print!("Username: ");
    } else {
        print!("Username [{}]: ", default_user);
    }
    io::stdout().flush()?;
    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = match username.trim() {
        "" => default_user,
        typed => typed.to_string(),
    };

    let password = match std::env::var(ENV_PASSWORD) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ")?,
    };

    let store = Arc::new(config.build_store()?);
    // The receiver has to outlive the login or the landing navigation is dropped
    let (navigator, _nav_rx) = ChannelNavigator::new();
    let navigator = Arc::new(navigator);
    let api = ApiClient::new(
        &config.api_base_url,
        config.request_timeout(),
        store.clone(),
        navigator.clone(),
    )?;
    let session = SessionContext::new(store, api.auth().clone(), navigator);
    session.restore();

    match session.try_login(&username, &password).await {
        Ok(()) => {
            if let Err(e) = Config::remember_username(username.trim()) {
                warn!(error = %e, "Failed to save config");
            }
            println!("Logged in to {}", config.api_base_url);
            Ok(())
        }
        Err(e) => {
            eprintln!("Login failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Navigation requested by the core (login, logout, expired session)
        app.check_navigation();

        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ephemeral_keeps_tokens_in_memory() {
        let mut config = Config::default();
        assert_eq!(parse_command(Some("--ephemeral"), &mut config), Ok(Command::Tui));
        assert_eq!(config.token_storage, TokenStorage::Memory);
        assert_eq!(config.build_store().unwrap().backend_name(), "memory");
    }

    #[test]
    fn test_other_commands_leave_storage_alone() {
        let mut config = Config::default();
        assert_eq!(parse_command(None, &mut config), Ok(Command::Tui));
        assert_eq!(parse_command(Some("--status"), &mut config), Ok(Command::Status));
        assert_eq!(parse_command(Some("--login"), &mut config), Ok(Command::Login));
        assert_eq!(parse_command(Some("--logout"), &mut config), Ok(Command::Logout));
        assert_eq!(config.token_storage, TokenStorage::File);
        assert!(parse_command(Some("--bogus"), &mut config).is_err());
    }
}
