//! Oaracle - pick a spot on the map, find out if it's a good day to row.
//!
//! With no arguments this starts the terminal UI. A few one-shot modes are
//! available for scripting and for checking the backend:
//!
//! ```text
//! oaracle --conditions <lat> <lng>
//! oaracle --health
//! oaracle --locate
//! ```

mod app;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use oaracle_core::api::{
    build_http_client, ApiClient, DeviceLocator, IpLocator, LocationResolver, NominatimClient,
};
use oaracle_core::models::ConditionsRequest;
use oaracle_core::{Config, GeoPoint};

use app::{App, AppState};
use ui::input::{handle_input, handle_mouse};
use ui::render::render;
use ui::results::ResultsView;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "oaracle.log";

/// Log to stderr. Used by the one-shot modes.
fn init_stderr_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Log to a daily file while the TUI owns the terminal.
/// The returned guard must live until shutdown so buffered lines are flushed.
fn init_file_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = match config.log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            return None;
        }
    };
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Logging disabled: cannot create {}: {}", log_dir.display(), e);
        return None;
    }

    let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

/// Fall back to defaults (with env overrides) if the config file is
/// unreadable.
fn config_or_default(loaded: Result<Config>) -> Config {
    match loaded {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            let mut config = Config::default();
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        init_stderr_tracing();
        let config = config_or_default(Config::load());
        return match args[1].as_str() {
            "--conditions" => print_conditions(&config, &args[2..]).await,
            "--health" => print_health(&config).await,
            "--locate" => print_location(&config).await,
            other => bail!(
                "Unknown argument: {}\nUsage: oaracle [--conditions <lat> <lng> | --health | --locate]",
                other
            ),
        };
    }

    let loaded = Config::load();
    let fallback = Config::default();
    let _log_guard = init_file_tracing(loaded.as_ref().unwrap_or(&fallback));
    let config = config_or_default(loaded);
    info!(api = %config.api_base_url, "Oaracle starting");

    // Create app before touching the terminal so errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;
    app.save_view();

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

    info!("Oaracle shutting down");
    Ok(())
}

fn parse_point(args: &[String]) -> Result<GeoPoint> {
    let [lat, lng] = args else {
        bail!("Usage: oaracle --conditions <lat> <lng>");
    };
    let latitude: f64 = lat
        .parse()
        .with_context(|| format!("Invalid latitude: {}", lat))?;
    let longitude: f64 = lng
        .parse()
        .with_context(|| format!("Invalid longitude: {}", lng))?;

    let point = GeoPoint::new(latitude, longitude);
    if !point.is_valid() {
        bail!("Coordinates out of range: {}", point);
    }
    Ok(point)
}

/// Resolve the place name and fetch conditions for one point, concurrently,
/// and print a text summary.
async fn print_conditions(config: &Config, args: &[String]) -> Result<()> {
    let point = parse_point(args)?;

    let http = build_http_client(&config.user_agent)?;
    let resolver = NominatimClient::with_client(http.clone(), config);
    let conditions = ApiClient::with_client(http, config);
    let request = ConditionsRequest::for_point(point);

    eprintln!("Fetching conditions for {}...", point);
    let (description, result) = futures::join!(
        resolver.resolve(point),
        conditions.fetch_conditions(&request)
    );

    println!("{}", description);
    println!("{}", point);
    println!();
    match result {
        Ok(result) => {
            print!("{}", ResultsView::from_result(&result).to_text());
            Ok(())
        }
        Err(e) => bail!("Failed to fetch rowing conditions: {}", e),
    }
}

async fn print_health(config: &Config) -> Result<()> {
    let client = ApiClient::new(config)?;
    let health = client.health().await?;

    println!(
        "{}: {} ({})",
        health.service.as_deref().unwrap_or("backend"),
        health.status.as_deref().unwrap_or("unknown"),
        health.timestamp.as_deref().unwrap_or("no timestamp"),
    );
    if !health.is_healthy() {
        bail!("Backend at {} is not healthy", config.api_base_url);
    }
    Ok(())
}

async fn print_location(config: &Config) -> Result<()> {
    let locator = IpLocator::new(config)?;
    let point = locator.locate().await?;
    println!("{}", point);
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut frame_area = Rect::default();

    loop {
        // Draw UI
        terminal.draw(|f| {
            frame_area = f.area();
            render(f, app);
        })?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    // Ctrl+C to quit
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        return Ok(());
                    }

                    // Handle input
                    if handle_input(app, key)? {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => handle_mouse(app, mouse, frame_area),
                _ => {}
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_point() {
        let point = parse_point(&args(&["51.7520", "-1.2577"])).unwrap();
        assert_eq!(point, GeoPoint::new(51.752, -1.2577));
    }

    #[test]
    fn test_parse_point_rejects_bad_input() {
        assert!(parse_point(&args(&["51.7"])).is_err());
        assert!(parse_point(&args(&["north", "-1.2"])).is_err());
        assert!(parse_point(&args(&["91", "0"])).is_err());
        assert!(parse_point(&args(&["1", "2", "3"])).is_err());
    }
}
