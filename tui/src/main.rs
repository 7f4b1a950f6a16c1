//! Room TUI Entry Point
//!
//! Opens a telehealth room in the terminal.
//!
//! Usage:
//!   room-tui --room-url <URL> [OPTIONS]
//!
//! Options:
//!   --config <FILE>        Configuration file
//!   --base-url <URL>       API base URL
//!   --token-file <PATH>    Access token file
//!   --log-file <PATH>      Log file

use std::io::{self, IsTerminal, Stdout};
use std::panic;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use room_core::{http_session, load_config_from_path, RoomConfig, RoomRoute};
use room_tui::cli::Args;
use room_tui::terminal::{finish, require_tty};
use room_tui::{logging, App, RoomSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to a file; the terminal is ours
    let logging = logging::init(args.log_file.clone())?;

    let mut config = load_config_from_path(args.config.clone())?;
    args.overrides().apply(&mut config)?;
    tracing::info!(source = ?config.source(), base_url = %config.base_url, "Configuration loaded");

    let route = RoomRoute::parse(&args.room_url)
        .with_context(|| format!("not a room URL: {}", args.room_url))?;
    tracing::info!(room = %route, "Opening room");

    // Check if we have a TTY before attempting initialization
    require_tty(
        io::stdin().is_terminal(),
        io::stdout().is_terminal(),
        logging.log_file(),
    )?;

    let session = start_session(&route, &config)?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        tracing::error!(panic = %panic_info, "panic");
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let mut app = App::new(route, &config, session);
    let result = app.run(&mut terminal).await;

    let restored = restore_terminal(&mut terminal);
    finish(result, restored)?;

    println!("Left room {}", app.route().room_name);
    Ok(())
}

/// Leave raw mode and the alternate screen, attempting every step
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let cursor = terminal.show_cursor();
    raw.and(screen)
        .and(cursor)
        .context("failed to restore terminal")
}

/// Build the HTTP session and start the bootstrap in the background
fn start_session(route: &RoomRoute, config: &RoomConfig) -> anyhow::Result<RoomSession> {
    let (bootstrap, client) = http_session(config, route.user_type)?;
    let bootstrap = Arc::new(bootstrap);
    let user_rx = bootstrap.subscribe();
    let handle = bootstrap.spawn(route.url.clone());

    Ok(RoomSession {
        user_rx: Some(user_rx),
        bootstrap: Some(handle),
        client: Some(client),
    })
}
