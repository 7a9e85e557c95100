//! livescroll-news: an endlessly scrolling news reader for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  fetch   ┌──────────┐  rows    ┌────────────┐
//! │ source/  │ ───────► │ cache.rs │ ───────► │ PagedList  │
//! │  (HTTP)  │          │ (SQLite) │          │  (paging/) │
//! └──────────┘          └──────────┘          └────────────┘
//!      ▲                     │ changes              │ short read
//!      │                     ▼                      ▼
//!      │               ┌───────────┐        ┌──────────────────┐
//!      └────────────── │ events.rs │ ◄───── │ BoundaryCallback │
//!                      │  (pump)   │ status └──────────────────┘
//!                      └───────────┘
//!                            │ FeedEvent
//!                            ▼
//!  input.rs ─────────►  app.rs  ─────────►  ui.rs
//! ```
//!
//! * **`source/`**: the `NewsSource` trait and the HTTP feed client.
//! * **`cache`**: the SQLite store, owned by a dedicated thread.
//! * **`paging/`**: the paged list, its boundary callback, and the
//!   repository that wires them to a source and the cache.
//! * **`events`**: forwards cache changes and request status to the UI.
//! * **`app`** / **`ui`** / **`input`**: state, rendering, key handling.
//! * **`main`**: reads settings, sets up logging and the terminal, and
//!   runs the event loop.

mod app;
mod cache;
mod config;
mod error;
mod events;
mod input;
mod network;
mod paging;
mod source;
mod time;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::App;
use cache::NewsCache;
use config::Settings;
use events::FeedEvent;
use input::Command;
use paging::{FetchOptions, NewsRepository};
use source::ApiSource;

/// Restores the terminal on drop, normally or while unwinding.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Log to a file; the terminal belongs to the UI.
fn init_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let settings = Settings::from_env(std::env::args().nth(1));
    init_tracing(&settings.log_file)?;
    install_panic_hook();

    info!(
        api = %settings.api_url,
        feed = %settings.feed_id,
        connection = ?settings.network.connection,
        "starting"
    );

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;

    let cache = NewsCache::open(&settings.database_path)
        .with_context(|| format!("opening cache {}", settings.database_path.display()))?;
    let source = ApiSource::new(&settings.api_url, &settings.feed_id, settings.fetch_timeout)?;
    let options = FetchOptions {
        policy: settings.network,
        timeout: settings.fetch_timeout,
    };
    let mut repo = NewsRepository::new(
        Arc::new(source),
        cache.clone(),
        options,
        settings.page_size,
        runtime.handle().clone(),
    );

    let mut feed = runtime.block_on(repo.open())?;
    let mut rx = events::spawn(
        runtime.handle(),
        cache.subscribe(),
        feed.network_state.clone(),
        feed.refresh_state.clone(),
    );

    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    app.set_items(feed.pages.items().to_vec());

    // ~10 fps.  Each tick drains feed events, renders, then waits for a key.
    let tick_rate = Duration::from_millis(100);

    loop {
        let mut reload = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                FeedEvent::CacheChanged => reload = true,
                FeedEvent::Network(state) => app.set_network_state(state),
                FeedEvent::Refresh(state) => app.set_refresh_state(state),
            }
        }
        if reload {
            runtime.block_on(feed.pages.reload())?;
            app.set_items(feed.pages.items().to_vec());
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                match input::handle_key_event(&mut app, key) {
                    Some(Command::LoadMore) => {
                        runtime.block_on(feed.pages.load_more())?;
                        app.set_items(feed.pages.items().to_vec());
                    }
                    Some(Command::Refresh) => {
                        if !repo.refresh() {
                            app.status = "Already loading…".into();
                        }
                    }
                    Some(Command::Retry) => {
                        if !repo.retry() {
                            app.status = "Nothing to retry".into();
                        }
                    }
                    None => {}
                }
            }
        }

        if app.quit {
            break;
        }
    }

    info!("exiting");
    Ok(())
}
