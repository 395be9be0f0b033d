//! Main event loop for the TUI.
//!
//! Terminal input and shutdown signals are multiplexed with `tokio::select!`.
//! Every session operation is awaited on this task, so the lists and the
//! dwell clock are never touched concurrently. Operations redraw through a
//! [`Progress`](crate::app::Progress) callback before each slow call.

use crate::app::App;
use crate::preview::{ExternalLaunch, PreviewError};
use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::{FutureExt, StreamExt};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, Stdout};

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

use super::input::{handle_key, Step};
use super::render::{render, PaneLayout};

type Tui = Terminal<CrosstermBackend<Stdout>>;

enum Wake {
    Shutdown(&'static str),
    Terminal(Option<io::Result<Event>>),
}

/// Runs the session until the quit key, SIGINT/SIGTERM, or the end of the
/// input stream. A pending auto-mark is applied before returning.
///
/// # Panic Safety
///
/// Installs a panic hook that restores terminal state before unwinding,
/// ensuring the terminal is not left in raw mode on panic.
pub async fn run(app: &mut App) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal().context("Failed to set up terminal")?;
    let result = event_loop(&mut terminal, app).await;
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;
    result
}

async fn event_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
    // On non-Unix platforms these become pending futures that never complete
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    sync_preview_width(terminal, app).await?;
    app.init(&mut |a: &App| draw(terminal, a)).await;

    let mut events = EventStream::new();

    loop {
        if app.needs_redraw {
            draw(terminal, app);
            app.needs_redraw = false;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        let wake = tokio::select! {
            biased;

            _ = sigterm_fut => Wake::Shutdown("SIGTERM"),
            _ = sigint_fut => Wake::Shutdown("SIGINT"),
            maybe_event = events.next() => Wake::Terminal(maybe_event),
        };

        match wake {
            Wake::Shutdown(name) => {
                tracing::info!(signal = name, "Received signal, shutting down");
                break;
            }
            Wake::Terminal(None) => {
                tracing::info!("Terminal input closed, shutting down");
                break;
            }
            Wake::Terminal(Some(Err(e))) => {
                tracing::warn!(error = %e, "Failed to read terminal event");
            }
            Wake::Terminal(Some(Ok(Event::Resize(..)))) => {
                sync_preview_width(terminal, app).await?;
                app.needs_redraw = true;
            }
            Wake::Terminal(Some(Ok(Event::Key(key)))) if key.kind == KeyEventKind::Press => {
                app.needs_redraw = true;
                match handle_key(app, key, &mut |a: &App| draw(terminal, a)).await {
                    Step::Continue => {}
                    Step::Quit => break,
                    Step::Launch(launch) => {
                        // The child reads stdin directly; stop polling it.
                        drop(events);
                        let outcome = run_external(terminal, &launch).await?;
                        // Ctrl+C inside the viewer also reached this process.
                        #[cfg(unix)]
                        discard_pending(&mut sigint).await;
                        events = EventStream::new();
                        app.finish_external(&launch, outcome, &mut |a: &App| draw(terminal, a))
                            .await;
                    }
                }
            }
            Wake::Terminal(Some(Ok(_))) => {}
        }
    }

    app.quit(&mut |a: &App| draw(terminal, a)).await;
    Ok(())
}

fn draw(terminal: &mut Tui, app: &App) {
    if let Err(e) = terminal.draw(|f| render(f, app)) {
        tracing::warn!(error = %e, "Failed to draw frame");
    }
}

/// Keep the renderer width equal to the preview pane's inner width.
async fn sync_preview_width(terminal: &Tui, app: &mut App) -> Result<()> {
    let size = terminal.size()?;
    let area = Rect::new(0, 0, size.width, size.height);
    if let Some(layout) = PaneLayout::for_app(area, app) {
        app.resize_preview(layout.preview_cols()).await;
    }
    Ok(())
}

/// Drop deliveries of `signal` already queued. Returns how many were dropped.
#[cfg(unix)]
async fn discard_pending(signal: &mut Signal) -> usize {
    // Let the signal driver pick up anything delivered while we waited.
    tokio::task::yield_now().await;
    let mut dropped = 0;
    while let Some(Some(())) = signal.recv().now_or_never() {
        dropped += 1;
    }
    if dropped > 0 {
        tracing::debug!(dropped, "Discarded interrupt sent to external viewer");
    }
    dropped
}

/// Hand the terminal to `launch`, wait for it, and take the terminal back.
///
/// The terminal is resumed even when the child could not be started.
async fn run_external(
    terminal: &mut Tui,
    launch: &ExternalLaunch,
) -> Result<Result<bool, PreviewError>> {
    if let Err(e) = suspend_terminal(terminal) {
        resume_terminal(terminal).context("Failed to resume terminal")?;
        return Err(e).context("Failed to suspend terminal");
    }
    let outcome = launch.run().await;
    tracing::debug!(program = %launch.program, ?outcome, "External viewer finished");
    resume_terminal(terminal).context("Failed to resume terminal")?;
    Ok(outcome)
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn suspend_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)
}

fn resume_terminal(terminal: &mut Tui) -> io::Result<()> {
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()
}

/// Restore terminal to normal state.
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
