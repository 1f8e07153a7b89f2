//! Terminal management and main run loop

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cmdpal_core::PaletteConfig;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use super::app::App;
use super::event::{handle_key, handle_mouse, poll_event, HandleResult};
use super::ui;

/// Upper bound on how long the loop sleeps waiting for input
const TICK: Duration = Duration::from_millis(100);

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Run the TUI application
pub fn run(config: PaletteConfig) -> Result<()> {
    let mut app = App::new(config)?;
    info!(items = app.items.len(), menus = app.menus.len(), "starting TUI");

    let mut terminal = init_terminal()?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal (even if loop failed)
    restore_terminal(&mut terminal)?;

    result
}

/// Wait no longer than the next hover deadline so menus close on time
fn poll_timeout(app: &App) -> Duration {
    app.hover
        .next_deadline()
        .map(|deadline| deadline.saturating_duration_since(Instant::now()).min(TICK))
        .unwrap_or(TICK)
}

/// Main event loop
fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let completed = terminal.draw(|frame| ui::render(frame, app))?;
        app.viewport = completed.area;

        if let Some(event) = poll_event(poll_timeout(app))? {
            let result = match event {
                Event::Key(key) => handle_key(app, key),
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                // Terminal resized, will be handled on next draw
                _ => HandleResult::Continue,
            };
            if result == HandleResult::Quit {
                app.should_quit = true;
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    info!("TUI exited");
    Ok(())
}
