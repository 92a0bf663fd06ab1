use std::fs::File;
use std::io;
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event as CEvent, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tui::{backend::CrosstermBackend, Terminal};

use crate::app::App;
use crate::cli::Args;
use crate::dataset::PassengerTable;
use crate::report::Report;

mod aggregator;
mod app;
mod cli;
mod csv_reader;
mod dataset;
mod error;
mod report;
mod selection;
mod stats;
#[cfg(test)]
mod testing;
mod ui;

enum Event<I> {
    Input(I),
    Tick,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.summary {
        let table = PassengerTable::load(&args.data)
            .with_context(|| format!("cannot start without {}", args.data.display()))?;
        let report = Report::build(&table)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    init_logging(&args)?;
    info!("titanic-dash v{}", env!("CARGO_PKG_VERSION"));

    let table = match PassengerTable::load(&args.data) {
        Ok(table) => table,
        Err(e) => {
            error!(error = %e, "startup aborted");
            return Err(e).with_context(|| format!("cannot start without {}", args.data.display()));
        }
    };
    let mut app = App::new(&table)?;

    enable_raw_mode().context("cannot switch the terminal to raw mode")?;
    let mut terminal = setup_or_restore(setup_terminal, restore_terminal)?;

    let result = run(&mut terminal, &mut app, args.tick_rate());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "dashboard stopped");
    }
    info!("bye");
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Runs `setup`, calling `restore` before returning its error.
fn setup_or_restore<T>(
    setup: impl FnOnce() -> Result<T>,
    restore: impl FnOnce(),
) -> Result<T> {
    setup().map_err(|e| {
        restore();
        e
    })
}

/// Logs go to a file because the dashboard owns the terminal.
fn init_logging(args: &Args) -> Result<()> {
    let file = File::create(&args.log_file)
        .with_context(|| format!("cannot create log file {}", args.log_file.display()))?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn spawn_input(tick_rate: Duration) -> mpsc::Receiver<Event<KeyEvent>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut last_tick = Instant::now();
        loop {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));

            if event::poll(timeout).unwrap_or(false) {
                if let Ok(CEvent::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press && tx.send(Event::Input(key)).is_err() {
                        return;
                    }
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.send(Event::Tick).is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });
    rx
}

fn run<B: tui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let rx = spawn_input(tick_rate);
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match rx.recv()? {
            Event::Input(key) => app.on_key(key.code),
            Event::Tick => {}
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use anyhow::anyhow;

    use super::*;

    #[test]
    fn failed_setup_restores_the_terminal() {
        let restored = Cell::new(false);
        let result: Result<()> =
            setup_or_restore(|| Err(anyhow!("no alternate screen")), || restored.set(true));
        assert!(result.is_err());
        assert!(restored.get());
    }

    #[test]
    fn successful_setup_leaves_the_terminal_alone() {
        let restored = Cell::new(false);
        let value = setup_or_restore(|| Ok(7), || restored.set(true)).unwrap();
        assert_eq!(value, 7);
        assert!(!restored.get());
    }
}
