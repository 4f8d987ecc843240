//! # TUI Adapter
//!
//! The ratatui-specific layer. Owns the terminal, renders the transcript,
//! and translates keyboard events into engine `KeyPress` values.
//!
//! This is the only module that knows about ratatui and crossterm; the
//! screen engine and the shell run the same against any adapter.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - The engine bumps a revision counter on every mutation; a frame is
//!   drawn only when it changed, the blink phase flipped while a cursor is
//!   showing, or input arrived.
//! - The poll timeout is short (~80ms) while a cursor is blinking and long
//!   (500ms) when the screen is idle.
//!
//! The hardware cursor stays hidden throughout; the blinking caret is
//! emulated by the renderer, which is what lets it live anywhere in the
//! transcript flow.

mod event;
mod screen_view;

use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use log::info;

use crate::commands;
use crate::core::config::ResolvedConfig;
use crate::core::shell::Shell;
use crate::screen::Screen;
use crate::tui::event::TuiEvent;
use crate::tui::screen_view::ScreenViewState;

const BLINK_INTERVAL_MS: u128 = 530;

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        info!("Terminal modes enabled (mouse capture, bracketed paste)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableBracketedPaste, DisableMouseCapture);
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let screen = Screen::with_print_delay(config.print_delay_ms);
    let shell = Shell::new(
        screen.clone(),
        commands::default_commands(),
        Arc::new(config),
    );
    let shell_task = tokio::spawn(shell.run());

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()?;

    let mut view = ScreenViewState::new();
    let start = Instant::now();
    let mut last_revision = u64::MAX;
    let mut last_blink = true;
    let mut needs_redraw = true;

    while !shell_task.is_finished() {
        let revision = screen.revision();
        if revision != last_revision {
            last_revision = revision;
            needs_redraw = true;
        }

        let blink_on = (start.elapsed().as_millis() / BLINK_INTERVAL_MS) % 2 == 0;
        if blink_on != last_blink && screen.has_active_cursor() {
            needs_redraw = true;
        }
        last_blink = blink_on;

        // The engine requests scroll-to-bottom on appends and key events;
        // honoring it re-attaches the view after manual scrolling.
        if screen.take_scroll_request() {
            view.stick_to_bottom = true;
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|frame| screen_view::draw(frame, &screen, &mut view, blink_on))?;
            needs_redraw = false;
        }

        let timeout = if screen.has_active_cursor() {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };

        // Process first event + drain all pending events before next draw.
        let first_event = event::poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }
        for tui_event in first_event
            .into_iter()
            .chain(std::iter::from_fn(event::poll_event_immediate))
        {
            match tui_event {
                TuiEvent::Key(key) => screen.handle_key(key),
                TuiEvent::Paste(text) => screen.handle_paste(&text),
                TuiEvent::ScrollUp => view.scroll_up(1),
                TuiEvent::ScrollDown => view.scroll_down(1),
                TuiEvent::ScrollPageUp => view.page_up(),
                TuiEvent::ScrollPageDown => view.page_down(),
                TuiEvent::Resize => {}
            }
        }
    }

    ratatui::restore();
    Ok(())
}
