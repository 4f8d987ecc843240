//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::screen::{Key, KeyPress, Screen};

/// A screen that prints without animation delays.
pub fn fast_screen() -> Screen {
    Screen::with_print_delay(0)
}

/// Type a string into the active prompt, one key press at a time.
pub fn type_str(screen: &Screen, text: &str) {
    for c in text.chars() {
        screen.handle_key(KeyPress::char(c));
    }
}

/// Type a line and submit it with Enter.
pub fn submit_line(screen: &Screen, text: &str) {
    type_str(screen, text);
    screen.handle_key(KeyPress::plain(Key::Enter));
}
