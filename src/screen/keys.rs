//! Engine-level key model.
//!
//! The screen engine never sees crossterm types; the TUI adapter translates
//! real terminal events into `KeyPress` values before feeding them to
//! `Screen::handle_key`. Prompt hooks receive the same type, so programs can
//! intercept keys without depending on any terminal backend.

use crate::screen::Editor;

/// Keys meaningful to an editable input region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Tab,
    Esc,
}

/// A single key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub code: Key,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyPress {
    /// A key press with no modifiers.
    pub fn plain(code: Key) -> Self {
        Self {
            code,
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    /// A plain character key.
    pub fn char(c: char) -> Self {
        Self::plain(Key::Char(c))
    }

    /// A Ctrl+character chord.
    pub fn ctrl(c: char) -> Self {
        Self {
            code: Key::Char(c),
            ctrl: true,
            alt: false,
            shift: false,
        }
    }

    /// A shifted key (used for selection-extending cursor movement).
    pub fn shifted(code: Key) -> Self {
        Self {
            code,
            ctrl: false,
            alt: false,
            shift: true,
        }
    }
}

/// What a prompt hook decided about a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// The hook did not handle the key; built-in handling runs.
    Pass,
    /// The hook consumed the key; built-in handling is skipped.
    Handled,
    /// Finish the prompt now, resolving the pending read with the
    /// region's current content (the multi-line "custom submit" path).
    Finish,
}

/// A caller-supplied key interceptor for a prompt.
///
/// Invoked with every raw key event before built-in handling, together with
/// mutable access to the region's editor so the hook can rewrite the input
/// (history navigation, tab completion) or trigger a custom finish.
pub type PromptHook = Box<dyn FnMut(&KeyPress, &mut Editor) -> HookAction + Send>;
