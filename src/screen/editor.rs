//! In-memory text and cursor model for an input region.
//!
//! `Editor` owns the buffer, a byte cursor offset and an optional selection
//! anchor. Cursor position is a first-class field, not a property of any
//! rendered structure; the caret shown on screen is derived from it on
//! demand (see `caret.rs`).

use unicode_width::UnicodeWidthChar;

#[derive(Default)]
pub struct Editor {
    text: String,
    /// Cursor position as byte offset in `text` (0..=text.len()).
    cursor: usize,
    /// Selection anchor as byte offset. `Some` while a selection gesture is
    /// in progress; the selection spans anchor..cursor in either direction.
    anchor: Option<usize>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The selection as a normalized byte range, or `None` when collapsed.
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    /// Replace the entire buffer, placing the cursor at the end.
    /// Used by history navigation and tab completion.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
        self.anchor = None;
    }

    /// Append a character without moving the cursor or touching the
    /// selection. Used for the trailing newline marker a region gains when
    /// it is frozen.
    pub(crate) fn push_raw(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn insert_char(&mut self, c: char) {
        self.delete_selection();
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.delete_selection();
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) {
        if self.delete_selection() {
            return;
        }
        if self.cursor > 0 {
            let prev = prev_char_boundary(&self.text, self.cursor);
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete_forward(&mut self) {
        if self.delete_selection() {
            return;
        }
        if self.cursor < self.text.len() {
            let next = next_char_boundary(&self.text, self.cursor);
            self.text.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self, select: bool) {
        if !select && let Some((start, _)) = self.selection() {
            self.cursor = start;
            self.anchor = None;
            return;
        }
        self.begin_move(select);
        if self.cursor > 0 {
            self.cursor = prev_char_boundary(&self.text, self.cursor);
        }
    }

    pub fn move_right(&mut self, select: bool) {
        if !select && let Some((_, end)) = self.selection() {
            self.cursor = end;
            self.anchor = None;
            return;
        }
        self.begin_move(select);
        if self.cursor < self.text.len() {
            self.cursor = next_char_boundary(&self.text, self.cursor);
        }
    }

    /// Move to the start of the current logical line.
    pub fn move_home(&mut self, select: bool) {
        self.begin_move(select);
        self.cursor = self.line_start(self.cursor);
    }

    /// Move to the end of the current logical line.
    pub fn move_end(&mut self, select: bool) {
        self.begin_move(select);
        self.cursor = self.line_end(self.cursor);
    }

    /// Move one logical line up, keeping the display column where possible.
    pub fn move_up(&mut self, select: bool) {
        self.begin_move(select);
        let line_start = self.line_start(self.cursor);
        if line_start == 0 {
            return;
        }
        let column = self.column_at(line_start, self.cursor);
        let prev_start = self.line_start(line_start - 1);
        self.cursor = self.pos_at_column(prev_start, line_start - 1, column);
    }

    /// Move one logical line down, keeping the display column where possible.
    pub fn move_down(&mut self, select: bool) {
        self.begin_move(select);
        let line_end = self.line_end(self.cursor);
        if line_end == self.text.len() {
            return;
        }
        let column = self.column_at(self.line_start(self.cursor), self.cursor);
        let next_start = line_end + 1;
        let next_end = self.line_end(next_start);
        self.cursor = self.pos_at_column(next_start, next_end, column);
    }

    /// Remove the selected range, if any. Returns `true` if a selection was
    /// deleted (the key that triggered it is then considered handled).
    fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            self.anchor = None;
            return false;
        };
        self.text.drain(start..end);
        self.cursor = start;
        self.anchor = None;
        true
    }

    /// Anchor bookkeeping shared by all cursor movement: a shifted move
    /// starts or extends the selection, a plain move collapses it.
    fn begin_move(&mut self, select: bool) {
        if select {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
    }

    fn line_start(&self, pos: usize) -> usize {
        self.text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.text[pos..]
            .find('\n')
            .map(|i| pos + i)
            .unwrap_or(self.text.len())
    }

    /// Display width of the text between a line start and a position on it.
    fn column_at(&self, line_start: usize, pos: usize) -> usize {
        self.text[line_start..pos]
            .chars()
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    /// Byte offset on `start..end` closest to the given display column.
    fn pos_at_column(&self, start: usize, end: usize, column: usize) -> usize {
        let mut width = 0;
        for (i, c) in self.text[start..end].char_indices() {
            if width >= column {
                return start + i;
            }
            width += c.width().unwrap_or(0);
        }
        end
    }
}

/// Find the byte offset of the previous character boundary before `pos`.
fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos`.
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}
