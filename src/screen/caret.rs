//! Caret derivation for the active input region.
//!
//! The caret is not stored anywhere. It is recomputed on demand from the
//! editor's cursor and selection: exactly one character is marked as the
//! blinking caret, or the region's trailing slot when the cursor sits past
//! all content, or nothing at all while a selection is open (the selection
//! highlight stands in). Because the split is a pure function of
//! (text, cursor), recomputing it never accumulates structural state —
//! repeated calls with no movement yield identical output.

use crate::screen::Editor;

/// Which single position in a region currently blinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretMark {
    /// A selection is open; no single character blinks.
    None,
    /// The character starting at this byte offset blinks.
    Char(usize),
    /// The cursor is past all content; the region's trailing slot blinks.
    EndOfText,
}

/// Derive the caret for the given editor state.
pub fn caret_mark(editor: &Editor) -> CaretMark {
    if editor.selection().is_some() {
        return CaretMark::None;
    }
    if editor.cursor() >= editor.text().len() {
        return CaretMark::EndOfText;
    }
    CaretMark::Char(editor.cursor())
}

/// A region's text split around its caret: the plain run before it, the
/// single caret character (if any), and the plain run after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretSplit<'a> {
    pub before: &'a str,
    pub caret: Option<&'a str>,
    pub after: &'a str,
}

impl CaretSplit<'_> {
    /// True when the caret sits on a lone newline, which needs a dedicated
    /// visible marker so the caret on an empty line keeps its width.
    pub fn caret_on_newline(&self) -> bool {
        self.caret == Some("\n")
    }
}

/// Split `text` into before / caret character / after for rendering.
///
/// At most one character ends up in the caret slot; `None` and `EndOfText`
/// marks leave the text whole (the latter blinks the trailing slot, which
/// has no character to carry).
pub fn split_at_caret(text: &str, mark: CaretMark) -> CaretSplit<'_> {
    match mark {
        CaretMark::Char(offset) if offset < text.len() => {
            let ch_len = text[offset..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(0);
            CaretSplit {
                before: &text[..offset],
                caret: Some(&text[offset..offset + ch_len]),
                after: &text[offset + ch_len..],
            }
        }
        _ => CaretSplit {
            before: text,
            caret: None,
            after: "",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_at(text: &str, cursor_from_end: usize) -> Editor {
        let mut ed = Editor::new();
        ed.set_text(text);
        for _ in 0..cursor_from_end {
            ed.move_left(false);
        }
        ed
    }

    #[test]
    fn test_caret_in_plain_run_marks_one_char() {
        let ed = editor_at("hello", 3);
        let mark = caret_mark(&ed);
        assert_eq!(mark, CaretMark::Char(2));

        let split = split_at_caret(ed.text(), mark);
        assert_eq!(split.before, "he");
        assert_eq!(split.caret, Some("l"));
        assert_eq!(split.after, "lo");
    }

    #[test]
    fn test_caret_at_end_degenerates_to_region_slot() {
        let ed = editor_at("hello", 0);
        assert_eq!(caret_mark(&ed), CaretMark::EndOfText);

        let split = split_at_caret(ed.text(), CaretMark::EndOfText);
        assert_eq!(split.before, "hello");
        assert_eq!(split.caret, None);
    }

    #[test]
    fn test_empty_region_blinks_whole_slot() {
        let ed = Editor::new();
        assert_eq!(caret_mark(&ed), CaretMark::EndOfText);
    }

    #[test]
    fn test_selection_suppresses_caret() {
        let mut ed = Editor::new();
        ed.set_text("hello");
        ed.move_left(true);
        ed.move_left(true);
        assert_eq!(caret_mark(&ed), CaretMark::None);

        let split = split_at_caret(ed.text(), CaretMark::None);
        assert_eq!(split.caret, None);
        assert_eq!(split.before, "hello");
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let ed = editor_at("some text", 4);
        let first = split_at_caret(ed.text(), caret_mark(&ed));
        let second = split_at_caret(ed.text(), caret_mark(&ed));
        assert_eq!(first, second);

        // The split never produces more than the three fixed parts, so
        // repeated recomputation cannot grow the styled unit count.
        assert_eq!(
            first.before.len() + first.caret.map_or(0, str::len) + first.after.len(),
            ed.text().len()
        );
    }

    #[test]
    fn test_caret_on_newline_needs_marker() {
        let mut ed = Editor::new();
        ed.set_text("line\n\nmore");
        // Place the cursor on the empty line's newline (offset 5).
        for _ in 0.."more".len() + 1 {
            ed.move_left(false);
        }
        let mark = caret_mark(&ed);
        assert_eq!(mark, CaretMark::Char(5));

        let split = split_at_caret(ed.text(), mark);
        assert!(split.caret_on_newline());
    }

    #[test]
    fn test_caret_on_multibyte_char() {
        let mut ed = Editor::new();
        ed.set_text("héllo");
        for _ in 0..4 {
            ed.move_left(false);
        }
        let split = split_at_caret(ed.text(), caret_mark(&ed));
        assert_eq!(split.caret, Some("é"));
        assert_eq!(split.before, "h");
        assert_eq!(split.after, "llo");
    }
}
