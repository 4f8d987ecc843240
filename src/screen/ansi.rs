//! SGR color-code stripping.
//!
//! Printed text may carry ANSI color sequences (`ESC [ … m`). The engine
//! accepts them but never renders them; they are removed before the
//! character-by-character animation so they do not flicker through.

use once_cell::sync::Lazy;
use regex::Regex;

static SGR_SEQUENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Remove every SGR color sequence from `text`.
pub fn strip_sgr(text: &str) -> String {
    SGR_SEQUENCE.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_color_sequences() {
        assert_eq!(strip_sgr("\x1b[31mred\x1b[0m text"), "red text");
        assert_eq!(strip_sgr("\x1b[1;32;40mbold\x1b[m"), "bold");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(strip_sgr("no codes here"), "no codes here");
    }

    #[test]
    fn test_non_sgr_escapes_pass_through() {
        // Only color codes are stripped; other escapes are not interpreted.
        assert_eq!(strip_sgr("\x1b[2Jtext"), "\x1b[2Jtext");
    }
}
