//! # Command History
//!
//! Ordered list of previously submitted lines, capped at 100 entries with
//! oldest-first eviction, plus a transient draft slot holding whatever the
//! user was typing before they started navigating.
//!
//! Persisted as a JSON array under the user data dir. Writes go through a
//! `.tmp` rename for crash safety; load failures degrade to an empty
//! history with a logged warning, never a crash.

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};

/// Maximum number of retained entries.
pub const MAX_ENTRIES: usize = 100;

#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    /// Navigation position; `entries.len()` means "past the newest entry",
    /// i.e. back on the draft.
    index: usize,
    /// What the user had typed before navigation started. Returned (and
    /// cleared) when navigating down past the newest entry.
    draft: Option<String>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Append a submitted line, evicting the oldest entry at capacity.
    /// Resets navigation state.
    pub fn add(&mut self, line: &str) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push(line.to_string());
        self.index = self.entries.len();
        self.draft = None;
    }

    /// Navigate one entry back. The first call stashes `current` as the
    /// draft. Returns `None` when the history is empty.
    pub fn previous(&mut self, current: &str) -> Option<String> {
        if self.draft.is_none() {
            self.draft = Some(current.to_string());
        }
        if self.index > 0 {
            self.index -= 1;
        }
        self.entries.get(self.index).cloned()
    }

    /// Navigate one entry forward. Past the newest entry, yields the
    /// stashed draft (clearing it).
    pub fn next(&mut self) -> Option<String> {
        if self.index < self.entries.len() {
            self.index += 1;
        }
        if self.index == self.entries.len() {
            return self.draft.take();
        }
        self.entries.get(self.index).cloned()
    }

    /// Load history from a JSON file. A missing file is an empty history;
    /// a corrupt one is logged and discarded.
    pub fn load(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("Discarding corrupt history file {}: {}", path.display(), err);
                    Vec::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                warn!("Failed to read history file {}: {}", path.display(), err);
                Vec::new()
            }
        };
        debug!("Loaded {} history entries", entries.len());
        let index = entries.len();
        Self {
            entries,
            index,
            draft: None,
        }
    }

    /// Persist the entries, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string(&self.entries)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
