//! # Shell Programs
//!
//! The built-in command table. Assembled explicitly by
//! [`default_commands`] and handed to the shell — nothing registers
//! itself through globals.
//!
//! ```text
//! commands/
//! ├── mod.rs       (this file: help, clear, history, table assembly)
//! ├── editor.rs    (texteditor)
//! ├── crawler.rs   (dungeon-crawler)
//! └── chat/        (websocket chat client)
//! ```

pub mod chat;
mod crawler;
mod editor;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::shell::{Command, CommandContext, CommandError, CommandSet, EXIT_COMMAND};
use crate::screen::PrintOptions;

/// The stock command table.
pub fn default_commands() -> CommandSet {
    let mut set = CommandSet::new();
    set.register(Arc::new(HelpCommand));
    set.register(Arc::new(ClearCommand));
    set.register(Arc::new(HistoryCommand));
    set.register(Arc::new(editor::TextEditorCommand));
    set.register(Arc::new(crawler::DungeonCrawlerCommand));
    set.register(Arc::new(chat::ChatCommand));
    set
}

struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn summary(&self) -> &'static str {
        "List available commands"
    }

    async fn run(&self, ctx: &CommandContext, _args: &[String]) -> Result<(), CommandError> {
        let mut listing = String::from("Available commands:\n");
        for info in &ctx.commands {
            listing.push_str(&format!("  {:<16} {}\n", info.name, info.summary));
        }
        listing.push_str(&format!("\nType '{EXIT_COMMAND}' to leave the shell.\n"));
        ctx.screen.print_with(&listing, PrintOptions::instant()).await;
        Ok(())
    }
}

struct ClearCommand;

#[async_trait]
impl Command for ClearCommand {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn summary(&self) -> &'static str {
        "Clear the screen"
    }

    async fn run(&self, ctx: &CommandContext, _args: &[String]) -> Result<(), CommandError> {
        ctx.screen.clear();
        Ok(())
    }
}

struct HistoryCommand;

#[async_trait]
impl Command for HistoryCommand {
    fn name(&self) -> &'static str {
        "history"
    }

    fn summary(&self) -> &'static str {
        "Show previously entered commands"
    }

    async fn run(&self, ctx: &CommandContext, _args: &[String]) -> Result<(), CommandError> {
        let entries = ctx.history().entries().to_vec();
        if entries.is_empty() {
            ctx.screen.print("History is empty.\n").await;
            return Ok(());
        }
        let mut listing = String::new();
        for (index, entry) in entries.iter().enumerate() {
            listing.push_str(&format!("{:>4}  {}\n", index + 1, entry));
        }
        ctx.screen.print_with(&listing, PrintOptions::instant()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_contents() {
        let set = default_commands();
        assert_eq!(
            set.names(),
            [
                "help",
                "clear",
                "history",
                "texteditor",
                "dungeon-crawler",
                "chat"
            ]
        );
    }
}
