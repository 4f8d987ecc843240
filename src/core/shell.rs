//! # Shell
//!
//! The command dispatcher sitting on top of the screen engine. It owns no
//! rendering logic of its own: everything the user sees goes through
//! `Screen::print` / `Screen::prompt`.
//!
//! Commands live in an explicit [`CommandSet`] handed to [`Shell::new`] —
//! there is no process-wide registry. Each command implements the async
//! [`Command`] trait and receives a [`CommandContext`] with the screen
//! handle, resolved config and shared history.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::config::ResolvedConfig;
use crate::core::history::CommandHistory;
use crate::screen::{Cancelled, HookAction, Key, PrintOptions, PromptHook, PromptOptions, Screen};

/// Typing this at the prompt leaves the shell.
pub const EXIT_COMMAND: &str = "exit";

// ============================================================================
// Command trait & table
// ============================================================================

/// Error surfaced by a failed command; rendered as `Error: {message}`.
#[derive(Debug)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Name and one-line summary, as shown by `help`.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    pub name: &'static str,
    pub summary: &'static str,
}

/// Everything a running command may touch.
pub struct CommandContext {
    pub screen: Screen,
    pub config: Arc<ResolvedConfig>,
    pub history: Arc<Mutex<CommandHistory>>,
    pub commands: Vec<CommandInfo>,
}

impl CommandContext {
    /// Lock the shared command history.
    pub fn history(&self) -> MutexGuard<'_, CommandHistory> {
        lock_history(&self.history)
    }
}

#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;
    fn summary(&self) -> &'static str;
    async fn run(&self, ctx: &CommandContext, args: &[String]) -> Result<(), CommandError>;
}

/// Explicit command table. Registration order is the `help` display order;
/// a duplicate name keeps the first registration.
#[derive(Default)]
pub struct CommandSet {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Arc<dyn Command>) {
        if self.get(command.name()).is_some() {
            warn!("Command already exists: {}", command.name());
            return;
        }
        self.commands.push(command);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands
            .iter()
            .find(|cmd| cmd.name() == name)
            .cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|cmd| cmd.name()).collect()
    }

    pub fn infos(&self) -> Vec<CommandInfo> {
        self.commands
            .iter()
            .map(|cmd| CommandInfo {
                name: cmd.name(),
                summary: cmd.summary(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// ============================================================================
// Parsing & completion
// ============================================================================

/// One bare word, or a quoted run that may contain spaces and escaped
/// quotes.
static COMMAND_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^\s"']+|"([^"\\]*(\\.[^"\\]*)*)"|'([^'\\]*(\\.[^'\\]*)*)'"#).unwrap()
});

/// Split a command line into the command and its arguments, unquoting
/// quoted arguments.
pub fn parse_command(line: &str) -> (String, Vec<String>) {
    let mut parts = COMMAND_PARTS.find_iter(line).map(|m| m.as_str());
    let command = parts.next().unwrap_or("").to_string();
    let args = parts.map(unquote).collect();
    (command, args)
}

fn unquote(arg: &str) -> String {
    if arg.len() >= 2 && arg.starts_with('"') && arg.ends_with('"') {
        arg[1..arg.len() - 1].replace("\\\"", "\"")
    } else if arg.len() >= 2 && arg.starts_with('\'') && arg.ends_with('\'') {
        arg[1..arg.len() - 1].replace("\\'", "'")
    } else {
        arg.to_string()
    }
}

/// Auto-complete a partial command. A unique match completes fully;
/// multiple matches complete to their longest common prefix; no match
/// yields `None`.
pub fn auto_complete(input: &str, names: &[&'static str]) -> Option<String> {
    let mut matches: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| name.starts_with(input))
        .collect();
    matches.sort_unstable();

    match matches.as_slice() {
        [] => None,
        [only] => Some((*only).to_string()),
        [first, .., last] => {
            let common: usize = first
                .chars()
                .zip(last.chars())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a.len_utf8())
                .sum();
            Some(first[..common].to_string())
        }
    }
}

// ============================================================================
// Shell loop
// ============================================================================

pub struct Shell {
    screen: Screen,
    commands: CommandSet,
    config: Arc<ResolvedConfig>,
    history: Arc<Mutex<CommandHistory>>,
}

impl Shell {
    pub fn new(screen: Screen, commands: CommandSet, config: Arc<ResolvedConfig>) -> Self {
        Self {
            screen,
            commands,
            config,
            history: Arc::new(Mutex::new(CommandHistory::new())),
        }
    }

    /// Boot, then run the prompt loop until the user exits.
    pub async fn run(self) {
        if self.boot().await {
            self.repl().await;
        }
    }

    /// Animated boot sequence. Returns `false` when boot failed and the
    /// shell must not start.
    async fn boot(&self) -> bool {
        let screen = &self.screen;

        if self.config.skip_boot {
            let loaded = CommandHistory::load(&self.config.history_path);
            *lock_history(&self.history) = loaded;
            screen
                .print_with(
                    "Welcome to Old NET.\nType 'help' for a list of available commands.\n\n",
                    PrintOptions::instant(),
                )
                .await;
            return !self.commands.is_empty();
        }

        screen
            .print_with(
                "BOOTING...",
                PrintOptions {
                    pre_delay: 1000,
                    post_delay: 500,
                    ..PrintOptions::default()
                },
            )
            .await;
        screen.print_with("\n\n", PrintOptions::instant()).await;

        // History is the only real I/O behind the loading line; the dots
        // tick while it finishes.
        let path = self.config.history_path.clone();
        let load = tokio::task::spawn_blocking(move || CommandHistory::load(&path));

        screen.print("LOADING DEFAULT PROGRAMS...").await;
        while !load.is_finished() {
            screen
                .print_with(
                    ".",
                    PrintOptions {
                        post_delay: 500,
                        ..PrintOptions::default()
                    },
                )
                .await;
        }
        match load.await {
            Ok(history) => *lock_history(&self.history) = history,
            Err(err) => warn!("History load task failed: {err}"),
        }

        if self.commands.is_empty() {
            screen.print(" ERROR\n").await;
            screen.print("No programs installed.\n").await;
            screen.print_with("\n", PrintOptions::instant()).await;
            screen.print("BOOT FAILED!").await;
            return false;
        }
        screen.print(" OK\n").await;

        screen.print_with("\n", PrintOptions::instant()).await;
        screen
            .print_with(
                "BOOT COMPLETED!",
                PrintOptions {
                    post_delay: 1000,
                    ..PrintOptions::default()
                },
            )
            .await;
        screen.clear();

        screen
            .print_with(
                "Welcome to Old NET.",
                PrintOptions {
                    post_delay: 500,
                    ..PrintOptions::default()
                },
            )
            .await;
        screen
            .print("\nType 'help' for a list of available commands.")
            .await;
        screen.print_with("\n\n", PrintOptions::instant()).await;

        true
    }

    async fn repl(&self) {
        loop {
            let read = self.screen.prompt_with(
                "> ",
                PromptOptions {
                    on_key: Some(self.shell_hook()),
                    ..PromptOptions::default()
                },
            );
            let line = match read.await {
                Ok(line) => line,
                // A cancelled shell prompt is not an error; just re-prompt.
                Err(Cancelled) => continue,
            };
            if line.is_empty() {
                continue;
            }
            if line == EXIT_COMMAND {
                break;
            }

            {
                let mut history = lock_history(&self.history);
                history.add(&line);
                if let Err(err) = history.save(&self.config.history_path) {
                    warn!("Failed to save history: {err}");
                }
            }

            let (command, args) = parse_command(&line);
            self.run_command(&command, &args).await;
        }

        self.screen
            .print_with(
                "Goodbye!",
                PrintOptions {
                    post_delay: 2000,
                    ..PrintOptions::default()
                },
            )
            .await;
    }

    async fn run_command(&self, name: &str, args: &[String]) {
        let Some(command) = self.commands.get(name) else {
            self.screen
                .print(&format!("Command not found: {name}\n"))
                .await;
            return;
        };

        info!("Running command: {name}");
        let ctx = CommandContext {
            screen: self.screen.clone(),
            config: Arc::clone(&self.config),
            history: Arc::clone(&self.history),
            commands: self.commands.infos(),
        };
        if let Err(err) = command.run(&ctx, args).await {
            log::error!("Command '{name}' failed: {err}");
            self.screen.print(&format!("Error: {err}\n")).await;
        }
    }

    /// Key hook for the shell prompt: Tab completion and history
    /// navigation.
    fn shell_hook(&self) -> PromptHook {
        let history = Arc::clone(&self.history);
        let names = self.commands.names();
        Box::new(move |key, editor| {
            if key.ctrl || key.alt {
                return HookAction::Pass;
            }
            match key.code {
                Key::Tab => {
                    if let Some(completed) = auto_complete(editor.text(), &names) {
                        editor.set_text(completed);
                    }
                    HookAction::Handled
                }
                Key::Up => {
                    if let Some(prev) = lock_history(&history).previous(editor.text()) {
                        editor.set_text(prev);
                    }
                    HookAction::Handled
                }
                Key::Down => {
                    if let Some(next) = lock_history(&history).next() {
                        editor.set_text(next);
                    }
                    HookAction::Handled
                }
                _ => HookAction::Pass,
            }
        })
    }
}

fn lock_history(history: &Mutex<CommandHistory>) -> MutexGuard<'_, CommandHistory> {
    history.lock().unwrap_or_else(|err| err.into_inner())
}
