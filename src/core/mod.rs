//! # Core Shell Logic
//!
//! Everything between the screen engine and the individual programs:
//! configuration, persistent command history, and the command dispatcher.
//! Nothing in here knows about ratatui or crossterm.
//!
//! ```text
//!     ┌─────────────────────────────────────────┐
//!     │                 Shell                   │
//!     │  parse → dispatch → Command::run(ctx)   │
//!     └────────┬───────────────┬────────────────┘
//!              │               │
//!       ┌──────▼─────┐   ┌─────▼────────┐
//!       │   Screen   │   │ CommandSet   │
//!       │  (engine)  │   │ (explicit    │
//!       │            │   │  table)      │
//!       └────────────┘   └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`]: defaults → file → env → CLI resolution
//! - [`history`]: capped, persisted command history with a draft slot
//! - [`shell`]: boot sequence, REPL, parsing, completion, dispatch

pub mod config;
pub mod history;
pub mod shell;
