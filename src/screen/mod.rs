//! # Screen Engine
//!
//! The terminal I/O engine behind the fake shell: a shared transcript log
//! of output segments and input regions, with animated printing, an
//! awaitable prompt, and cooperative cancellation.
//!
//! ```text
//! Screen (cloneable handle)
//! ├── print / print_with     append an OutputSegment, animate per-char
//! ├── prompt / prompt_with   create an InputRegion, await its read
//! ├── clear                  drop everything but the active region
//! ├── cancel_prompt          reject the pending read with Cancelled
//! └── handle_key / paste     fed by the TUI adapter
//! ```
//!
//! ## Queuing & cancellation
//!
//! At most one InputRegion is active at a time; the controller holds a
//! single optional reference to it and swaps it atomically on each new
//! prompt request. A new prompt preempts the previous one: its pending
//! read rejects with `Cancelled` and the old region is frozen or removed
//! per its own `remove_after` setting. The read itself is a
//! `tokio::sync::oneshot` — submit resolves it, any cancellation path
//! rejects it, and a dropped sender is indistinguishable from a cancel.
//!
//! ## Concurrency
//!
//! All mutation happens synchronously under one mutex; suspension points
//! are only the per-character print delays and the awaited reads. Prints
//! issued sequentially by one task render in order; concurrent printers
//! interleave at character granularity, which is accepted.

mod ansi;
mod caret;
mod editor;
mod keys;
mod segment;

pub use caret::{CaretMark, CaretSplit, caret_mark, split_at_caret};
pub use editor::Editor;
pub use keys::{HookAction, Key, KeyPress, PromptHook};
pub use segment::{InputRegion, OutputSegment, RegionState, Segment};

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;

/// Default delay between printed characters, in milliseconds.
pub const DEFAULT_PRINT_DELAY_MS: u64 = 30;

/// The only error the engine raises: a prompt's pending read was
/// interrupted, either by the user or by a newer prompt preempting it.
/// Always recoverable; callers treat it as "the user backed out".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prompt cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Pacing options for a print call.
pub struct PrintOptions {
    /// Delay before the first character, in milliseconds.
    pub pre_delay: u64,
    /// Delay after the last character, in milliseconds.
    pub post_delay: u64,
    /// Delay between characters; `None` uses the screen's default.
    pub print_delay: Option<u64>,
    /// Insert the segment before the active prompt instead of after it, so
    /// new output never appears below the live input line.
    pub print_before_active_prompt: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            pre_delay: 0,
            post_delay: 0,
            print_delay: None,
            print_before_active_prompt: true,
        }
    }
}

impl PrintOptions {
    /// No animation: every character appears at once.
    pub fn instant() -> Self {
        Self {
            print_delay: Some(0),
            ..Self::default()
        }
    }
}

/// Options for a prompt request.
#[derive(Default)]
pub struct PromptOptions {
    /// Delete the region from the log after completion or cancellation
    /// instead of freezing it as transcript history.
    pub remove_after: bool,
    /// Enter inserts a newline instead of submitting; the caller supplies
    /// its own finish trigger through `on_key`.
    pub multi_line: bool,
    /// Key interceptor invoked before built-in handling.
    pub on_key: Option<PromptHook>,
}

/// Suspend the calling task for at least `ms` milliseconds. Zero or
/// negative durations resume immediately. Not cancelable; callers that
/// need a cancelable wait race it against their own rejection source.
pub async fn delay(ms: i64) {
    if ms <= 0 {
        return;
    }
    tokio::time::sleep(Duration::from_millis(ms as u64)).await;
}

struct ScreenState {
    log: Vec<Segment>,
    /// The single active InputRegion, by segment id. Swapped atomically on
    /// each prompt request; `None` while no prompt is pending.
    active_input: Option<u64>,
    next_id: u64,
    /// Bumped on every mutation; the TUI redraws when it changes.
    revision: u64,
    /// Sticky request to scroll the newest content into view.
    scroll_to_bottom: bool,
    default_print_delay: u64,
}

impl ScreenState {
    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        self.log.iter().position(|seg| seg.id() == id)
    }

    fn active_region(&self) -> Option<&InputRegion> {
        let id = self.active_input?;
        self.log
            .iter()
            .find(|seg| seg.id() == id)
            .and_then(Segment::as_input)
    }

    fn active_region_mut(&mut self) -> Option<&mut InputRegion> {
        let id = self.active_input?;
        self.log
            .iter_mut()
            .find(|seg| seg.id() == id)
            .and_then(Segment::as_input_mut)
    }

    /// Strip the blinking-cursor flag from every output segment.
    fn revoke_cursor(&mut self) {
        for seg in &mut self.log {
            if let Segment::Output(out) = seg {
                out.active_cursor = false;
            }
        }
    }

    /// Create a new output segment, claiming the blinking cursor unless an
    /// input region is active. Returns the segment id for appends.
    fn begin_output(&mut self, print_before_active_prompt: bool) -> u64 {
        self.revoke_cursor();
        let id = self.next_id();
        let segment = Segment::Output(OutputSegment {
            id,
            content: String::new(),
            active_cursor: self.active_input.is_none(),
        });
        let insert_at = if print_before_active_prompt {
            self.active_input.and_then(|aid| self.index_of(aid))
        } else {
            None
        };
        match insert_at {
            Some(idx) => self.log.insert(idx, segment),
            None => self.log.push(segment),
        }
        self.scroll_to_bottom = true;
        self.touch();
        id
    }

    /// Append one animated character. Appends to a segment that `clear`
    /// already removed are dropped silently; printing cannot fail.
    fn append_char(&mut self, id: u64, c: char) {
        if let Some(Segment::Output(out)) = self.log.iter_mut().find(|seg| seg.id() == id) {
            out.content.push(c);
            self.scroll_to_bottom = true;
            self.touch();
        }
    }

    fn submit_active_region(&mut self) {
        let Some(id) = self.active_input.take() else {
            return;
        };
        let Some(idx) = self.index_of(id) else {
            return;
        };
        let remove = {
            let Some(region) = self.log[idx].as_input_mut() else {
                return;
            };
            region.finish();
            region.remove_after
        };
        if remove {
            self.log.remove(idx);
        }
        self.scroll_to_bottom = true;
        self.touch();
    }

    fn cancel_active_region(&mut self, remove_override: Option<bool>) {
        let Some(id) = self.active_input.take() else {
            return;
        };
        let Some(idx) = self.index_of(id) else {
            return;
        };
        let remove = {
            let Some(region) = self.log[idx].as_input_mut() else {
                return;
            };
            region.cancel();
            remove_override.unwrap_or(region.remove_after)
        };
        if remove {
            self.log.remove(idx);
        }
        self.scroll_to_bottom = true;
        self.touch();
    }

    /// Remove every output segment and every frozen input region; the
    /// active region, if any, survives.
    fn clear(&mut self) {
        self.log
            .retain(|seg| matches!(seg, Segment::Input(region) if region.is_active()));
        self.scroll_to_bottom = true;
        self.touch();
    }

    fn handle_key(&mut self, key: KeyPress) {
        self.scroll_to_bottom = true;
        self.touch();
        let Some(region) = self.active_region_mut() else {
            return;
        };

        // The hook sees every raw key before built-in handling. It is
        // taken out of the region for the call so it can borrow the editor.
        let action = match region.hook.take() {
            Some(mut hook) => {
                let action = hook(&key, &mut region.editor);
                region.hook = Some(hook);
                action
            }
            None => HookAction::Pass,
        };

        match action {
            HookAction::Finish => self.submit_active_region(),
            HookAction::Handled => {}
            HookAction::Pass => self.apply_key(key),
        }
    }

    fn apply_key(&mut self, key: KeyPress) {
        if key.ctrl && !key.alt && !key.shift {
            match key.code {
                Key::Char('c') => self.cancel_active_region(None),
                Key::Char('l') => self.clear(),
                _ => {}
            }
            return;
        }

        if key.code == Key::Enter && !key.ctrl && !key.alt {
            let multi = self.active_region().is_some_and(|r| r.multi_line);
            if !multi {
                self.submit_active_region();
                return;
            }
        }

        let Some(region) = self.active_region_mut() else {
            return;
        };
        let editor = &mut region.editor;
        match key.code {
            Key::Char(c) if !key.ctrl && !key.alt => editor.insert_char(c),
            Key::Enter => editor.insert_char('\n'),
            Key::Backspace => editor.backspace(),
            Key::Delete => editor.delete_forward(),
            Key::Left => editor.move_left(key.shift),
            Key::Right => editor.move_right(key.shift),
            Key::Up => editor.move_up(key.shift),
            Key::Down => editor.move_down(key.shift),
            Key::Home => editor.move_home(key.shift),
            Key::End => editor.move_end(key.shift),
            _ => {}
        }
    }
}

/// Cheaply-cloneable handle to the shared screen.
#[derive(Clone)]
pub struct Screen {
    state: Arc<Mutex<ScreenState>>,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    pub fn new() -> Self {
        Self::with_print_delay(DEFAULT_PRINT_DELAY_MS)
    }

    /// A screen whose unspecified per-character print delay is `ms`.
    pub fn with_print_delay(ms: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScreenState {
                log: Vec::new(),
                active_input: None,
                next_id: 0,
                revision: 0,
                scroll_to_bottom: false,
                default_print_delay: ms,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Print with default pacing.
    pub async fn print(&self, text: &str) {
        self.print_with(text, PrintOptions::default()).await;
    }

    /// Append a new output segment and animate it into existence: pre-delay,
    /// one character per `print_delay`, post-delay. Fire-and-forget; this
    /// cannot fail.
    pub async fn print_with(&self, text: &str, options: PrintOptions) {
        let text = ansi::strip_sgr(text);
        let (id, char_delay) = {
            let mut state = self.lock();
            let delay = options.print_delay.unwrap_or(state.default_print_delay);
            (state.begin_output(options.print_before_active_prompt), delay)
        };
        delay(options.pre_delay as i64).await;
        for c in text.chars() {
            self.lock().append_char(id, c);
            delay(char_delay as i64).await;
        }
        delay(options.post_delay as i64).await;
    }

    /// Prompt with default options.
    pub fn prompt(
        &self,
        prompt_symbol: &str,
    ) -> impl Future<Output = Result<String, Cancelled>> + Send + use<> {
        self.prompt_with(prompt_symbol, PromptOptions::default())
    }

    /// Request a line of input. The region is created immediately — any
    /// previously active prompt is preempted before this call returns —
    /// and the returned future resolves on submit or rejects on
    /// cancellation. An abandoned prompt waits forever.
    pub fn prompt_with(
        &self,
        prompt_symbol: &str,
        options: PromptOptions,
    ) -> impl Future<Output = Result<String, Cancelled>> + Send + use<> {
        let rx = self.request_prompt(prompt_symbol, options);
        async move {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(Cancelled),
            }
        }
    }

    fn request_prompt(
        &self,
        prompt_symbol: &str,
        options: PromptOptions,
    ) -> oneshot::Receiver<Result<String, Cancelled>> {
        let mut state = self.lock();
        state.revoke_cursor();
        state.cancel_active_region(None);
        let (tx, rx) = oneshot::channel();
        let id = state.next_id();
        state.log.push(Segment::Input(InputRegion {
            id,
            prompt_symbol: prompt_symbol.to_string(),
            editor: Editor::new(),
            multi_line: options.multi_line,
            remove_after: options.remove_after,
            state: RegionState::Active,
            responder: Some(tx),
            hook: options.on_key,
        }));
        state.active_input = Some(id);
        state.scroll_to_bottom = true;
        state.touch();
        rx
    }

    /// Cancel every currently-active prompt (in practice at most one).
    /// `remove` overrides the region's own `remove_after` when `Some`.
    pub fn cancel_prompt(&self, remove: Option<bool>) {
        self.lock().cancel_active_region(remove);
    }

    /// Wipe the transcript, keeping only the active prompt.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Feed one key press from the terminal into the active region.
    pub fn handle_key(&self, key: KeyPress) {
        self.lock().handle_key(key);
    }

    /// Insert pasted text into the active region verbatim.
    pub fn handle_paste(&self, text: &str) {
        let mut state = self.lock();
        if let Some(region) = state.active_region_mut() {
            region.editor.insert_str(text);
            state.scroll_to_bottom = true;
            state.touch();
        }
    }

    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Consume the pending scroll-to-bottom request, if any.
    pub fn take_scroll_request(&self) -> bool {
        std::mem::take(&mut self.lock().scroll_to_bottom)
    }

    /// Whether anything on screen currently carries the blinking cursor.
    pub fn has_active_cursor(&self) -> bool {
        let state = self.lock();
        state.active_input.is_some()
            || state
                .log
                .iter()
                .any(|seg| matches!(seg, Segment::Output(out) if out.active_cursor))
    }

    pub fn has_active_prompt(&self) -> bool {
        self.lock().active_input.is_some()
    }

    /// Run a closure against the transcript log. Used by the renderer and
    /// by tests; the closure must not call back into the screen.
    pub fn with_log<R>(&self, f: impl FnOnce(&[Segment]) -> R) -> R {
        f(&self.lock().log)
    }

    /// The transcript as plain text, in log order: output content plus
    /// prompt symbols and region contents.
    pub fn transcript(&self) -> String {
        self.with_log(|log| {
            let mut out = String::new();
            for seg in log {
                match seg {
                    Segment::Output(output) => out.push_str(&output.content),
                    Segment::Input(region) => {
                        out.push_str(&region.prompt_symbol);
                        out.push_str(region.editor.text());
                    }
                }
            }
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fast_screen, type_str};
    use tokio_test::block_on;

    #[test]
    fn test_print_renders_text_in_order() {
        let screen = fast_screen();
        block_on(screen.print("first "));
        block_on(screen.print("second"));
        assert_eq!(screen.transcript(), "first second");
    }

    #[test]
    fn test_print_strips_color_codes() {
        let screen = fast_screen();
        block_on(screen.print("\x1b[32mgreen\x1b[0m text"));
        assert_eq!(screen.transcript(), "green text");
    }

    #[test]
    fn test_single_line_submit_trims() {
        let screen = fast_screen();
        let read = screen.prompt("> ");
        type_str(&screen, "  hello  ");
        screen.handle_key(KeyPress::plain(Key::Enter));
        assert_eq!(block_on(read), Ok("hello".to_string()));
        // The frozen region keeps its content plus the newline marker.
        assert_eq!(screen.transcript(), ">   hello  \n");
    }

    #[test]
    fn test_multi_line_submit_is_verbatim() {
        let screen = fast_screen();
        let read = screen.prompt_with(
            "",
            PromptOptions {
                multi_line: true,
                on_key: Some(Box::new(|key, _| {
                    if key.code == Key::Esc {
                        HookAction::Finish
                    } else {
                        HookAction::Pass
                    }
                })),
                ..PromptOptions::default()
            },
        );
        type_str(&screen, "  hello  ");
        screen.handle_key(KeyPress::plain(Key::Enter));
        type_str(&screen, "line two");
        screen.handle_key(KeyPress::plain(Key::Esc));
        assert_eq!(block_on(read), Ok("  hello  \nline two\n".to_string()));
    }

    #[test]
    fn test_new_prompt_preempts_previous() {
        let screen = fast_screen();
        let first = screen.prompt("> ");
        let second = screen.prompt("> ");
        let third = screen.prompt("> ");

        assert_eq!(block_on(first), Err(Cancelled));
        assert_eq!(block_on(second), Err(Cancelled));

        // Only the newest region is still active.
        let active = screen.with_log(|log| {
            log.iter()
                .filter_map(Segment::as_input)
                .filter(|r| r.is_active())
                .count()
        });
        assert_eq!(active, 1);

        type_str(&screen, "ok");
        screen.handle_key(KeyPress::plain(Key::Enter));
        assert_eq!(block_on(third), Ok("ok".to_string()));
    }

    #[test]
    fn test_interrupt_chord_cancels() {
        let screen = fast_screen();
        let read = screen.prompt("> ");
        type_str(&screen, "abandoned");
        screen.handle_key(KeyPress::ctrl('c'));
        assert_eq!(block_on(read), Err(Cancelled));
        // Cancellation freezes the region with a trailing newline.
        assert_eq!(screen.transcript(), "> abandoned\n");
    }

    #[test]
    fn test_remove_after_leaves_no_trace() {
        let screen = fast_screen();
        let read = screen.prompt_with(
            "> ",
            PromptOptions {
                remove_after: true,
                ..PromptOptions::default()
            },
        );
        type_str(&screen, "gone");
        screen.handle_key(KeyPress::ctrl('c'));
        assert_eq!(block_on(read), Err(Cancelled));
        assert_eq!(screen.transcript(), "");
    }

    #[test]
    fn test_cancel_prompt_override_removes() {
        let screen = fast_screen();
        let read = screen.prompt("> ");
        screen.cancel_prompt(Some(true));
        assert_eq!(block_on(read), Err(Cancelled));
        assert_eq!(screen.transcript(), "");
    }

    #[test]
    fn test_clear_chord_keeps_active_region() {
        let screen = fast_screen();
        block_on(screen.print("old output\n"));
        let read = screen.prompt("> ");
        type_str(&screen, "still here");
        screen.handle_key(KeyPress::ctrl('l'));
        assert_eq!(screen.transcript(), "> still here");
        drop(read);
    }

    #[test]
    fn test_print_lands_above_active_prompt() {
        let screen = fast_screen();
        let read = screen.prompt("> ");
        block_on(screen.print("server says hi\n"));
        assert_eq!(screen.transcript(), "server says hi\n> ");
        drop(read);
    }

    #[test]
    fn test_cursor_flag_has_one_holder() {
        let screen = fast_screen();
        block_on(screen.print("a"));
        block_on(screen.print("b"));
        let holders = screen.with_log(|log| {
            log.iter()
                .filter(|seg| matches!(seg, Segment::Output(out) if out.active_cursor))
                .count()
        });
        assert_eq!(holders, 1);

        // A prompt takes the cursor away from output entirely.
        let read = screen.prompt("> ");
        let holders = screen.with_log(|log| {
            log.iter()
                .filter(|seg| matches!(seg, Segment::Output(out) if out.active_cursor))
                .count()
        });
        assert_eq!(holders, 0);
        assert!(screen.has_active_cursor());
        drop(read);
    }

    #[test]
    fn test_print_during_prompt_does_not_steal_cursor() {
        let screen = fast_screen();
        let read = screen.prompt("> ");
        block_on(screen.print("background\n"));
        let output_cursor = screen.with_log(|log| {
            log.iter()
                .any(|seg| matches!(seg, Segment::Output(out) if out.active_cursor))
        });
        assert!(!output_cursor);
        drop(read);
    }

    #[test]
    fn test_keys_without_active_prompt_are_ignored() {
        let screen = fast_screen();
        screen.handle_key(KeyPress::char('x'));
        assert_eq!(screen.transcript(), "");
    }

    #[test]
    fn test_paste_preserves_newlines() {
        let screen = fast_screen();
        let read = screen.prompt_with(
            "",
            PromptOptions {
                multi_line: true,
                ..PromptOptions::default()
            },
        );
        screen.handle_paste("a\nb");
        let text = screen.with_log(|log| {
            log.iter()
                .filter_map(Segment::as_input)
                .next()
                .map(|r| r.editor.text().to_string())
        });
        assert_eq!(text.as_deref(), Some("a\nb"));
        drop(read);
    }

    #[test]
    fn test_delay_zero_and_negative_resume_immediately() {
        block_on(async {
            delay(0).await;
            delay(-50).await;
        });
    }
}
