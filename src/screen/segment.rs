//! Segment types making up the screen's transcript log.

use tokio::sync::oneshot;

use crate::screen::keys::PromptHook;
use crate::screen::{Cancelled, Editor};

/// An immutable-once-written run of rendered output text. The content grows
/// incrementally while the print animation is in flight and is never
/// mutated afterwards; only `clear` destroys it.
pub struct OutputSegment {
    pub id: u64,
    pub content: String,
    /// Whether this segment currently carries the blinking trailing cursor.
    pub active_cursor: bool,
}

/// Input region lifecycle. Both `Finished` and `Cancelled` are terminal:
/// the content is frozen and the responder has been consumed, so no further
/// events can reach the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    Active,
    Finished,
    Cancelled,
}

/// The live editable prompt, or a frozen transcript entry once finished.
pub struct InputRegion {
    pub id: u64,
    /// Display-only prefix; never part of the returned content.
    pub prompt_symbol: String,
    pub editor: Editor,
    pub multi_line: bool,
    /// Whether to delete the region from the log instead of freezing it
    /// once it reaches a terminal state.
    pub remove_after: bool,
    pub state: RegionState,
    pub(crate) responder: Option<oneshot::Sender<Result<String, Cancelled>>>,
    pub(crate) hook: Option<PromptHook>,
}

impl InputRegion {
    pub fn is_active(&self) -> bool {
        self.state == RegionState::Active
    }

    /// Submit: freeze the region, append the trailing newline marker and
    /// resolve the pending read. Single-line prompts yield trimmed text;
    /// multi-line prompts yield the buffer verbatim including the marker.
    pub(crate) fn finish(&mut self) {
        self.editor.push_raw('\n');
        self.state = RegionState::Finished;
        let text = if self.multi_line {
            self.editor.text().to_string()
        } else {
            self.editor.text().trim().to_string()
        };
        if let Some(tx) = self.responder.take() {
            let _ = tx.send(Ok(text));
        }
        self.hook = None;
    }

    /// Cancel: freeze the region with the trailing newline marker so the
    /// transcript still reads naturally, and reject the pending read.
    pub(crate) fn cancel(&mut self) {
        self.editor.push_raw('\n');
        self.state = RegionState::Cancelled;
        if let Some(tx) = self.responder.take() {
            let _ = tx.send(Err(Cancelled));
        }
        self.hook = None;
    }
}

/// One entry in the transcript log.
pub enum Segment {
    Output(OutputSegment),
    Input(InputRegion),
}

impl Segment {
    pub fn id(&self) -> u64 {
        match self {
            Segment::Output(seg) => seg.id,
            Segment::Input(region) => region.id,
        }
    }

    pub fn as_input(&self) -> Option<&InputRegion> {
        match self {
            Segment::Input(region) => Some(region),
            Segment::Output(_) => None,
        }
    }

    pub fn as_input_mut(&mut self) -> Option<&mut InputRegion> {
        match self {
            Segment::Input(region) => Some(region),
            Segment::Output(_) => None,
        }
    }
}
