//! # Screen View
//!
//! Folds the engine's transcript log into styled lines and renders them
//! through a scroll view with stick-to-bottom semantics.
//!
//! Segments flow inline: a print and the prompt after it share a line
//! until a newline breaks it, exactly as the transcript text reads. The
//! caret is drawn by styling the single character under the cursor
//! (reversed video while the blink phase is on), the selection by styling
//! its range, and the trailing cursor slot by a reversed space.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::screen::{CaretMark, InputRegion, Screen, Segment, caret_mark, split_at_caret};

const TEXT_STYLE: Style = Style::new().fg(Color::Green);
const PROMPT_STYLE: Style = TEXT_STYLE.add_modifier(Modifier::BOLD);
const CARET_STYLE: Style = TEXT_STYLE.add_modifier(Modifier::REVERSED);
const SELECTION_STYLE: Style = TEXT_STYLE.add_modifier(Modifier::REVERSED);

/// The trailing cursor block shown after the active output segment.
const CURSOR_BLOCK: &str = "█";

/// Scroll state for the transcript. Persisted across frames in the event
/// loop; the engine's scroll requests re-attach stick-to-bottom.
pub struct ScreenViewState {
    pub scroll: ScrollViewState,
    pub stick_to_bottom: bool,
    viewport_height: u16,
}

impl Default for ScreenViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenViewState {
    pub fn new() -> Self {
        Self {
            scroll: ScrollViewState::default(),
            stick_to_bottom: true,
            viewport_height: 0,
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.stick_to_bottom = false;
        let offset = self.scroll.offset();
        self.scroll.set_offset(Position {
            x: 0,
            y: offset.y.saturating_sub(lines),
        });
    }

    /// Scrolling down past the bottom is clamped by the scroll view on the
    /// next render.
    pub fn scroll_down(&mut self, lines: u16) {
        let offset = self.scroll.offset();
        self.scroll.set_offset(Position {
            x: 0,
            y: offset.y.saturating_add(lines),
        });
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport_height.saturating_sub(1).max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport_height.saturating_sub(1).max(1));
    }
}

pub fn draw(frame: &mut Frame, screen: &Screen, state: &mut ScreenViewState, blink_on: bool) {
    let area = frame.area();
    state.viewport_height = area.height;
    // Reserve the rightmost column for the scrollbar.
    let width = area.width.saturating_sub(1).max(1);

    let lines = screen.with_log(|log| build_transcript(log, blink_on));
    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let total_height = (paragraph.line_count(width) as u16).max(1);

    let mut scroll_view = ScrollView::new(Size::new(width, total_height))
        .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
        .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
    scroll_view.render_widget(paragraph, Rect::new(0, 0, width, total_height));

    if state.stick_to_bottom {
        state.scroll.set_offset(Position {
            x: 0,
            y: total_height.saturating_sub(area.height),
        });
    }
    frame.render_stateful_widget(scroll_view, area, &mut state.scroll);
}

/// Fold the segment log into a continuous flow of styled lines.
fn build_transcript(log: &[Segment], blink_on: bool) -> Vec<Line<'static>> {
    let mut builder = TranscriptBuilder::new();
    for segment in log {
        match segment {
            Segment::Output(output) => {
                builder.push_styled(&output.content, TEXT_STYLE);
                if output.active_cursor && blink_on {
                    builder.push_span(CURSOR_BLOCK, TEXT_STYLE);
                }
            }
            Segment::Input(region) => push_region(&mut builder, region, blink_on),
        }
    }
    builder.finish()
}

fn push_region(builder: &mut TranscriptBuilder, region: &InputRegion, blink_on: bool) {
    builder.push_styled(&region.prompt_symbol, PROMPT_STYLE);
    let text = region.editor.text();

    if !region.is_active() {
        builder.push_styled(text, TEXT_STYLE);
        return;
    }

    // An open selection suppresses the caret; its highlight stands in.
    if let Some((start, end)) = region.editor.selection() {
        builder.push_styled(&text[..start], TEXT_STYLE);
        builder.push_styled(&text[start..end], SELECTION_STYLE);
        builder.push_styled(&text[end..], TEXT_STYLE);
        return;
    }

    let mark = caret_mark(&region.editor);
    let split = split_at_caret(text, mark);
    builder.push_styled(split.before, TEXT_STYLE);
    match mark {
        CaretMark::Char(_) => {
            let caret_style = if blink_on { CARET_STYLE } else { TEXT_STYLE };
            if split.caret_on_newline() {
                // A caret on a bare newline gets visible width before the
                // line breaks, so it shows up on empty lines.
                builder.push_span(" ", caret_style);
                builder.break_line();
            } else if let Some(caret) = split.caret {
                builder.push_styled(caret, caret_style);
            }
            builder.push_styled(split.after, TEXT_STYLE);
        }
        CaretMark::EndOfText => {
            if blink_on {
                builder.push_span(" ", CARET_STYLE);
            }
        }
        CaretMark::None => {}
    }
}

/// Accumulates spans into lines, breaking on newlines inside pushed text.
struct TranscriptBuilder {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
}

impl TranscriptBuilder {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
        }
    }

    fn push_styled(&mut self, text: &str, style: Style) {
        let mut parts = text.split('\n');
        if let Some(first) = parts.next()
            && !first.is_empty()
        {
            self.push_span(first, style);
        }
        for part in parts {
            self.break_line();
            if !part.is_empty() {
                self.push_span(part, style);
            }
        }
    }

    fn push_span(&mut self, text: &str, style: Style) {
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn break_line(&mut self) {
        self.lines.push(Line::from(std::mem::take(&mut self.current)));
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.break_line();
        self.lines
    }
}
