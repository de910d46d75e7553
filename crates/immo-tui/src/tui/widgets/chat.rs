// Chat widgets: the question/answer transcript and the question input box.
//
// Transcript header: "Assistant -- streaming.../complete/error/ready"
// Body: past entries plus the answer streamed so far, word wrapped.
// Sticks to the bottom while streaming; otherwise the "transcript" scroll
// offset counts lines up from the bottom.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use immo_core::protocol::{ChatEntry, ChatRole, LlmStatus};

use super::focused_border_style;
use crate::tui::{Focus, ViewState};

/// Render the transcript panel into the given area.
pub fn render_transcript(frame: &mut Frame, area: Rect, state: &ViewState) {
    let lines = transcript_lines(state);
    let max_scroll = wrapped_max_scroll(&lines, area);

    let scroll = if state.chat_status == LlmStatus::Streaming {
        max_scroll
    } else {
        let from_bottom = state.scroll_offset.get("transcript").copied().unwrap_or(0);
        max_scroll.saturating_sub(from_bottom)
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(build_title(state.chat_status, state.llm_enabled))
                .border_style(border_style(state.chat_status)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

/// Largest useful scroll offset for the transcript panel at `area`.
pub fn max_scroll(state: &ViewState, area: Rect) -> usize {
    wrapped_max_scroll(&transcript_lines(state), area)
}

fn wrapped_max_scroll(lines: &[Line], area: Rect) -> usize {
    // Approximate wrapped height: ceil(width / inner_width) rows per line.
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let line_count: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(inner_width))
        .sum();
    line_count.saturating_sub(inner_height)
}

/// Render the question input box.
pub fn render_input(frame: &mut Frame, area: Rect, state: &ViewState) {
    let focused = state.focus == Focus::ChatInput;
    let cursor = if focused { "_" } else { "" };

    let content = if state.chat_input.is_empty() && !focused {
        Line::from(Span::styled(
            "Ask about Swiss real estate...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(format!("{}{}", state.chat_input, cursor))
    };

    // Keep the tail of long input visible.
    let inner_width = area.width.saturating_sub(2) as usize;
    let overflow = content.width().saturating_sub(inner_width);

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Your question ")
                .border_style(focused_border_style(focused, Style::default())),
        )
        .scroll((0, overflow as u16));
    frame.render_widget(paragraph, area);
}

/// Build the transcript lines: one "You:"/"Assistant:" header per entry.
fn transcript_lines(state: &ViewState) -> Vec<Line<'static>> {
    if state.transcript.is_empty() {
        return vec![Line::from(Span::styled(
            placeholder_text(state.llm_enabled),
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let mut lines = Vec::new();
    for entry in &state.transcript {
        push_entry(&mut lines, entry);
    }
    if state.chat_status == LlmStatus::Streaming {
        lines.push(role_header(ChatRole::Assistant, None));
        let pending = if state.pending_answer.is_empty() {
            "...".to_string()
        } else {
            state.pending_answer.clone()
        };
        lines.extend(pending.lines().map(|l| Line::from(l.to_string())));
    }
    lines
}

fn push_entry(lines: &mut Vec<Line<'static>>, entry: &ChatEntry) {
    lines.push(role_header(entry.role, Some(entry)));
    lines.extend(entry.text.lines().map(|l| Line::from(l.to_string())));
    lines.push(Line::from(""));
}

fn role_header(role: ChatRole, entry: Option<&ChatEntry>) -> Line<'static> {
    let (label, color) = match role {
        ChatRole::User => ("You", Color::Cyan),
        ChatRole::Assistant => ("Assistant", Color::Green),
    };
    let mut spans = vec![Span::styled(
        format!("{}:", label),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(entry) = entry {
        spans.push(Span::styled(
            format!(" {}", entry.at.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

/// Build the title line with status indicator.
fn build_title(status: LlmStatus, enabled: bool) -> Line<'static> {
    let (status_text, status_color) = status_indicator(status, enabled);
    Line::from(vec![
        Span::styled("Assistant", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(" -- ", Style::default().fg(Color::DarkGray)),
        Span::styled(status_text, Style::default().fg(status_color)),
    ])
}

/// Return status text and color for the chat status.
pub fn status_indicator(status: LlmStatus, enabled: bool) -> (&'static str, Color) {
    match status {
        LlmStatus::Idle if !enabled => ("not configured", Color::DarkGray),
        LlmStatus::Idle => ("ready", Color::DarkGray),
        LlmStatus::Streaming => ("streaming...", Color::Yellow),
        LlmStatus::Complete => ("complete", Color::Green),
        LlmStatus::Error => ("error", Color::Red),
    }
}

fn border_style(status: LlmStatus) -> Style {
    match status {
        LlmStatus::Streaming => Style::default().fg(Color::Yellow),
        LlmStatus::Error => Style::default().fg(Color::Red),
        _ => Style::default(),
    }
}

fn placeholder_text(enabled: bool) -> &'static str {
    if enabled {
        "Ask a question about properties, prices or locations."
    } else {
        "No API key configured: greetings only. Set GROQ_API_KEY to enable answers."
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::logged_in_view_state;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn status_indicator_values() {
        assert_eq!(status_indicator(LlmStatus::Idle, true).0, "ready");
        assert_eq!(status_indicator(LlmStatus::Idle, false).0, "not configured");
        assert_eq!(status_indicator(LlmStatus::Streaming, true).1, Color::Yellow);
        assert_eq!(status_indicator(LlmStatus::Complete, true).1, Color::Green);
        assert_eq!(status_indicator(LlmStatus::Error, false).1, Color::Red);
    }

    #[test]
    fn empty_transcript_shows_placeholder() {
        let mut state = logged_in_view_state();
        let lines = transcript_lines(&state);
        assert_eq!(lines.len(), 1);
        assert!(plain(&lines[0]).starts_with("Ask a question"));

        state.llm_enabled = false;
        assert!(plain(&transcript_lines(&state)[0]).contains("GROQ_API_KEY"));
    }

    #[test]
    fn transcript_lists_entries_and_pending_answer() {
        let mut state = logged_in_view_state();
        state.transcript.push(ChatEntry::user("Villas?"));
        state.chat_status = LlmStatus::Streaming;
        state.pending_answer = "Geneva has\none".into();

        let text: Vec<String> = transcript_lines(&state).iter().map(plain).collect();
        assert!(text[0].starts_with("You:"));
        assert_eq!(text[1], "Villas?");
        assert_eq!(text[3], "Assistant:");
        assert_eq!(&text[4..], ["Geneva has", "one"]);
    }

    #[test]
    fn render_does_not_panic_with_long_transcript() {
        let backend = ratatui::backend::TestBackend::new(60, 8);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = logged_in_view_state();
        for i in 0..30 {
            state.transcript.push(ChatEntry::user(format!("question {}", i)));
            state.transcript.push(ChatEntry::assistant("a fairly long answer ".repeat(10)));
        }
        state.scroll_offset.insert("transcript".into(), 1_000);
        terminal
            .draw(|frame| render_transcript(frame, frame.area(), &state))
            .unwrap();

        state.chat_status = LlmStatus::Streaming;
        terminal
            .draw(|frame| render_transcript(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn input_shows_typed_text() {
        let backend = ratatui::backend::TestBackend::new(40, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = logged_in_view_state();
        state.chat_input = "Lugano".into();
        terminal
            .draw(|frame| render_input(frame, frame.area(), &state))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let row: String = (0..buffer.area.width)
            .map(|x| buffer[(x, 1)].symbol().to_string())
            .collect();
        assert!(row.contains("Lugano_"), "row was {row:?}");
    }

    #[test]
    fn long_input_keeps_tail_visible() {
        let backend = ratatui::backend::TestBackend::new(20, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = logged_in_view_state();
        state.chat_input = format!("{}END", "x".repeat(40));
        terminal
            .draw(|frame| render_input(frame, frame.area(), &state))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let row: String = (0..buffer.area.width)
            .map(|x| buffer[(x, 1)].symbol().to_string())
            .collect();
        assert!(row.contains("END_"), "row was {row:?}");
    }
}
