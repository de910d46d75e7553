// Status bar widget: assistant availability, app title, session.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [assistant indicator] [title] | [website] | [session]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (dot, dot_color) = assistant_indicator(state.llm_enabled);
    let spans = vec![
        Span::styled(format!(" {} ", dot), Style::default().fg(dot_color)),
        Span::styled(
            state.title.clone(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(state.website_url.clone(), Style::default().fg(Color::White)),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(session_label(state), Style::default().fg(Color::White)),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Dot shown in front of the title: green when the assistant has an API key.
pub fn assistant_indicator(enabled: bool) -> (&'static str, Color) {
    if enabled {
        ("●", Color::Green)
    } else {
        ("●", Color::DarkGray)
    }
}

pub fn session_label(state: &ViewState) -> String {
    match &state.session {
        None => "Not logged in".to_string(),
        Some(session) => match &session.username {
            Some(name) => format!("Logged in as {}", name),
            None => "Logged in".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
