// Search form widget: three select boxes and an apply button.
//
// Each select shows "< value >" with the focused one highlighted. Left/Right
// cycle the options (handled in input.rs); the form never filters by itself.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::focused_border_style;
use crate::tui::layout::AppLayout;
use crate::tui::{Focus, SelectState, ViewState};

/// Render the three selects and the apply button into their layout slots.
pub fn render(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    render_select(
        frame,
        layout.location,
        &state.location,
        state.focus == Focus::Location,
    );
    render_select(
        frame,
        layout.price_range,
        &state.price_range,
        state.focus == Focus::PriceRange,
    );
    render_select(
        frame,
        layout.property_type,
        &state.property_type,
        state.focus == Focus::PropertyType,
    );
    render_apply(frame, layout.apply, state.focus == Focus::Apply);
}

fn render_select(frame: &mut Frame, area: Rect, select: &SelectState, focused: bool) {
    let paragraph = Paragraph::new(select_line(select, focused))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", select.label))
                .border_style(focused_border_style(focused, Style::default())),
        );
    frame.render_widget(paragraph, area);
}

/// "< value >" when focused, the bare value otherwise.
pub fn select_line(select: &SelectState, focused: bool) -> Line<'static> {
    let value = select.value().to_string();
    if focused {
        Line::from(vec![
            Span::styled("< ", Style::default().fg(Color::Cyan)),
            Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(" >", Style::default().fg(Color::Cyan)),
        ])
    } else {
        Line::from(value)
    }
}

fn render_apply(frame: &mut Frame, area: Rect, focused: bool) {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    let paragraph = Paragraph::new(Span::styled("Apply", style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focused_border_style(focused, Style::default())),
        );
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
