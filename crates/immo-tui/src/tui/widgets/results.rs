// Search results widget: one line per matching property.
//
// Hidden behind a hint until the first search is applied. An empty result
// set shows the no-results message instead of an empty list.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use immo_core::format::format_results;

use crate::tui::ViewState;

/// Render the results panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let lines = result_lines(state);

    let scroll = state
        .scroll_offset
        .get("results")
        .copied()
        .unwrap_or(0)
        .min(max_scroll(state, area));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(build_title(state)),
        )
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

/// Largest useful scroll offset for the panel at `area`.
pub fn max_scroll(state: &ViewState, area: Rect) -> usize {
    let inner_height = area.height.saturating_sub(2) as usize;
    result_lines(state).len().saturating_sub(inner_height)
}

fn build_title(state: &ViewState) -> Line<'static> {
    let mut spans = vec![Span::styled(
        "Search Results",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(records) = &state.results {
        spans.push(Span::styled(" -- ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            match records.len() {
                1 => "1 property".to_string(),
                n => format!("{} properties", n),
            },
            Style::default().fg(Color::Green),
        ));
    }
    Line::from(spans)
}

pub fn result_lines(state: &ViewState) -> Vec<Line<'static>> {
    match &state.results {
        None => vec![Line::from(Span::styled(
            "Choose filters and press Enter to search.",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(records) if records.is_empty() => format_results(records)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Yellow))))
            .collect(),
        Some(records) => format_results(records).into_iter().map(Line::from).collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::logged_in_view_state;
    use immo_core::catalog::default_catalog;
    use immo_core::format::NO_RESULTS_MESSAGE;
    use immo_core::{filter, SearchCriteria};

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn hint_before_first_search() {
        let state = logged_in_view_state();
        let lines = result_lines(&state);
        assert_eq!(lines.len(), 1);
        assert!(plain(&lines[0]).contains("press Enter"));
    }

    #[test]
    fn empty_results_show_message() {
        let mut state = logged_in_view_state();
        state.results = Some(Vec::new());
        let lines = result_lines(&state);
        assert_eq!(plain(&lines[0]), NO_RESULTS_MESSAGE);
    }

    #[test]
    fn results_render_one_line_each() {
        let catalog = default_catalog().unwrap();
        let mut state = logged_in_view_state();
        state.results = Some(filter(
            &catalog,
            &SearchCriteria::new("All", "1,000,000+", "All"),
        ));
        let lines: Vec<String> = result_lines(&state).iter().map(plain).collect();
        assert_eq!(
            lines,
            [
                "3 BHK Villa - 1000000 - Geneva - Villa",
                "Luxury Penthouse - 1200000 - Lucerne - Apartment",
            ]
        );
        assert_eq!(plain(&build_title(&state)), "Search Results -- 2 properties");
    }

    #[test]
    fn render_does_not_panic_when_scrolled_past_end() {
        let backend = ratatui::backend::TestBackend::new(80, 6);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = logged_in_view_state();
        state.results = Some(default_catalog().unwrap().to_vec());
        state.scroll_offset.insert("results".into(), 500);
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
