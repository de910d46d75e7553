// Screen layout: panel arrangement and sizing.
//
// Main screen:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Chat Transcript (fill)                            |
// +--------------------------------------------------+
// | Chat Input (3 rows)                               |
// +------------+-------------+-------------+---------+
// | Location   | Price Range | Type        | Apply   |  (3 rows)
// +------------+-------------+-------------+---------+
// | Search Results (40%)                              |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// The login screen is a centered dialog between the status and help bars.

use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

/// Resolved screen areas for the main screen.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    pub transcript: Rect,
    pub chat_input: Rect,
    pub location: Rect,
    pub price_range: Rect,
    pub property_type: Rect,
    pub apply: Rect,
    pub results: Rect,
    pub help_bar: Rect,
}

/// Resolved screen areas for the login screen.
#[derive(Debug, Clone)]
pub struct LoginLayout {
    pub status_bar: Rect,
    pub dialog: Rect,
    pub help_bar: Rect,
}

/// Login dialog size.
const LOGIN_WIDTH: u16 = 72;
const LOGIN_HEIGHT: u16 = 12;

/// Build the main screen layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // status bar
            Constraint::Min(4),         // transcript
            Constraint::Length(3),      // chat input
            Constraint::Length(3),      // search form
            Constraint::Percentage(40), // results
            Constraint::Length(1),      // help bar
        ])
        .split(area);

    let form = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(28),
            Constraint::Percentage(12),
        ])
        .split(vertical[3]);

    AppLayout {
        status_bar: vertical[0],
        transcript: vertical[1],
        chat_input: vertical[2],
        location: form[0],
        price_range: form[1],
        property_type: form[2],
        apply: form[3],
        results: vertical[4],
        help_bar: vertical[5],
    }
}

/// Build the login screen layout.
pub fn build_login_layout(area: Rect) -> LoginLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    LoginLayout {
        status_bar: vertical[0],
        dialog: centered_rect(LOGIN_WIDTH, LOGIN_HEIGHT, vertical[1]),
        help_bar: vertical[2],
    }
}

/// Compute a centered rectangle of the given size within `area`, clamped to
/// the space available.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    fn all_rects(layout: &AppLayout) -> [(&'static str, Rect); 9] {
        [
            ("status_bar", layout.status_bar),
            ("transcript", layout.transcript),
            ("chat_input", layout.chat_input),
            ("location", layout.location),
            ("price_range", layout.price_range),
            ("property_type", layout.property_type),
            ("apply", layout.apply),
            ("results", layout.results),
            ("help_bar", layout.help_bar),
        ]
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        for (name, rect) in all_rects(&layout) {
            assert!(
                rect.width > 0 && rect.height > 0,
                "{} has zero area: {:?}",
                name,
                rect
            );
        }
    }

    #[test]
    fn layout_bars_are_one_row() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
    }

    #[test]
    fn layout_form_fields_share_a_row() {
        let layout = build_layout(test_area());
        assert_eq!(layout.location.y, layout.price_range.y);
        assert_eq!(layout.price_range.y, layout.property_type.y);
        assert_eq!(layout.property_type.y, layout.apply.y);
        assert!(layout.location.x < layout.price_range.x);
        assert!(layout.property_type.x < layout.apply.x);
        assert_eq!(layout.location.height, 3);
    }

    #[test]
    fn layout_stacks_chat_above_form_above_results() {
        let layout = build_layout(test_area());
        assert!(layout.transcript.y < layout.chat_input.y);
        assert!(layout.chat_input.y < layout.location.y);
        assert!(layout.location.y < layout.results.y);
    }

    #[test]
    fn layout_fits_within_area() {
        let area = test_area();
        let layout = build_layout(area);
        for (name, rect) in all_rects(&layout) {
            assert!(rect.x + rect.width <= area.width, "{name} exceeds width");
            assert!(rect.y + rect.height <= area.height, "{name} exceeds height");
        }
    }

    #[test]
    fn layout_small_terminal_still_valid() {
        let layout = build_layout(Rect::new(0, 0, 60, 24));
        for (name, rect) in all_rects(&layout) {
            assert!(rect.width > 0 && rect.height > 0, "{name} collapsed: {rect:?}");
        }
    }

    #[test]
    fn login_dialog_is_centered_and_clamped() {
        let login = build_login_layout(test_area());
        assert_eq!(login.dialog.width, LOGIN_WIDTH);
        assert_eq!(login.dialog.height, LOGIN_HEIGHT);

        let small = build_login_layout(Rect::new(0, 0, 40, 10));
        assert!(small.dialog.width <= 40);
        assert!(small.dialog.height <= 8);
    }

    #[test]
    fn centered_rect_is_centered() {
        let area = Rect::new(0, 0, 80, 24);
        let result = centered_rect(28, 5, area);
        let dx = (result.x + result.width / 2) as i32 - (area.width / 2) as i32;
        let dy = (result.y + result.height / 2) as i32 - (area.height / 2) as i32;
        assert!(dx.unsigned_abs() <= 1, "not horizontally centered: {result:?}");
        assert!(dy.unsigned_abs() <= 1, "not vertically centered: {result:?}");
    }
}
