// TUI widget modules for each screen panel.

pub mod chat;
pub mod login;
pub mod quit_confirm;
pub mod results;
pub mod search_form;
pub mod status_bar;

use ratatui::style::{Color, Modifier, Style};

/// Highlight a panel border when it has keyboard focus, otherwise keep
/// the panel's own border style.
pub fn focused_border_style(focused: bool, base: Style) -> Style {
    if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        base
    }
}
