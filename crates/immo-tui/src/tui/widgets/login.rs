// Login dialog widget.
//
// Confirm mode asks whether the user is registered on the brokerage website
// and shows a Yes/No toggle. Credentials mode shows username and password
// fields (password masked). A rejection message from the last attempt is
// shown in red under the form.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use immo_core::login::{LoginMode, CONFIRM_QUESTION};

use crate::tui::{LoginField, LoginForm, ViewState};

/// Render the login dialog into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Welcome to {}", state.title),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    match state.login.mode {
        LoginMode::Confirm => {
            lines.push(Line::from(CONFIRM_QUESTION));
            lines.push(Line::from(""));
            lines.push(yes_no_line(state.login.registered));
        }
        LoginMode::Credentials => {
            lines.push(field_line(
                "Username",
                &state.login.username,
                state.login.field == LoginField::Username,
            ));
            lines.push(field_line(
                "Password",
                &mask(&state.login.password),
                state.login.field == LoginField::Password,
            ));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Register at {}", state.website_url),
        Style::default().fg(Color::DarkGray),
    )));

    if state.login.mode == LoginMode::Credentials && looks_complete(&state.login) {
        lines.push(Line::from(Span::styled(
            "Press Enter to log in",
            Style::default().fg(Color::Yellow),
        )));
    }

    if let Some(message) = &state.login.message {
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    " Log in ",
                    Style::default().add_modifier(Modifier::BOLD),
                ))
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// "[ Yes ]  [ No ]" with the current answer highlighted.
fn yes_no_line(registered: bool) -> Line<'static> {
    let selected = Style::default()
        .fg(Color::Black)
        .bg(Color::White)
        .add_modifier(Modifier::BOLD);
    let normal = Style::default().fg(Color::White);
    Line::from(vec![
        Span::styled("[ Yes ]", if registered { selected } else { normal }),
        Span::raw("  "),
        Span::styled("[ No ]", if registered { normal } else { selected }),
    ])
}

fn field_line(label: &'static str, value: &str, focused: bool) -> Line<'static> {
    let cursor = if focused { "_" } else { "" };
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(vec![
        Span::styled(format!("{:<10}", format!("{}:", label)), label_style),
        Span::raw(format!("{}{}", value, cursor)),
    ])
}

/// One `*` per character.
pub fn mask(password: &str) -> String {
    "*".repeat(password.chars().count())
}

/// Whether both credential fields are filled in. Drives the submit hint;
/// the app still decides whether the attempt is accepted.
pub fn looks_complete(form: &LoginForm) -> bool {
    match form.mode {
        LoginMode::Confirm => true,
        LoginMode::Credentials => {
            !form.username.trim().is_empty() && !form.password.trim().is_empty()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
