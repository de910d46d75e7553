// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (focus, text editing,
// select cycling, scrolling).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use immo_core::login::{LoginAttempt, LoginMode};
use immo_core::protocol::UserCommand;

use super::{Focus, LoginField, ViewState};

/// Scroll keys for the chat transcript and results panels.
const TRANSCRIPT_KEY: &str = "transcript";
const RESULTS_KEY: &str = "results";

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator (login, question, search, logout, quit). Returns `None`
/// when the key press was handled locally by mutating `ViewState`.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress; ignoring
    // non-Press events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if is_ctrl(&key_event, 'c') {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    if !view_state.is_logged_in() {
        return match view_state.login.mode {
            LoginMode::Confirm => handle_confirm_login(key_event, view_state),
            LoginMode::Credentials => handle_credentials_login(key_event, view_state),
        };
    }

    if is_ctrl(&key_event, 'l') {
        return Some(UserCommand::Logout);
    }

    match key_event.code {
        KeyCode::Tab => {
            view_state.focus = view_state.focus.next();
            None
        }
        KeyCode::BackTab => {
            view_state.focus = view_state.focus.prev();
            None
        }
        _ => match view_state.focus {
            Focus::ChatInput => handle_chat_input(key_event, view_state),
            Focus::Location | Focus::PriceRange | Focus::PropertyType | Focus::Apply => {
                handle_search_form(key_event, view_state)
            }
        },
    }
}

fn is_ctrl(key_event: &KeyEvent, c: char) -> bool {
    key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char(c)
}

/// Handle key events while in quit confirmation mode.
///
/// - `y` or `q` confirms quit (sends UserCommand::Quit)
/// - `n` or `Esc` cancels
/// - All other keys are blocked
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

/// Yes/No question: arrows toggle, `y`/`n` pick directly, Enter submits.
fn handle_confirm_login(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let login = &mut view_state.login;
    match key_event.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
            login.registered = !login.registered;
            None
        }
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            login.registered = true;
            None
        }
        KeyCode::Char('n') | KeyCode::Char('N') => {
            login.registered = false;
            None
        }
        KeyCode::Enter => Some(UserCommand::Login(LoginAttempt::Confirm {
            registered: login.registered,
        })),
        KeyCode::Char('q') | KeyCode::Esc => {
            view_state.confirm_quit = true;
            None
        }
        _ => None,
    }
}

/// Username/password form. Every printable key is text, so Esc asks to quit.
fn handle_credentials_login(
    key_event: KeyEvent,
    view_state: &mut ViewState,
) -> Option<UserCommand> {
    let login = &mut view_state.login;
    match key_event.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            login.field = match login.field {
                LoginField::Username => LoginField::Password,
                LoginField::Password => LoginField::Username,
            };
            None
        }
        KeyCode::Enter => {
            if login.field == LoginField::Username && login.password.is_empty() {
                login.field = LoginField::Password;
                return None;
            }
            Some(UserCommand::Login(LoginAttempt::Credentials {
                username: login.username.clone(),
                password: login.password.clone(),
            }))
        }
        KeyCode::Backspace => {
            match login.field {
                LoginField::Username => login.username.pop(),
                LoginField::Password => login.password.pop(),
            };
            None
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            match login.field {
                LoginField::Username => login.username.push(c),
                LoginField::Password => login.password.push(c),
            }
            None
        }
        KeyCode::Esc => {
            view_state.confirm_quit = true;
            None
        }
        _ => None,
    }
}

/// Question input: type, edit, submit; PageUp/PageDown scroll the transcript.
fn handle_chat_input(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Enter => {
            let question = view_state.chat_input.trim().to_string();
            if question.is_empty() {
                return None;
            }
            view_state.chat_input.clear();
            view_state.scroll_offset.insert(TRANSCRIPT_KEY.to_string(), 0);
            Some(UserCommand::Ask(question))
        }
        KeyCode::Backspace => {
            view_state.chat_input.pop();
            None
        }
        KeyCode::Esc => {
            view_state.chat_input.clear();
            None
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            view_state.chat_input.push(c);
            None
        }
        // Transcript offsets count lines up from the bottom.
        KeyCode::Up => {
            scroll_down(view_state, TRANSCRIPT_KEY, 1);
            None
        }
        KeyCode::Down => {
            scroll_up(view_state, TRANSCRIPT_KEY, 1);
            None
        }
        KeyCode::PageUp => {
            scroll_down(view_state, TRANSCRIPT_KEY, page_size());
            None
        }
        KeyCode::PageDown => {
            scroll_up(view_state, TRANSCRIPT_KEY, page_size());
            None
        }
        _ => None,
    }
}

/// Select boxes and the apply button.
fn handle_search_form(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Left | KeyCode::Char('h') => {
            if let Some(select) = focused_select(view_state) {
                select.prev();
            }
            None
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if let Some(select) = focused_select(view_state) {
                select.next();
            }
            None
        }
        KeyCode::Char(' ') if view_state.focus == Focus::Apply => {
            Some(UserCommand::ApplyFilters(view_state.criteria()))
        }
        KeyCode::Enter => Some(UserCommand::ApplyFilters(view_state.criteria())),

        KeyCode::Up | KeyCode::Char('k') => {
            scroll_up(view_state, RESULTS_KEY, 1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            scroll_down(view_state, RESULTS_KEY, 1);
            None
        }
        KeyCode::PageUp => {
            scroll_up(view_state, RESULTS_KEY, page_size());
            None
        }
        KeyCode::PageDown => {
            scroll_down(view_state, RESULTS_KEY, page_size());
            None
        }

        // Quit: enter confirmation mode instead of quitting immediately
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        KeyCode::Esc => {
            view_state.focus = Focus::ChatInput;
            None
        }
        _ => None,
    }
}

fn focused_select(view_state: &mut ViewState) -> Option<&mut super::SelectState> {
    match view_state.focus {
        Focus::Location => Some(&mut view_state.location),
        Focus::PriceRange => Some(&mut view_state.price_range),
        Focus::PropertyType => Some(&mut view_state.property_type),
        Focus::ChatInput | Focus::Apply => None,
    }
}

fn scroll_up(view_state: &mut ViewState, key: &str, lines: usize) {
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_sub(lines);
}

fn scroll_down(view_state: &mut ViewState, key: &str, lines: usize) {
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_add(lines);
}

/// Page size for PageUp/PageDown scrolling.
fn page_size() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
