// Terminal UI: login gate, chat panel, search form and results.
//
// The TUI owns a `ViewState` holding form state and a mirror of what the app
// orchestrator reports. The orchestrator pushes `UiUpdate` messages over an
// mpsc channel; the TUI applies them to `ViewState` and re-renders at ~30 fps.
// Search criteria are never kept as state here: only the select positions
// are, and a fresh `SearchCriteria` is built from them on apply.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;

use immo_core::catalog::{location_options, property_type_options};
use immo_core::config::Config;
use immo_core::filter::{price_range_options, SearchCriteria};
use immo_core::login::{LoginMode, Session};
use immo_core::protocol::{ChatEntry, LlmStatus, UiUpdate, UserCommand};
use immo_core::PropertyRecord;

use layout::{build_layout, build_login_layout};

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// Which element of the main screen receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    ChatInput,
    Location,
    PriceRange,
    PropertyType,
    Apply,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::ChatInput,
        Focus::Location,
        Focus::PriceRange,
        Focus::PropertyType,
        Focus::Apply,
    ];

    pub fn next(self) -> Focus {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Focus {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// A select box: fixed options, one selected. Option 0 is the wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectState {
    pub label: &'static str,
    pub options: Vec<String>,
    pub selected: usize,
}

impl SelectState {
    pub fn new(label: &'static str, options: Vec<String>) -> Self {
        SelectState {
            label,
            options,
            selected: 0,
        }
    }

    pub fn value(&self) -> &str {
        self.options
            .get(self.selected)
            .map(String::as_str)
            .unwrap_or(immo_core::WILDCARD)
    }

    /// Select the next option, wrapping around.
    pub fn next(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + 1) % self.options.len();
        }
    }

    /// Select the previous option, wrapping around.
    pub fn prev(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + self.options.len() - 1) % self.options.len();
        }
    }
}

/// Fields of the credentials login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub mode: LoginMode,
    /// Confirm mode answer; starts at "No".
    pub registered: bool,
    pub username: String,
    pub password: String,
    pub field: LoginField,
    /// Rejection message from the last attempt.
    pub message: Option<String>,
}

impl LoginForm {
    pub fn new(mode: LoginMode) -> Self {
        LoginForm {
            mode,
            registered: false,
            username: String::new(),
            password: String::new(),
            field: LoginField::Username,
            message: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state read by `render_frame`.
pub struct ViewState {
    pub title: String,
    pub website_url: String,
    /// Whether the chat client has an API key.
    pub llm_enabled: bool,
    pub session: Option<Session>,
    pub login: LoginForm,
    pub focus: Focus,
    pub chat_input: String,
    pub transcript: Vec<ChatEntry>,
    /// Answer text streamed so far for the pending question.
    pub pending_answer: String,
    pub chat_status: LlmStatus,
    pub location: SelectState,
    pub price_range: SelectState,
    pub property_type: SelectState,
    /// `None` until the first search has been applied.
    pub results: Option<Vec<PropertyRecord>>,
    /// Per-widget scroll offsets (keyed by widget name).
    pub scroll_offset: HashMap<String, usize>,
    pub confirm_quit: bool,
}

impl ViewState {
    pub fn new(
        title: impl Into<String>,
        website_url: impl Into<String>,
        login_mode: LoginMode,
        catalog: &[PropertyRecord],
        llm_enabled: bool,
    ) -> Self {
        ViewState {
            title: title.into(),
            website_url: website_url.into(),
            llm_enabled,
            session: None,
            login: LoginForm::new(login_mode),
            focus: Focus::ChatInput,
            chat_input: String::new(),
            transcript: Vec::new(),
            pending_answer: String::new(),
            chat_status: LlmStatus::Idle,
            location: SelectState::new("Location", location_options(catalog)),
            price_range: SelectState::new("Price Range", price_range_options()),
            property_type: SelectState::new("Property Type", property_type_options(catalog)),
            results: None,
            scroll_offset: HashMap::new(),
            confirm_quit: false,
        }
    }

    pub fn from_config(config: &Config, catalog: &[PropertyRecord], llm_enabled: bool) -> Self {
        Self::new(
            config.app.title.clone(),
            config.app.website_url.clone(),
            config.login.mode,
            catalog,
            llm_enabled,
        )
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Build search criteria from the current select positions.
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria::new(
            self.location.value(),
            self.price_range.value(),
            self.property_type.value(),
        )
    }

    fn reset_after_logout(&mut self) {
        self.session = None;
        self.login = LoginForm::new(self.login.mode);
        self.focus = Focus::ChatInput;
        self.chat_input.clear();
        self.transcript.clear();
        self.pending_answer.clear();
        self.chat_status = LlmStatus::Idle;
        self.results = None;
        self.scroll_offset.clear();
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::LoginAccepted(session) => {
            state.session = Some(session);
            state.login.message = None;
            state.login.password.clear();
            state.focus = Focus::ChatInput;
        }
        UiUpdate::LoginRejected(message) => {
            state.login.message = Some(message);
        }
        UiUpdate::LoggedOut => {
            state.reset_after_logout();
        }
        UiUpdate::ChatStarted(question) => {
            state.transcript.push(question);
            state.pending_answer.clear();
            state.chat_status = LlmStatus::Streaming;
        }
        UiUpdate::ChatToken(token) => {
            state.pending_answer.push_str(&token);
            state.chat_status = LlmStatus::Streaming;
        }
        UiUpdate::ChatComplete(answer) => {
            state.pending_answer.clear();
            state.transcript.push(answer);
            state.chat_status = LlmStatus::Complete;
        }
        UiUpdate::ChatError(apology) => {
            state.pending_answer.clear();
            state.transcript.push(apology);
            state.chat_status = LlmStatus::Error;
        }
        UiUpdate::SearchResults(records) => {
            state.results = Some(records);
            state.scroll_offset.insert("results".to_string(), 0);
        }
    }
}

/// Pull stored scroll offsets back within what the panels at `area` can show,
/// so scrolling past the end never leaves dead key presses behind.
pub fn clamp_scroll_offsets(state: &mut ViewState, area: Rect) {
    if !state.is_logged_in() {
        return;
    }
    let layout = build_layout(area);
    let limits = [
        ("results", widgets::results::max_scroll(state, layout.results)),
        ("transcript", widgets::chat::max_scroll(state, layout.transcript)),
    ];
    for (key, max) in limits {
        if let Some(offset) = state.scroll_offset.get_mut(key) {
            *offset = (*offset).min(max);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the login screen or the main screen.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    if state.is_logged_in() {
        let layout = build_layout(frame.area());
        widgets::status_bar::render(frame, layout.status_bar, state);
        widgets::chat::render_transcript(frame, layout.transcript, state);
        widgets::chat::render_input(frame, layout.chat_input, state);
        widgets::search_form::render(frame, &layout, state);
        widgets::results::render(frame, layout.results, state);
        render_help_bar(frame, layout.help_bar, state);
    } else {
        let layout = build_login_layout(frame.area());
        widgets::status_bar::render(frame, layout.status_bar, state);
        widgets::login::render(frame, layout.dialog, state);
        render_help_bar(frame, layout.help_bar, state);
    }

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

/// Key hints for the current screen and focus.
pub fn help_text(state: &ViewState) -> &'static str {
    if !state.is_logged_in() {
        return match state.login.mode {
            LoginMode::Confirm => " \u{2190}/\u{2192}:Yes/No | Enter:Continue | q:Quit",
            LoginMode::Credentials => " Tab:Next field | Enter:Log in | Esc:Quit",
        };
    }
    match state.focus {
        Focus::ChatInput => " Enter:Ask | Tab:Search form | PgUp/PgDn:Scroll chat | Ctrl+L:Log out | Esc:Clear",
        Focus::Location | Focus::PriceRange | Focus::PropertyType => {
            " \u{2190}/\u{2192}:Change | Enter:Apply | Tab:Next | \u{2191}/\u{2193}:Scroll results | q:Quit"
        }
        Focus::Apply => " Enter:Apply filters | Tab:Next | \u{2191}/\u{2193}:Scroll results | q:Quit",
    }
}

fn render_help_bar(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        help_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook that restores the terminal.
/// 3. Selects over UI updates, keyboard input and render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    mut view_state: ViewState,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Channel closed: app is shutting down
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    // Mouse and resize events are redrawn on the next tick.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::from(e)),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                let drawn = terminal.draw(|frame| {
                    clamp_scroll_offsets(&mut view_state, frame.area());
                    render_frame(frame, &view_state);
                });
                if let Err(e) = drawn {
                    break Err(e.into());
                }
            }
        }
    };

    ratatui::restore();

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
