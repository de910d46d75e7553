// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the TUI and
// streaming events from the chat client. Runs the property filter, the login
// gate and the chat flow, and pushes UI updates to the TUI render loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use immo_core::catalog::Catalog;
use immo_core::config::Config;
use immo_core::filter::{filter, SearchCriteria};
use immo_core::login::{self, LoginAttempt, Session};
use immo_core::protocol::{ChatEntry, LlmEvent, LlmStatus, UiUpdate, UserCommand};
use immo_core::PropertyRecord;
use immo_llm::prompt;
use immo_llm::LlmClient;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    /// `Some` once the login gate has been passed.
    pub session: Option<Session>,
    pub current_llm_task: Option<tokio::task::JoinHandle<()>>,
    /// Monotonically increasing counter identifying the current chat request.
    /// Events from older generations are discarded in `handle_llm_event`.
    pub llm_generation: u64,
    /// Answer text accumulated for the current generation.
    pub answer_text: String,
    pub answer_status: LlmStatus,
    /// Shared with spawned chat tasks.
    pub llm_client: Arc<LlmClient>,
    /// Spawned tasks stream events back to the main loop through clones of
    /// this sender.
    pub llm_tx: mpsc::Sender<LlmEvent>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Catalog,
        llm_client: LlmClient,
        llm_tx: mpsc::Sender<LlmEvent>,
    ) -> Self {
        AppState {
            config,
            catalog,
            session: None,
            current_llm_task: None,
            llm_generation: 0,
            answer_text: String::new(),
            answer_status: LlmStatus::Idle,
            llm_client: Arc::new(llm_client),
            llm_tx,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Run the login gate for the configured mode.
    pub fn login(&mut self, attempt: &LoginAttempt) -> Result<Session, login::LoginError> {
        let session = login::authenticate(self.config.login.mode, attempt)?;
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Drop the session and any in-flight answer.
    pub fn logout(&mut self) {
        self.cancel_llm_task();
        self.bump_generation();
        self.session = None;
        self.answer_text.clear();
        self.answer_status = LlmStatus::Idle;
    }

    /// Run the property filter over the catalog.
    pub fn search(&self, criteria: &SearchCriteria) -> Vec<PropertyRecord> {
        filter(&self.catalog, criteria)
    }

    /// Cancel the current chat task if one is running.
    pub fn cancel_llm_task(&mut self) {
        if let Some(handle) = self.current_llm_task.take() {
            handle.abort();
            info!("Cancelled previous chat task");
        }
    }

    fn bump_generation(&mut self) -> u64 {
        self.llm_generation += 1;
        self.llm_generation
    }

    /// Start streaming an answer to `question`.
    ///
    /// Cancels any in-flight request and bumps the generation so its
    /// leftover events are ignored.
    pub fn trigger_chat(&mut self, question: &str) {
        self.cancel_llm_task();

        let generation = self.bump_generation();
        self.answer_text.clear();
        self.answer_status = LlmStatus::Streaming;

        let system = prompt::system_prompt();
        let user_content = question.to_string();
        let client = Arc::clone(&self.llm_client);
        let tx = self.llm_tx.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = client
                .stream_chat(&system, &user_content, tx, generation)
                .await
            {
                warn!("Chat task failed: {}", e);
            }
        });

        self.current_llm_task = Some(handle);
        info!("Triggered chat request (gen: {})", generation);
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the orchestrator until the user quits or the command channel closes.
pub async fn run(
    mut llm_rx: mpsc::Receiver<LlmEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    // Once the LLM channel closes, stop polling it so select! never spins.
    let mut llm_open = true;

    loop {
        tokio::select! {
            // --- Chat events (only poll when channel is open) ---
            llm_event = llm_rx.recv(), if llm_open => {
                match llm_event {
                    Some(event) => {
                        handle_llm_event(&mut state, event, &ui_tx).await;
                    }
                    None => {
                        info!("LLM channel closed");
                        llm_open = false;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    state.cancel_llm_task();
    info!("Application event loop exiting");
    Ok(())
}

/// Apply a streamed chat event, forwarding it to the TUI.
async fn handle_llm_event(state: &mut AppState, event: LlmEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
    let event_generation = event.generation();
    if event_generation != state.llm_generation {
        debug!(
            "Discarding stale LLM event (event gen: {}, current gen: {})",
            event_generation, state.llm_generation
        );
        return;
    }

    match event {
        LlmEvent::Token { text, .. } => {
            state.answer_text.push_str(&text);
            state.answer_status = LlmStatus::Streaming;
            let _ = ui_tx.send(UiUpdate::ChatToken(text)).await;
        }
        LlmEvent::Complete {
            full_text,
            finish_reason,
            input_tokens,
            output_tokens,
            ..
        } => {
            info!(
                input_tokens,
                output_tokens,
                finish_reason = finish_reason.as_deref().unwrap_or("-"),
                "Chat answer complete"
            );
            let text = prompt::finish_answer(full_text, finish_reason.as_deref());
            state.answer_text = text.clone();
            state.answer_status = LlmStatus::Complete;
            state.current_llm_task = None;
            let _ = ui_tx
                .send(UiUpdate::ChatComplete(ChatEntry::assistant(text)))
                .await;
        }
        LlmEvent::Error { message, .. } => {
            warn!("Chat error: {}", message);
            state.answer_status = LlmStatus::Error;
            state.current_llm_task = None;
            let _ = ui_tx
                .send(UiUpdate::ChatError(ChatEntry::assistant(prompt::apology(
                    &message,
                ))))
                .await;
        }
    }
}

/// Handle a user command from the TUI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if !state.is_logged_in() && !matches!(cmd, UserCommand::Login(_) | UserCommand::Quit) {
        debug!("Ignoring {:?} before login", cmd);
        return;
    }

    match cmd {
        UserCommand::Login(attempt) => match state.login(&attempt) {
            Ok(session) => {
                info!(
                    "Login accepted ({})",
                    session.username.as_deref().unwrap_or("confirmed")
                );
                let _ = ui_tx.send(UiUpdate::LoginAccepted(session)).await;
            }
            Err(e) => {
                info!("Login rejected: {}", e);
                let _ = ui_tx.send(UiUpdate::LoginRejected(e.to_string())).await;
            }
        },
        UserCommand::Logout => {
            info!("Logging out");
            state.logout();
            let _ = ui_tx.send(UiUpdate::LoggedOut).await;
        }
        UserCommand::Ask(question) => {
            let question = question.trim();
            if question.is_empty() {
                return;
            }
            let _ = ui_tx
                .send(UiUpdate::ChatStarted(ChatEntry::user(question)))
                .await;

            if prompt::is_greeting(question) {
                // Supersede any in-flight answer before replying locally.
                state.cancel_llm_task();
                state.bump_generation();
                state.answer_text = prompt::GREETING_REPLY.to_string();
                state.answer_status = LlmStatus::Complete;
                let _ = ui_tx
                    .send(UiUpdate::ChatComplete(ChatEntry::assistant(
                        prompt::GREETING_REPLY,
                    )))
                    .await;
            } else {
                state.trigger_chat(question);
            }
        }
        UserCommand::ApplyFilters(criteria) => {
            let results = state.search(&criteria);
            info!(
                location = %criteria.location,
                price_range = %criteria.price_range,
                property_type = %criteria.property_type,
                "Search matched {} of {} properties",
                results.len(),
                state.catalog.len()
            );
            let _ = ui_tx.send(UiUpdate::SearchResults(results)).await;
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use immo_core::catalog::default_catalog;
    use immo_core::config::*;
    use immo_core::login::LoginMode;

    fn test_config(mode: LoginMode) -> Config {
        Config {
            app: AppConfig {
                title: "Test".into(),
                website_url: "https://example.com".into(),
            },
            login: LoginConfig { mode },
            llm: LlmConfig {
                api_url: "http://127.0.0.1:9/v1/chat/completions".into(),
                model: "test".into(),
                max_tokens: 16,
                temperature: 0.7,
            },
            credentials: CredentialsConfig::default(),
        }
    }

    fn test_state(mode: LoginMode) -> (AppState, mpsc::Receiver<LlmEvent>) {
        let (llm_tx, llm_rx) = mpsc::channel(16);
        let state = AppState::new(
            test_config(mode),
            default_catalog().unwrap(),
            LlmClient::Disabled,
            llm_tx,
        );
        (state, llm_rx)
    }

    #[test]
    fn new_state_is_logged_out_and_idle() {
        let (state, _rx) = test_state(LoginMode::Confirm);
        assert!(!state.is_logged_in());
        assert_eq!(state.llm_generation, 0);
        assert_eq!(state.answer_status, LlmStatus::Idle);
        assert!(state.current_llm_task.is_none());
    }

    #[test]
    fn login_uses_configured_mode() {
        let (mut state, _rx) = test_state(LoginMode::Credentials);
        assert!(state
            .login(&LoginAttempt::Confirm { registered: true })
            .is_err());
        assert!(!state.is_logged_in());

        let session = state
            .login(&LoginAttempt::Credentials {
                username: "anna".into(),
                password: "pw".into(),
            })
            .unwrap();
        assert_eq!(session.username.as_deref(), Some("anna"));
        assert!(state.is_logged_in());
    }

    #[test]
    fn search_runs_filter_over_catalog() {
        let (state, _rx) = test_state(LoginMode::Confirm);
        let results = state.search(&SearchCriteria::new("All", "All", "Commercial"));
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn stale_llm_events_are_discarded() {
        let (mut state, _rx) = test_state(LoginMode::Confirm);
        state.llm_generation = 2;
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_llm_event(
            &mut state,
            LlmEvent::Token {
                text: "old".into(),
                generation: 1,
            },
            &ui_tx,
        )
        .await;
        assert!(ui_rx.try_recv().is_err());
        assert!(state.answer_text.is_empty());

        handle_llm_event(
            &mut state,
            LlmEvent::Token {
                text: "new".into(),
                generation: 2,
            },
            &ui_tx,
        )
        .await;
        assert_eq!(ui_rx.try_recv().unwrap(), UiUpdate::ChatToken("new".into()));
        assert_eq!(state.answer_text, "new");
    }

    #[tokio::test]
    async fn truncated_answer_gets_note() {
        let (mut state, _rx) = test_state(LoginMode::Confirm);
        state.llm_generation = 1;
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_llm_event(
            &mut state,
            LlmEvent::Complete {
                full_text: "Long answer".into(),
                finish_reason: Some("length".into()),
                input_tokens: 1,
                output_tokens: 16,
                generation: 1,
            },
            &ui_tx,
        )
        .await;

        match ui_rx.try_recv().unwrap() {
            UiUpdate::ChatComplete(entry) => {
                assert!(entry.text.starts_with("Long answer"));
                assert!(entry.text.ends_with(prompt::TRUNCATION_NOTE));
            }
            other => panic!("expected ChatComplete, got {other:?}"),
        }
        assert_eq!(state.answer_status, LlmStatus::Complete);
    }

    #[tokio::test]
    async fn error_event_becomes_apology() {
        let (mut state, _rx) = test_state(LoginMode::Confirm);
        state.llm_generation = 4;
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_llm_event(
            &mut state,
            LlmEvent::Error {
                message: "Network error: refused".into(),
                generation: 4,
            },
            &ui_tx,
        )
        .await;

        match ui_rx.try_recv().unwrap() {
            UiUpdate::ChatError(entry) => assert_eq!(
                entry.text,
                "Sorry, I couldn't process your request. Error: Network error: refused"
            ),
            other => panic!("expected ChatError, got {other:?}"),
        }
        assert_eq!(state.answer_status, LlmStatus::Error);
    }

    #[tokio::test]
    async fn commands_before_login_are_ignored() {
        let (mut state, _rx) = test_state(LoginMode::Confirm);
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_user_command(
            &mut state,
            UserCommand::ApplyFilters(SearchCriteria::any()),
            &ui_tx,
        )
        .await;
        handle_user_command(&mut state, UserCommand::Ask("hello".into()), &ui_tx).await;
        assert!(ui_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn greeting_supersedes_in_flight_answer() {
        let (mut state, _rx) = test_state(LoginMode::Confirm);
        state.session = Some(Session { username: None });
        state.llm_generation = 7;
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_user_command(&mut state, UserCommand::Ask("  Hello  ".into()), &ui_tx).await;

        assert_eq!(state.llm_generation, 8);
        match ui_rx.try_recv().unwrap() {
            UiUpdate::ChatStarted(entry) => assert_eq!(entry.text, "Hello"),
            other => panic!("expected ChatStarted, got {other:?}"),
        }
        match ui_rx.try_recv().unwrap() {
            UiUpdate::ChatComplete(entry) => assert_eq!(entry.text, prompt::GREETING_REPLY),
            other => panic!("expected ChatComplete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_question_is_ignored() {
        let (mut state, _rx) = test_state(LoginMode::Confirm);
        state.session = Some(Session { username: None });
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_user_command(&mut state, UserCommand::Ask("   ".into()), &ui_tx).await;
        assert!(ui_rx.try_recv().is_err());
        assert_eq!(state.llm_generation, 0);
    }

    #[tokio::test]
    async fn logout_clears_session_and_bumps_generation() {
        let (mut state, _rx) = test_state(LoginMode::Confirm);
        state.session = Some(Session { username: None });
        state.answer_text = "partial".into();
        let (ui_tx, mut ui_rx) = mpsc::channel(8);

        handle_user_command(&mut state, UserCommand::Logout, &ui_tx).await;

        assert!(!state.is_logged_in());
        assert!(state.answer_text.is_empty());
        assert_eq!(state.llm_generation, 1);
        assert_eq!(ui_rx.try_recv().unwrap(), UiUpdate::LoggedOut);
    }
}
