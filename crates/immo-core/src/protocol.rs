// Messages exchanged between the TUI, the app orchestrator and the chat
// client task.
//
// TUI -> app:  UserCommand
// app -> TUI:  UiUpdate
// chat -> app: LlmEvent (tagged with a generation so superseded requests
//              can be discarded)

use chrono::{DateTime, Local};

use crate::catalog::PropertyRecord;
use crate::filter::SearchCriteria;
use crate::login::{LoginAttempt, Session};

// ---------------------------------------------------------------------------
// Chat client events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum LlmEvent {
    /// A streamed chunk of answer text.
    Token { text: String, generation: u64 },
    /// The answer finished; `full_text` is the concatenation of all tokens.
    Complete {
        full_text: String,
        finish_reason: Option<String>,
        input_tokens: u32,
        output_tokens: u32,
        generation: u64,
    },
    /// Transport, API or configuration failure.
    Error { message: String, generation: u64 },
}

impl LlmEvent {
    pub fn generation(&self) -> u64 {
        match self {
            LlmEvent::Token { generation, .. }
            | LlmEvent::Complete { generation, .. }
            | LlmEvent::Error { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmStatus {
    #[default]
    Idle,
    Streaming,
    Complete,
    Error,
}

// ---------------------------------------------------------------------------
// Chat transcript
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One line of the chat transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub text: String,
    pub at: DateTime<Local>,
}

impl ChatEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            at: Local::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            at: Local::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// TUI <-> app
// ---------------------------------------------------------------------------

/// Commands sent from the TUI to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Login(LoginAttempt),
    Logout,
    /// Ask the assistant a question.
    Ask(String),
    /// Run the property filter with criteria built from the search form.
    ApplyFilters(SearchCriteria),
    Quit,
}

/// Updates pushed from the app orchestrator to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    LoginAccepted(Session),
    LoginRejected(String),
    LoggedOut,
    /// A question was accepted; the answer follows as tokens or at once.
    ChatStarted(ChatEntry),
    ChatToken(String),
    ChatComplete(ChatEntry),
    /// The answer failed; the entry carries the apology shown to the user.
    ChatError(ChatEntry),
    SearchResults(Vec<PropertyRecord>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_read_from_every_variant() {
        let events = [
            LlmEvent::Token {
                text: "a".into(),
                generation: 3,
            },
            LlmEvent::Complete {
                full_text: "a".into(),
                finish_reason: None,
                input_tokens: 0,
                output_tokens: 0,
                generation: 3,
            },
            LlmEvent::Error {
                message: "x".into(),
                generation: 3,
            },
        ];
        assert!(events.iter().all(|e| e.generation() == 3));
    }

    #[test]
    fn chat_entry_constructors_set_role() {
        assert_eq!(ChatEntry::user("hi").role, ChatRole::User);
        assert_eq!(ChatEntry::assistant("hello").role, ChatRole::Assistant);
    }
}
