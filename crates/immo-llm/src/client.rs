// Chat completion streaming client using reqwest-eventsource.
//
// Sends a system + user message pair to an OpenAI-compatible chat completions
// endpoint (Groq by default) with `stream: true` and parses the Server-Sent
// Events into `LlmEvent` variants that are forwarded over an mpsc channel for
// the app orchestrator to consume.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use immo_core::config::Config;
use immo_core::protocol::LlmEvent;

/// Sentinel data line that ends an OpenAI-style stream.
const DONE_SENTINEL: &str = "[DONE]";

// ---------------------------------------------------------------------------
// ChatClient
// ---------------------------------------------------------------------------

/// Low-level streaming chat completions client.
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl ChatClient {
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            api_url,
            model,
            max_tokens,
            temperature,
        }
    }

    /// Send one question and stream the answer as `LlmEvent`s over `tx`.
    ///
    /// Every emitted event carries `generation` so that the receiving side
    /// can discard events from superseded requests. Failures are reported as
    /// `LlmEvent::Error`; the method itself only returns once the stream is
    /// complete, has failed, or the receiver is dropped.
    pub async fn stream_chat(
        &self,
        system: &str,
        user_content: &str,
        tx: mpsc::Sender<LlmEvent>,
        generation: u64,
    ) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            let _ = tx
                .send(LlmEvent::Error {
                    message: "API key not configured".to_string(),
                    generation,
                })
                .await;
            return Ok(());
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": true,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user_content }
            ]
        });

        let request = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body);

        let mut es = match request.eventsource() {
            Ok(es) => es,
            Err(e) => {
                let _ = tx
                    .send(LlmEvent::Error {
                        message: format!("Failed to create event source: {e}"),
                        generation,
                    })
                    .await;
                return Ok(());
            }
        };

        let mut full_text = String::new();
        let mut finish_reason: Option<String> = None;
        let mut input_tokens: u32 = 0;
        let mut output_tokens: u32 = 0;

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("SSE connection opened");
                }
                Ok(Event::Message(msg)) => {
                    let data = msg.data.trim();
                    if data == DONE_SENTINEL {
                        debug!("[DONE] received, streaming complete");
                        let _ = tx
                            .send(LlmEvent::Complete {
                                full_text,
                                finish_reason,
                                input_tokens,
                                output_tokens,
                                generation,
                            })
                            .await;
                        es.close();
                        return Ok(());
                    }

                    let chunk = match parse_chunk(data) {
                        Some(chunk) => chunk,
                        None => {
                            warn!("ignoring unparseable SSE chunk");
                            continue;
                        }
                    };

                    if let Some((prompt, completion)) = chunk.usage {
                        input_tokens = prompt;
                        output_tokens = completion;
                        debug!(input_tokens, output_tokens, "usage reported");
                    }
                    if chunk.finish_reason.is_some() {
                        finish_reason = chunk.finish_reason;
                    }
                    if let Some(text) = chunk.content.filter(|t| !t.is_empty()) {
                        full_text.push_str(&text);
                        if tx
                            .send(LlmEvent::Token { text, generation })
                            .await
                            .is_err()
                        {
                            // Receiver dropped, abort stream.
                            es.close();
                            return Ok(());
                        }
                    }
                }
                // The server closed the connection without [DONE]: keep
                // whatever arrived as the answer.
                Err(reqwest_eventsource::Error::StreamEnded) if !full_text.is_empty() => {
                    debug!("stream ended without [DONE], completing with received text");
                    let _ = tx
                        .send(LlmEvent::Complete {
                            full_text,
                            finish_reason,
                            input_tokens,
                            output_tokens,
                            generation,
                        })
                        .await;
                    es.close();
                    return Ok(());
                }
                Err(err) => {
                    warn!(?err, "SSE stream error");
                    let error_message = extract_error_message(&err);
                    let _ = tx
                        .send(LlmEvent::Error {
                            message: error_message,
                            generation,
                        })
                        .await;
                    es.close();
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LlmClient wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that can be either an active client or disabled.
pub enum LlmClient {
    /// API key configured, requests go to the endpoint.
    Active(ChatClient),
    /// No API key: every request answers with an error event.
    Disabled,
}

impl LlmClient {
    /// Returns `Active` if an API key is present in credentials, otherwise
    /// `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        match &config.credentials.groq_api_key {
            Some(key) if !key.is_empty() => LlmClient::Active(ChatClient::new(
                key.clone(),
                config.llm.api_url.clone(),
                config.llm.model.clone(),
                config.llm.max_tokens,
                config.llm.temperature,
            )),
            _ => LlmClient::Disabled,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LlmClient::Active(_))
    }

    /// Stream an answer, delegating to the inner `ChatClient` or immediately
    /// sending an error if disabled.
    pub async fn stream_chat(
        &self,
        system: &str,
        user_content: &str,
        tx: mpsc::Sender<LlmEvent>,
        generation: u64,
    ) -> anyhow::Result<()> {
        match self {
            LlmClient::Active(client) => {
                client
                    .stream_chat(system, user_content, tx, generation)
                    .await
            }
            LlmClient::Disabled => {
                let _ = tx
                    .send(LlmEvent::Error {
                        message: "LLM not configured".to_string(),
                        generation,
                    })
                    .await;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// The parts of one `chat.completion.chunk` the client cares about.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Chunk {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
    /// `(prompt_tokens, completion_tokens)`
    pub usage: Option<(u32, u32)>,
}

/// Parse a streamed chunk.
///
/// Expected shape:
/// `{ "choices": [{ "delta": { "content": "..." }, "finish_reason": null }],
///    "usage": {...} }`
/// Groq reports usage under `x_groq.usage` on the final chunk instead.
pub(crate) fn parse_chunk(data: &str) -> Option<Chunk> {
    let v: Value = serde_json::from_str(data).ok()?;
    let choice = v.get("choices").and_then(|c| c.get(0));

    let content = choice
        .and_then(|c| c.get("delta"))
        .and_then(|d| d.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let finish_reason = choice
        .and_then(|c| c.get("finish_reason"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let usage = v
        .get("usage")
        .filter(|u| !u.is_null())
        .or_else(|| v.get("x_groq").and_then(|x| x.get("usage")))
        .and_then(parse_usage);

    Some(Chunk {
        content,
        finish_reason,
        usage,
    })
}

fn parse_usage(usage: &Value) -> Option<(u32, u32)> {
    let prompt = u32::try_from(usage.get("prompt_tokens")?.as_u64()?).ok()?;
    let completion = u32::try_from(usage.get("completion_tokens")?.as_u64()?).ok()?;
    Some((prompt, completion))
}

/// Extract a human-readable error message from an SSE error.
fn extract_error_message(err: &reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            format!("API returned status {status}")
        }
        reqwest_eventsource::Error::Transport(e) => {
            format!("Network error: {e}")
        }
        other => format!("Stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
