//! OllamaAgent - direct REST implementation for a local Ollama endpoint.
//!
//! This agent calls the Ollama `/api/chat` endpoint directly without an SDK
//! dependency. Responses can be fetched whole or as an incremental token
//! stream; either way the caller receives plain response text.

use async_stream::try_stream;
use futures::stream::Stream;
use futures::StreamExt;
use kaiwa_core::session::ConversationMessage;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Errors surfaced by the model agent.
///
/// These never propagate as panics: the application layer renders them as a
/// textual error line substituted for the response.
#[derive(thiserror::Error, Debug)]
pub enum AgentError {
    /// The request could not be sent or the connection dropped.
    #[error("Model request failed: {message}")]
    Request { message: String, is_retryable: bool },

    /// The endpoint answered with a non-success status.
    #[error("Model endpoint returned {status}: {message}")]
    Http {
        status: u16,
        message: String,
        is_retryable: bool,
    },

    /// The response body could not be parsed.
    #[error("Failed to parse model response: {0}")]
    Parse(String),

    /// The endpoint answered successfully but produced no text.
    #[error("Model returned an empty response")]
    EmptyResponse,
}

impl AgentError {
    fn request(message: impl Into<String>, is_retryable: bool) -> Self {
        Self::Request {
            message: message.into(),
            is_retryable,
        }
    }
}

/// An incremental sequence of response text fragments.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, AgentError>> + Send>>;

/// Agent implementation that talks to a local Ollama HTTP endpoint.
#[derive(Clone)]
pub struct OllamaAgent {
    client: Client,
    base_url: String,
}

impl OllamaAgent {
    /// Creates a new agent for the given endpoint base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Creates an agent for the default local endpoint.
    pub fn local() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn build_request(
        model: &str,
        system_prompt: Option<&str>,
        history: &[ConversationMessage],
        stream: bool,
    ) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(system) = system_prompt {
            if !system.is_empty() {
                messages.push(WireMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                });
            }
        }
        messages.extend(history.iter().map(|msg| WireMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }));

        ChatRequest {
            model: model.to_string(),
            messages,
            stream,
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<reqwest::Response, AgentError> {
        let response = self
            .client
            .post(self.chat_url())
            .json(request)
            .send()
            .await
            .map_err(|err| {
                AgentError::request(
                    format!("Ollama request failed: {err}"),
                    err.is_connect() || err.is_timeout(),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Ollama error body".to_string());
            return Err(map_http_error(status, body));
        }

        Ok(response)
    }

    /// Sends the conversation and returns the complete response text.
    pub async fn chat(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        history: &[ConversationMessage],
    ) -> Result<String, AgentError> {
        let request = Self::build_request(model, system_prompt, history, false);
        let response = self.send(&request).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| AgentError::Parse(err.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(AgentError::request(error, false));
        }

        match parsed.message {
            Some(message) if !message.content.is_empty() => Ok(message.content),
            _ => Err(AgentError::EmptyResponse),
        }
    }

    /// Sends the conversation and returns the response as a token stream.
    ///
    /// Ollama streams newline-delimited JSON chunks; each item of the
    /// returned stream is the text fragment of one chunk. The stream ends
    /// after the chunk marked `done`.
    pub async fn chat_stream(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        history: &[ConversationMessage],
    ) -> Result<TokenStream, AgentError> {
        let request = Self::build_request(model, system_prompt, history, true);
        let response = self.send(&request).await?;
        let mut bytes = response.bytes_stream();

        let stream = try_stream! {
            // Buffered as bytes: a network chunk may end mid-character, so
            // only complete lines are decoded.
            let mut buffer: Vec<u8> = Vec::new();
            let mut done = false;

            while !done {
                let Some(chunk) = bytes.next().await else {
                    break;
                };
                let chunk = chunk.map_err(|err| {
                    AgentError::request(format!("Ollama stream failed: {err}"), false)
                })?;
                buffer.extend_from_slice(&chunk);

                while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                    let line = String::from_utf8_lossy(&buffer[..newline]).trim().to_string();
                    buffer.drain(..=newline);
                    if line.is_empty() {
                        continue;
                    }

                    let parsed = decode_chunk(&line)?;
                    if let Some(message) = parsed.message {
                        if !message.content.is_empty() {
                            yield message.content;
                        }
                    }
                    if parsed.done {
                        done = true;
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

#[derive(Serialize, Debug, PartialEq)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<WireMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ChatChunk {
    message: Option<WireMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

fn decode_chunk(line: &str) -> Result<ChatChunk, AgentError> {
    let mut parsed: ChatChunk =
        serde_json::from_str(line).map_err(|err| AgentError::Parse(err.to_string()))?;
    if let Some(error) = parsed.error.take() {
        return Err(AgentError::request(error, false));
    }
    Ok(parsed)
}

fn map_http_error(status: StatusCode, body: String) -> AgentError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
    }

    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|wrapper| wrapper.error)
        .unwrap_or(body);

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    AgentError::Http {
        status: status.as_u16(),
        message,
        is_retryable,
    }
}
