//! OpenAI chat-completions client.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{Prompt, TextGenerator};
use crate::config::{AiConfig, ENV_AI_KEY};
use crate::error::{Error, Result};

const SERVICE: &str = "OpenAI";

/// Error bodies are cut to this many characters.
const MAX_ERROR_BODY: usize = 500;

/// Blocking client for `POST {api_url}/chat/completions`.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    endpoint: String,
    model: String,
    client: Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiClient {
    /// Create a client from the text service settings.
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(Error::MissingApiKey(ENV_AI_KEY))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            endpoint: format!("{}/chat/completions", config.api_url.trim_end_matches('/')),
            model: config.model.clone(),
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl TextGenerator for OpenAiClient {
    fn complete(&self, prompt: &Prompt) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt.text,
            }],
            temperature: prompt.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(Error::Service {
                service: SERVICE,
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("{} reply is not JSON: {}", SERVICE, e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::MalformedResponse(format!("{} reply has no content", SERVICE)))
    }
}
