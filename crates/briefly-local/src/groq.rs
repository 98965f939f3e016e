//! Groq chat-completions client (OpenAI-compatible wire format).

use briefly_core::{Error, Result, TextGenerator};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemma2-9b-it";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Environment-sourced LLM configuration, read once up front and passed in.
///
/// A missing credential is a precondition failure: callers check this before
/// doing any extraction work.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_ms: u64,
}

impl GroqConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env("GROQ_API_KEY")
            .ok_or_else(|| Error::MissingCredential("GROQ_API_KEY is not set".to_string()))?;
        Ok(Self {
            api_key,
            model: env("BRIEFLY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: env("GROQ_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_ms: env("BRIEFLY_LLM_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        })
    }

    /// Config presence without secret values, for `doctor`.
    pub fn describe() -> serde_json::Value {
        serde_json::json!({
            "api_key_present": env("GROQ_API_KEY").is_some(),
            "model": env("BRIEFLY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            "base_url": env("GROQ_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GroqClient {
    client: reqwest::Client,
    cfg: GroqConfig,
}

impl GroqClient {
    pub fn new(client: reqwest::Client, cfg: GroqConfig) -> Self {
        Self { client, cfg }
    }

    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    fn endpoint_chat_completions(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.cfg.base_url.trim_end_matches('/')
        )
    }

    pub async fn chat(&self, user: &str) -> Result<String> {
        let req = ChatCompletionsRequest {
            model: self.cfg.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            stream: Some(false),
        };

        let resp = self
            .client
            .post(self.endpoint_chat_completions())
            .timeout(std::time::Duration::from_millis(self.cfg.timeout_ms))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.cfg.api_key),
            )
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Summary(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Summary(format!(
                "groq chat.completions HTTP {status}"
            )));
        }

        let parsed: ChatCompletionsResponse = resp
            .json()
            .await
            .map_err(|e| Error::Summary(e.to_string()))?;
        Ok(parsed
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl TextGenerator for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(prompt).await
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    content: String,
}
