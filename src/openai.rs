//! Chat-completion client used as the translation backend.

use crate::i18n::language_name;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a professional translator for user interface strings. \
Translate the text preserving its meaning, tone and style. \
Keep placeholders such as {name} or {{count}} exactly as they are, untranslated. \
Keep HTML tags, URLs and e-mail addresses unchanged. \
Return only the translation, without quotes, notes or explanations.";

/// A single string to translate, with optional surrounding context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPrompt {
    pub source_locale: String,
    pub target_locale: String,
    pub text: String,
    pub context: Option<String>,
}

impl TranslationPrompt {
    pub fn system_message(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    pub fn user_message(&self) -> String {
        let mut message = format!(
            "Translate the following text from {} to {}:\n\n{}",
            language_name(&self.source_locale),
            language_name(&self.target_locale),
            self.text
        );
        if let Some(context) = self.context.as_deref().filter(|c| !c.is_empty()) {
            message.push_str("\n\nContext (sibling strings of the same UI section, JSON):\n");
            message.push_str(context);
        }
        message
    }
}

/// Something that can turn a prompt into a completion.
///
/// `Ok(None)` means the service answered with no usable text.
pub trait TranslationBackend: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a TranslationPrompt) -> BoxFuture<'a, Result<Option<String>>>;
}

/// OpenAI Chat Completion request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<&'static str>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

/// Connection settings for [`OpenAiBackend`].
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

pub struct OpenAiBackend {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiBackend {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn build_request<'a>(&'a self, prompt: &TranslationPrompt) -> ChatRequest<'a> {
        // Reasoning models don't support temperature and need room to think
        let is_reasoning = is_reasoning_model(&self.settings.model);
        ChatRequest {
            model: &self.settings.model,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: Some(prompt.system_message().to_string()),
                },
                Message {
                    role: "user".to_string(),
                    content: Some(prompt.user_message()),
                },
            ],
            max_completion_tokens: if is_reasoning { Some(4000) } else { None },
            temperature: if is_reasoning { None } else { Some(0.3) },
            reasoning_effort: if is_reasoning { Some("low") } else { None },
        }
    }

    async fn send(&self, prompt: &TranslationPrompt) -> Result<Option<String>> {
        let request = self.build_request(prompt);
        debug!(
            "Requesting {} translation from {}",
            prompt.target_locale, self.settings.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send translation request to OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            anyhow::bail!("OpenAI API error ({}): {}", status, body);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        Ok(chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

impl TranslationBackend for OpenAiBackend {
    fn complete<'a>(&'a self, prompt: &'a TranslationPrompt) -> BoxFuture<'a, Result<Option<String>>> {
        Box::pin(self.send(prompt))
    }
}
