use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatMessageContent, ImageUrl,
    MessagePart, ResponseFormat,
};
use crate::ai::{CompletionRequest, ContentPart, LlmService, Message, ModelTier};
use crate::models::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Groq chat-completions client; picks the text or vision model per request.
pub struct GroqHttpClient {
    client: Client,
    api_key: String,
    text_model: String,
    vision_model: String,
    base_url: String,
    timeout: Duration,
}

impl GroqHttpClient {
    pub fn new(api_key: String, text_model: String, vision_model: String) -> Self {
        Self::new_with_client(api_key, text_model, vision_model, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        text_model: String,
        vision_model: String,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            text_model,
            vision_model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(api_key: String, config: &Config, client: Client) -> Self {
        Self::new_with_client(
            api_key,
            config.text_model.clone(),
            config.vision_model.clone(),
            client,
        )
        .with_base_url(config.groq_base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Text => &self.text_model,
            ModelTier::Vision => &self.vision_model,
        }
    }

    fn to_wire(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model_for(request.tier).to_string(),
            messages: request.messages.iter().map(wire_message).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then(ResponseFormat::json_object),
        }
    }

    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        tracing::debug!("Sending chat completion request to Groq (model {})", request.model);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Groq: {}", e);
                classify_send_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Groq API error (status {}): {}", status, error_text);
            return Err(classify_status(status, &error_text));
        }

        let body = response.text().await.map_err(classify_send_error)?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Groq response: {}\nBody: {}", e, body);
            Error::Validation(format!("Failed to parse Groq response: {}", e))
        })
    }
}

fn wire_message(message: &Message) -> ChatMessage {
    let content = match message.parts.as_slice() {
        [ContentPart::Text(text)] => ChatMessageContent::Text(text.clone()),
        parts => ChatMessageContent::Parts(
            parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text(text) => MessagePart {
                        part_type: "text".to_string(),
                        text: Some(text.clone()),
                        image_url: None,
                    },
                    ContentPart::Image(url) => MessagePart {
                        part_type: "image_url".to_string(),
                        text: None,
                        image_url: Some(ImageUrl { url: url.clone() }),
                    },
                })
                .collect(),
        ),
    };

    ChatMessage {
        role: message.role.as_str().to_string(),
        content: Some(content),
    }
}

/// Map a non-success HTTP status onto the retryable/terminal split.
pub fn classify_status(status: StatusCode, body: &str) -> Error {
    let message = format!("Groq API error (status {}): {}", status, body);
    if status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
    {
        Error::RetryableTransport(message)
    } else {
        Error::TerminalTransport(message)
    }
}

fn classify_send_error(error: reqwest::Error) -> Error {
    if error.is_timeout() || error.is_connect() || error.is_request() || error.is_body() {
        Error::RetryableTransport(error.to_string())
    } else {
        Error::TerminalTransport(error.to_string())
    }
}

#[async_trait]
impl LlmService for GroqHttpClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let wire = self.to_wire(request);
        let response = self.chat_completion(&wire).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| match choice.message.content {
                Some(ChatMessageContent::Text(text)) if !text.trim().is_empty() => Some(text),
                _ => None,
            })
            .ok_or_else(|| Error::Validation("No content in Groq response".to_string()))
    }
}
