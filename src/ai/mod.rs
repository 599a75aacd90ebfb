//! LLM transport abstraction
//!
//! Prompt builders produce provider-neutral [`CompletionRequest`]s; an
//! [`LlmService`] sends them and returns the generated text. The Groq client
//! is the production implementation, [`MockLlmClient`] the test double.

pub mod groq;
pub mod mime;
pub mod mock;

pub use groq::GroqHttpClient;
pub use mock::MockLlmClient;

use crate::Result;
use async_trait::async_trait;

/// Which model family a request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Text,
    Vision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// `data:image/...;base64,...` URL.
    Image(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    pub fn has_image(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, ContentPart::Image(_)))
    }

    /// Concatenated text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Model selector, message sequence and decoding parameters for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub tier: ModelTier,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the provider for a JSON object response.
    pub json_mode: bool,
}

#[async_trait]
pub trait LlmService: Send + Sync {
    /// Send the request and return the generated text of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_helpers() {
        let message = Message::user_parts(vec![
            ContentPart::Text("Audit this".to_string()),
            ContentPart::Image("data:image/png;base64,AAAA".to_string()),
            ContentPart::Text("against the brand".to_string()),
        ]);
        assert!(message.has_image());
        assert_eq!(message.text(), "Audit this\nagainst the brand");
        assert!(!Message::system("rules").has_image());
        assert_eq!(Role::System.as_str(), "system");
    }
}
