use super::ModerationCheck;
use crate::ai::LlmService;
use crate::{prompts, validate, Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Asks the text model to classify content as safe or unsafe.
pub struct LlmClassifierCheck {
    llm: Arc<dyn LlmService>,
}

impl LlmClassifierCheck {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ModerationCheck for LlmClassifierCheck {
    fn name(&self) -> &'static str {
        "llm-classifier"
    }

    async fn is_unsafe(&self, text: &str) -> Result<bool> {
        let request = prompts::moderation_classifier(text);
        let raw = self.llm.complete(&request).await?;
        let value = validate::parse_json(&raw)?;

        value
            .get("unsafe")
            .and_then(|flag| flag.as_bool())
            .ok_or_else(|| Error::Validation("Classifier response missing 'unsafe'".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockLlmClient, ModelTier};

    #[tokio::test]
    async fn test_reads_unsafe_flag() {
        let llm = MockLlmClient::new().with_response("```json\n{\"unsafe\": true}\n```");
        let check = LlmClassifierCheck::new(Arc::new(llm.clone()));

        assert!(check.is_unsafe("something nasty").await.unwrap());
        let requests = llm.get_requests();
        assert_eq!(requests[0].tier, ModelTier::Text);
        assert!(requests[0].messages[1].text().contains("something nasty"));
    }

    #[tokio::test]
    async fn test_missing_flag_is_an_error() {
        let llm = MockLlmClient::new().with_response("{\"verdict\": \"ok\"}");
        let check = LlmClassifierCheck::new(Arc::new(llm));

        assert!(check.is_unsafe("hello").await.is_err());
    }
}
