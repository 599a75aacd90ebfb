use super::{CompletionRequest, LlmService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned outcome for one [`MockLlmClient`] call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Retryable(String),
    Terminal(String),
}

/// Scripted [`LlmService`]: replies are served in order and the last one
/// repeats once the script is exhausted.
#[derive(Clone)]
pub struct MockLlmClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            delay: None,
        }
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.with_reply(MockReply::Text(response.into()))
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    /// Sleep before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let reply = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            self.requests.lock().unwrap().push(request.clone());

            let replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                MockReply::Text("{}".to_string())
            } else {
                replies[(*count - 1).min(replies.len() - 1)].clone()
            }
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Retryable(message) => Err(Error::RetryableTransport(message)),
            MockReply::Terminal(message) => Err(Error::TerminalTransport(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{Message, ModelTier};

    fn request() -> CompletionRequest {
        CompletionRequest {
            tier: ModelTier::Text,
            messages: vec![Message::user("hi")],
            temperature: 0.0,
            max_tokens: 10,
            json_mode: false,
        }
    }

    #[tokio::test]
    async fn test_replies_in_order_then_repeat_last() {
        let client = MockLlmClient::new()
            .with_reply(MockReply::Retryable("429".to_string()))
            .with_response("ok");

        assert!(client.complete(&request()).await.is_err());
        assert_eq!(client.complete(&request()).await.unwrap(), "ok");
        assert_eq!(client.complete(&request()).await.unwrap(), "ok");
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_records_requests() {
        let client = MockLlmClient::new();
        client.complete(&request()).await.unwrap();
        assert_eq!(client.get_requests(), vec![request()]);
    }
}
