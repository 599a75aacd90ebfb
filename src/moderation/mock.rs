use super::ModerationCheck;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
enum Behavior {
    Flag(Vec<String>),
    Fail,
}

/// [`ModerationCheck`] double that flags texts containing given terms.
#[derive(Clone)]
pub struct MockModerationCheck {
    behavior: Behavior,
    delay: Option<Duration>,
    call_count: Arc<Mutex<usize>>,
}

impl MockModerationCheck {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            delay: None,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Flags any text containing one of `terms` (case-insensitive).
    pub fn flagging(terms: &[&str]) -> Self {
        Self::with_behavior(Behavior::Flag(
            terms.iter().map(|t| t.to_lowercase()).collect(),
        ))
    }

    pub fn approving() -> Self {
        Self::flagging(&[])
    }

    /// Always errors, as an unreachable moderation service would.
    pub fn failing() -> Self {
        Self::with_behavior(Behavior::Fail)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl ModerationCheck for MockModerationCheck {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_unsafe(&self, text: &str) -> Result<bool> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Flag(terms) => {
                let lowered = text.to_lowercase();
                Ok(terms.iter().any(|term| lowered.contains(term.as_str())))
            }
            Behavior::Fail => Err(Error::RetryableTransport(
                "moderation service unavailable".to_string(),
            )),
        }
    }
}
