//! Content moderation for inbound user text and outbound model text.
//!
//! A [`ContentModerator`] runs a primary [`ModerationCheck`] under a short
//! timeout and falls back to a secondary check when the primary is
//! unavailable. When neither produces a verdict the content is approved:
//! moderation outages must not block legitimate use.

pub mod classifier;
pub mod mock;
pub mod profanity;

pub use classifier::LlmClassifierCheck;
pub use mock::MockModerationCheck;
pub use profanity::ProfanityServiceCheck;

use crate::{Error, Result};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

#[async_trait]
pub trait ModerationCheck: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(true)` when the text is judged unsafe.
    async fn is_unsafe(&self, text: &str) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationVerdict {
    Approved,
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Output,
}

impl Stage {
    fn as_str(&self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Output => "output",
        }
    }
}

pub struct ContentModerator {
    primary: Box<dyn ModerationCheck>,
    fallback: Option<Box<dyn ModerationCheck>>,
    timeout: Duration,
}

impl ContentModerator {
    pub fn new(
        primary: Box<dyn ModerationCheck>,
        fallback: Option<Box<dyn ModerationCheck>>,
        timeout: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            timeout,
        }
    }

    async fn run_check(&self, check: &dyn ModerationCheck, text: &str) -> Option<bool> {
        match tokio::time::timeout(self.timeout, check.is_unsafe(text)).await {
            Ok(Ok(flagged)) => Some(flagged),
            Ok(Err(e)) => {
                tracing::warn!("Moderation check '{}' failed: {}", check.name(), e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Moderation check '{}' timed out after {:?}",
                    check.name(),
                    self.timeout
                );
                None
            }
        }
    }

    pub async fn verdict(&self, text: &str, stage: Stage) -> ModerationVerdict {
        if text.trim().is_empty() {
            return ModerationVerdict::Approved;
        }

        let mut outcome = self
            .run_check(self.primary.as_ref(), text)
            .await
            .map(|flagged| (flagged, self.primary.name()));
        if outcome.is_none() {
            if let Some(fallback) = &self.fallback {
                outcome = self
                    .run_check(fallback.as_ref(), text)
                    .await
                    .map(|flagged| (flagged, fallback.name()));
            }
        }

        match outcome {
            Some((true, check)) => {
                tracing::info!("Moderation rejected {} ({})", stage.as_str(), check);
                ModerationVerdict::Rejected(format!("{} flagged by {}", stage.as_str(), check))
            }
            Some((false, _)) => ModerationVerdict::Approved,
            None => {
                tracing::warn!(
                    "No moderation verdict for {}; allowing content",
                    stage.as_str()
                );
                ModerationVerdict::Approved
            }
        }
    }

    async fn check(&self, text: &str, stage: Stage) -> Result<()> {
        match self.verdict(text, stage).await {
            ModerationVerdict::Approved => Ok(()),
            ModerationVerdict::Rejected(reason) => Err(Error::ContentRejected(reason)),
        }
    }

    pub async fn check_input(&self, text: &str) -> Result<()> {
        self.check(text, Stage::Input).await
    }

    pub async fn check_output(&self, text: &str) -> Result<()> {
        self.check(text, Stage::Output).await
    }

    /// Moderate `input`, run `call`, then moderate the text it produced.
    ///
    /// `call` yields the parsed value alongside the raw model text; only the
    /// value is returned once both checks pass.
    pub async fn moderated<T, F>(&self, input: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<(T, String)>>,
    {
        self.check_input(input).await?;
        let (value, output) = call.await?;
        self.check_output(&output).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moderator(primary: MockModerationCheck, fallback: MockModerationCheck) -> ContentModerator {
        ContentModerator::new(
            Box::new(primary),
            Some(Box::new(fallback)),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_primary_verdict_is_used() {
        let primary = MockModerationCheck::flagging(&["hate"]);
        let fallback = MockModerationCheck::approving();
        let fallback_probe = fallback.clone();
        let moderator = moderator(primary, fallback);

        assert!(matches!(
            moderator.check_input("I hate this").await,
            Err(Error::ContentRejected(_))
        ));
        assert!(moderator.check_input("I like this").await.is_ok());
        assert_eq!(fallback_probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_runs_when_primary_fails() {
        let moderator = moderator(
            MockModerationCheck::failing(),
            MockModerationCheck::flagging(&["slur"]),
        );
        let verdict = moderator.verdict("a slur", Stage::Output).await;
        assert!(matches!(verdict, ModerationVerdict::Rejected(reason) if reason.contains("output")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_open_when_both_checks_time_out() {
        let moderator = moderator(
            MockModerationCheck::approving().with_delay(Duration::from_secs(60)),
            MockModerationCheck::flagging(&["anything"]).with_delay(Duration::from_secs(60)),
        );
        assert!(moderator.check_input("anything goes").await.is_ok());
    }

    #[tokio::test]
    async fn test_fails_open_without_fallback() {
        let moderator = ContentModerator::new(
            Box::new(MockModerationCheck::failing()),
            None,
            Duration::from_secs(5),
        );
        assert_eq!(
            moderator.verdict("text", Stage::Input).await,
            ModerationVerdict::Approved
        );
    }

    #[tokio::test]
    async fn test_empty_text_skips_checks() {
        let primary = MockModerationCheck::flagging(&[""]);
        let probe = primary.clone();
        let moderator = moderator(primary, MockModerationCheck::approving());

        assert!(moderator.check_input("   ").await.is_ok());
        assert_eq!(probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_moderated_checks_both_sides() {
        let moderator = moderator(
            MockModerationCheck::flagging(&["forbidden"]),
            MockModerationCheck::approving(),
        );

        let ok = moderator
            .moderated("clean input", async { Ok((1, "clean output".to_string())) })
            .await;
        assert_eq!(ok.unwrap(), 1);

        let rejected_output = moderator
            .moderated("clean input", async { Ok((1, "forbidden output".to_string())) })
            .await;
        assert!(matches!(rejected_output, Err(Error::ContentRejected(_))));
    }

    #[tokio::test]
    async fn test_moderated_skips_call_when_input_rejected() {
        let moderator = moderator(
            MockModerationCheck::flagging(&["forbidden"]),
            MockModerationCheck::approving(),
        );
        let mut called = false;

        let result: Result<()> = moderator
            .moderated("forbidden input", async {
                called = true;
                Ok(((), String::new()))
            })
            .await;

        assert!(matches!(result, Err(Error::ContentRejected(_))));
        assert!(!called);
    }
}
