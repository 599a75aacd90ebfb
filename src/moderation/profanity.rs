use super::ModerationCheck;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;

const DEFAULT_URL: &str = "https://www.purgomalum.com/service/containsprofanity";
/// Longest text sent in one query string; longer texts are checked in chunks.
const MAX_QUERY_CHARS: usize = 2000;

/// Remote profanity service answering `true` / `false` in plain text.
///
/// Non-200 responses and unexpected bodies count as clean; only transport
/// failures surface as errors so the moderator can fall back.
pub struct ProfanityServiceCheck {
    client: Client,
    url: String,
}

impl ProfanityServiceCheck {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: DEFAULT_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: String) -> Self {
        self.url = url;
        self
    }
}

#[async_trait]
impl ModerationCheck for ProfanityServiceCheck {
    fn name(&self) -> &'static str {
        "profanity-service"
    }

    async fn is_unsafe(&self, text: &str) -> Result<bool> {
        let chars: Vec<char> = text.chars().collect();
        let chunks: Vec<String> = chars
            .chunks(MAX_QUERY_CHARS)
            .map(|chunk| chunk.iter().collect())
            .collect();
        if chunks.len() > 1 {
            tracing::debug!(
                "Checking {} characters in {} profanity queries",
                chars.len(),
                chunks.len()
            );
        }

        for chunk in &chunks {
            if self.check_chunk(chunk).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl ProfanityServiceCheck {
    async fn check_chunk(&self, chunk: &str) -> Result<bool> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("text", chunk)])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(
                "Profanity service returned status {}; treating text as clean",
                response.status()
            );
            return Ok(false);
        }

        let body = response.text().await?;
        Ok(body.trim().eq_ignore_ascii_case("true"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_check(server: &MockServer) -> ProfanityServiceCheck {
        ProfanityServiceCheck::new(Client::new())
            .with_url(format!("{}/service/containsprofanity", server.uri()))
    }

    #[tokio::test]
    async fn test_true_body_flags_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/service/containsprofanity"))
            .and(query_param("text", "some rude words"))
            .respond_with(ResponseTemplate::new(200).set_body_string("true"))
            .mount(&server)
            .await;

        assert!(make_check(&server).is_unsafe("some rude words").await.unwrap());
    }

    #[tokio::test]
    async fn test_false_body_is_clean() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("false"))
            .mount(&server)
            .await;

        assert!(!make_check(&server).is_unsafe("hello").await.unwrap());
    }

    #[tokio::test]
    async fn test_long_text_is_checked_in_chunks() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(|request: &wiremock::Request| {
                request
                    .url
                    .query_pairs()
                    .any(|(key, value)| key == "text" && value.contains("rude"))
            })
            .respond_with(ResponseTemplate::new(200).set_body_string("true"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("false"))
            .mount(&server)
            .await;

        let text = format!("{} rude ending", "a".repeat(MAX_QUERY_CHARS * 2));
        assert!(make_check(&server).is_unsafe(&text).await.unwrap());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
        for request in &requests {
            let (_, value) = request
                .url
                .query_pairs()
                .find(|(key, _)| key == "text")
                .unwrap();
            assert!(value.chars().count() <= MAX_QUERY_CHARS);
        }
    }

    #[tokio::test]
    async fn test_non_200_is_clean() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        assert!(!make_check(&server).is_unsafe("hello").await.unwrap());
    }
}
