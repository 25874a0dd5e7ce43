//! Mirror page source - fetches handle pages with ordered failover

use async_trait::async_trait;
use poster_watch_domain::{FetchError, Handle, PageSource};
use reqwest::Client;
use std::time::Duration;

/// Bound on a single mirror attempt
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);
/// Pause between consecutive mirror attempts
pub const DEFAULT_ATTEMPT_PACE: Duration = Duration::from_secs(1);

/// Page source that walks a fixed list of mirrors in order and returns the
/// first successful document. A slow or refusing mirror costs at most the
/// attempt timeout before the next one is tried.
pub struct MirrorClient {
    client: Client,
    mirrors: Vec<String>,
    attempt_pace: Duration,
}

impl MirrorClient {
    pub fn new(mirrors: Vec<String>) -> Self {
        Self::with_timing(mirrors, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_ATTEMPT_PACE)
    }

    pub fn with_timing(
        mirrors: Vec<String>,
        attempt_timeout: Duration,
        attempt_pace: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(attempt_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            mirrors,
            attempt_pace,
        }
    }

    async fn try_mirror(&self, mirror: &str, handle: &Handle) -> Option<String> {
        let url = format!("{}/{}", mirror.trim_end_matches('/'), handle);
        tracing::debug!(url = %url, "Fetching page");

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => Some(body),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Failed to read mirror response");
                    None
                }
            },
            Ok(response) => {
                tracing::warn!(url = %url, status = %response.status(), "Mirror refused request");
                None
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Mirror unreachable");
                None
            }
        }
    }
}

#[async_trait]
impl PageSource for MirrorClient {
    async fn fetch_page(&self, handle: &Handle) -> Result<String, FetchError> {
        for (attempt, mirror) in self.mirrors.iter().enumerate() {
            if attempt > 0 && !self.attempt_pace.is_zero() {
                tokio::time::sleep(self.attempt_pace).await;
            }

            if let Some(body) = self.try_mirror(mirror, handle).await {
                return Ok(body);
            }
        }

        Err(FetchError::NotFound {
            handle: handle.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn handle(raw: &str) -> Handle {
        Handle::parse(raw).unwrap()
    }

    fn fast_client(mirrors: Vec<String>) -> MirrorClient {
        MirrorClient::with_timing(mirrors, Duration::from_millis(200), Duration::ZERO)
    }

    #[tokio::test]
    async fn test_first_healthy_mirror_wins() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/solana"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>timeline</html>"))
            .mount(&mock_server)
            .await;

        let client = fast_client(vec![mock_server.uri()]);
        let body = client.fetch_page(&handle("solana")).await.unwrap();

        assert_eq!(body, "<html>timeline</html>");
    }

    #[tokio::test]
    async fn test_failing_mirror_falls_over_to_next() {
        let broken = MockServer::start().await;
        let healthy = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/solana"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&broken)
            .await;

        Mock::given(method("GET"))
            .and(path("/solana"))
            .respond_with(ResponseTemplate::new(200).set_body_string("from backup"))
            .mount(&healthy)
            .await;

        let client = fast_client(vec![broken.uri(), healthy.uri()]);
        let body = client.fetch_page(&handle("solana")).await.unwrap();

        assert_eq!(body, "from backup");
    }

    #[tokio::test]
    async fn test_slow_mirror_times_out_and_falls_over() {
        let slow = MockServer::start().await;
        let healthy = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/solana"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("too late")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&slow)
            .await;

        Mock::given(method("GET"))
            .and(path("/solana"))
            .respond_with(ResponseTemplate::new(200).set_body_string("in time"))
            .mount(&healthy)
            .await;

        let client = fast_client(vec![slow.uri(), healthy.uri()]);
        let body = client.fetch_page(&handle("solana")).await.unwrap();

        assert_eq!(body, "in time");
    }

    #[tokio::test]
    async fn test_all_mirrors_failing_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = fast_client(vec![mock_server.uri()]);
        let result = client.fetch_page(&handle("ghost")).await;

        assert!(matches!(result, Err(FetchError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_no_mirrors_configured_is_unavailable() {
        let client = fast_client(vec![]);
        let result = client.fetch_page(&handle("solana")).await;

        assert!(matches!(result, Err(FetchError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_mirror_urls_tolerate_trailing_slash() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/solana"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let client = fast_client(vec![format!("{}/", mock_server.uri())]);
        let body = client.fetch_page(&handle("solana")).await.unwrap();

        assert_eq!(body, "ok");
    }
}
