//! reqwest-backed page fetcher.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{FetchError, FetcherConfig, PageFetcher};

/// Single-attempt HTTP GET over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the configured User-Agent.
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        let transient = |reason: String| FetchError::Transient {
            url: url.to_string(),
            attempts: 1,
            reason,
        };

        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    transient(format!("timed out after {:?}", timeout))
                } else {
                    transient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Permanent {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| transient(e.to_string()))?;
        debug!(url = url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchPolicy, Fetcher};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accepts connections, counts them, and never answers.
    async fn silent_server() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&accepted);

        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(socket);
            }
        });

        (format!("http://{}/page/1/", addr), accepted)
    }

    /// Answers every request with the given status line and body.
    async fn canned_server(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{}/doc.html", addr)
    }

    fn fetcher() -> Fetcher {
        let http = HttpFetcher::new(&FetcherConfig::default()).unwrap();
        Fetcher::new(Arc::new(http), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_timeout_exhausts_exactly_max_attempts() {
        let (url, accepted) = silent_server().await;
        let policy = FetchPolicy {
            timeout: Duration::from_millis(100),
            max_attempts: 3,
        };

        let result = fetcher().fetch(&url, policy).await;

        match result {
            Err(FetchError::Transient { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected transient error, got {:?}", other),
        }
        assert_eq!(accepted.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_http_error_is_permanent_and_not_retried() {
        let url = canned_server("404 Not Found", "gone").await;
        let policy = FetchPolicy {
            timeout: Duration::from_secs(5),
            max_attempts: 3,
        };

        let result = fetcher().fetch(&url, policy).await;
        assert!(matches!(result, Err(FetchError::Permanent { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let url = canned_server("200 OK", "<html>ok</html>").await;
        let policy = FetchPolicy {
            timeout: Duration::from_secs(5),
            max_attempts: 3,
        };

        let body = tokio_test::assert_ok!(fetcher().fetch(&url, policy).await);
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_invalid_url_is_permanent() {
        let http = HttpFetcher::new(&FetcherConfig::default()).unwrap();
        let result = http.get("not a url", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
