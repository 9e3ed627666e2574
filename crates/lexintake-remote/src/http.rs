//! HTTP client for the completion endpoint.

use std::time::Duration;

use async_trait::async_trait;
use lexintake_ai::{AnalyzerError, TextAnalyzer};
use lexintake_core::AnalysisResult;
pub use lexintake_core::config::backoff_delay;
use lexintake_core::config::RemoteConfig;
use reqwest::StatusCode;
use tracing::{info, warn};

use crate::{GenerateRequest, normalize_response, truncate_body};

/// Remote analyzer calling an LLM completion endpoint.
pub struct RemoteAnalyzer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_output_tokens: u32,
    request_timeout: Duration,
    retries: u32,
    max_backoff: Duration,
}

impl RemoteAnalyzer {
    pub const NAME: &'static str = "remote";

    /// Build from configuration. Fails with [`AnalyzerError::Unavailable`]
    /// when no API key is configured.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, AnalyzerError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| AnalyzerError::Unavailable("no API key configured".to_string()))?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AnalyzerError::Unavailable(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            request_timeout: config.request_timeout,
            retries: config.retries,
            max_backoff: config.max_backoff,
        })
    }

    /// POST the request, retrying transport failures only.
    async fn send_with_retry(
        &self,
        payload: &GenerateRequest<'_>,
    ) -> Result<reqwest::Response, AnalyzerError> {
        let mut attempt = 0;
        loop {
            let result = self
                .client
                .post(&self.endpoint)
                .header("authorization", &self.api_key)
                .json(payload)
                .send()
                .await;

            match result {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < self.retries => {
                    let delay = backoff_delay(attempt, self.max_backoff);
                    warn!(
                        attempt = attempt + 1,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "remote analyzer request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_timeout() => {
                    return Err(AnalyzerError::Timeout(self.request_timeout));
                }
                Err(e) => return Err(AnalyzerError::Transport(e.to_string())),
            }
        }
    }
}

#[async_trait]
impl TextAnalyzer for RemoteAnalyzer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalyzerError> {
        let payload = GenerateRequest::new(&self.model, text, self.max_output_tokens);

        info!(endpoint = %self.endpoint, chars = text.len(), "requesting remote analysis");
        let resp = self.send_with_retry(&payload).await?;
        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalyzerError::Upstream {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| AnalyzerError::Transport(e.to_string()))?;
        let result = normalize_response(&body)?;
        info!(category = %result.category, urgency = %result.urgency, "remote analysis complete");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexintake_core::Level;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::{TcpListener, TcpStream};

    /// Read one HTTP request (head plus `content-length` body) off the socket.
    async fn read_request(sock: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = sock.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let len = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + len {
                    return;
                }
            }
        }
    }

    async fn respond(sock: &mut TcpStream, status: &str, body: &str) {
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        sock.write_all(response.as_bytes()).await.unwrap();
        sock.shutdown().await.ok();
    }

    /// One-shot loopback server answering a single request with `status` and `body`.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            read_request(&mut sock).await;
            respond(&mut sock, status, body).await;
        });
        format!("http://{addr}/generate")
    }

    /// Loopback server counting connections. With `reply` each request is
    /// answered; without it the connection is dropped unanswered.
    async fn serve_counting(
        reply: Option<(&'static str, &'static str)>,
    ) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut sock).await;
                match reply {
                    Some((status, body)) => respond(&mut sock, status, body).await,
                    None => drop(sock),
                }
            }
        });
        (format!("http://{addr}/generate"), hits)
    }

    fn config(endpoint: String) -> RemoteConfig {
        RemoteConfig {
            api_key: Some("test-key".into()),
            endpoint,
            retries: 0,
            ..RemoteConfig::default()
        }
    }

    #[test]
    fn missing_key_is_unavailable() {
        let cfg = RemoteConfig {
            api_key: Some("   ".into()),
            ..RemoteConfig::default()
        };
        let err = RemoteAnalyzer::from_config(&cfg).err().unwrap();
        assert!(matches!(err, AnalyzerError::Unavailable(_)));
    }

    #[tokio::test]
    async fn analyzes_wrapped_response() {
        let endpoint = serve_once(
            "200 OK",
            r#"{"response": "{\"category\": \"Car Accident\", \"urgency\": \"high\", \"confidence\": 0.9}"}"#,
        )
        .await;
        let analyzer = RemoteAnalyzer::from_config(&config(endpoint)).unwrap();
        let r = analyzer.analyze("rear-ended on the highway").await.unwrap();
        assert_eq!(r.category, "Car Accident");
        assert_eq!(r.urgency, Level::High);
        assert_eq!(r.confidence, Some(0.9));
    }

    #[tokio::test]
    async fn non_ok_status_is_upstream_error() {
        let endpoint = serve_once("500 Internal Server Error", r#"{"error": "overloaded"}"#).await;
        let analyzer = RemoteAnalyzer::from_config(&config(endpoint)).unwrap();
        let err = analyzer.analyze("text").await.unwrap_err();
        match err {
            AnalyzerError::Upstream { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("overloaded"));
            }
            other => panic!("expected upstream error, got {other}"),
        }
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let addr = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };
        let endpoint = format!("http://{addr}/generate");
        let analyzer = RemoteAnalyzer::from_config(&config(endpoint)).unwrap();
        let err = analyzer.analyze("text").await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn transport_failures_are_retried_then_reported() {
        let (endpoint, hits) = serve_counting(None).await;
        let cfg = RemoteConfig {
            retries: 2,
            max_backoff: Duration::from_millis(10),
            ..config(endpoint)
        };
        let analyzer = RemoteAnalyzer::from_config(&cfg).unwrap();
        let err = analyzer.analyze("text").await.unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn error_status_is_not_retried() {
        let (endpoint, hits) =
            serve_counting(Some(("500 Internal Server Error", r#"{"error": "boom"}"#))).await;
        let cfg = RemoteConfig {
            retries: 2,
            max_backoff: Duration::from_millis(10),
            ..config(endpoint)
        };
        let analyzer = RemoteAnalyzer::from_config(&cfg).unwrap();
        let err = analyzer.analyze("text").await.unwrap_err();
        assert_eq!(err.kind(), "upstream");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
