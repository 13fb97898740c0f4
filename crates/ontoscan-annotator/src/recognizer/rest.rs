//! HTTP recognizer speaking the mgrep row format.

use std::time::Duration;

use async_trait::async_trait;
use ontoscan_common::{OntoscanError, Result};
use tracing::debug;

use super::Recognizer;
use crate::span::{normalize_text, parse_reply_body, RawSpan};

pub struct RestRecognizer {
    client: reqwest::Client,
    url: String,
}

impl RestRecognizer {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl Recognizer for RestRecognizer {
    async fn recognize(
        &self,
        text: &str,
        longest_only: bool,
        whole_word_only: bool,
    ) -> Result<Vec<RawSpan>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let normalized = normalize_text(text);
        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("text", normalized.as_str()),
                ("longest_only", if longest_only { "true" } else { "false" }),
                ("whole_word_only", if whole_word_only { "true" } else { "false" }),
            ])
            .send()
            .await
            .map_err(|e| OntoscanError::MatcherUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OntoscanError::MatcherUnavailable(format!(
                "recognizer at {} returned {}",
                self.url,
                resp.status()
            )));
        }

        let body = resp.text().await?;
        let spans = parse_reply_body(text, &body);
        debug!(spans = spans.len(), url = %self.url, "REST recognizer reply");
        Ok(spans)
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal HTTP responder: captures the request head, answers `body`.
    async fn fake_http(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/annotate", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });
        (url, handle)
    }

    #[tokio::test]
    async fn test_rest_recognizer_parses_rows() {
        let (url, server) = fake_http("7\t1\t12\n").await;
        let recognizer = RestRecognizer::new(url).unwrap();
        let spans = recognizer
            .recognize("Data Storage is needed", true, true)
            .await
            .unwrap();

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /annotate?text=DATA+STORAGE+IS+NEEDED&longest_only=true"));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Data Storage");
    }

    #[tokio::test]
    async fn test_rest_blank_text() {
        let recognizer = RestRecognizer::new("http://127.0.0.1:9/unused").unwrap();
        assert!(recognizer.recognize("  ", false, false).await.unwrap().is_empty());
    }
}
