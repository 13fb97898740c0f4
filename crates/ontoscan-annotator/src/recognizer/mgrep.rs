//! Client for the mgrep span matcher.
//!
//! Wire protocol, one exchange per connection:
//! - request: `'A' + (Y|N longest) + (Y|N whole word) + TEXT + '\n'`
//! - reply: `fingerprint\tfrom\tto` rows, terminated by an empty line
//!
//! Connection order is primary, alternate, then one final retry of the
//! primary before giving up.

use std::time::Duration;

use async_trait::async_trait;
use ontoscan_common::settings::MatcherConfig;
use ontoscan_common::{OntoscanError, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::Recognizer;
use crate::span::{build_spans, normalize_text, parse_reply_line, RawSpan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MgrepEndpoint {
    pub host: String,
    pub port: u16,
}

impl MgrepEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl std::fmt::Display for MgrepEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct MgrepClient {
    primary: MgrepEndpoint,
    alternate: MgrepEndpoint,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl MgrepClient {
    pub fn new(primary: MgrepEndpoint, alternate: MgrepEndpoint) -> Self {
        Self {
            primary,
            alternate,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self::new(
            MgrepEndpoint::new(config.host.clone(), config.port),
            MgrepEndpoint::new(config.alt_host.clone(), config.alt_port),
        )
        .with_timeouts(
            Duration::from_millis(config.connect_timeout_ms),
            Duration::from_millis(config.read_timeout_ms),
        )
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// Annotate `text`, returning spans that slice the original text.
    pub async fn annotate(
        &self,
        text: &str,
        longest_only: bool,
        whole_word_only: bool,
    ) -> Result<Vec<RawSpan>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let request = request_line(&normalize_text(text), longest_only, whole_word_only);
        let stream = self.connect().await?;
        let rows = self.exchange(stream, &request).await?;

        debug!(rows = rows.len(), chars = text.chars().count(), "mgrep reply received");
        Ok(build_spans(text, rows))
    }

    async fn connect(&self) -> Result<TcpStream> {
        let attempts = [&self.primary, &self.alternate, &self.primary];
        let mut last_error = String::new();

        for endpoint in attempts {
            let connecting = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
            match timeout(self.connect_timeout, connecting).await {
                Ok(Ok(stream)) => {
                    debug!(endpoint = %endpoint, "Connected to span matcher");
                    return Ok(stream);
                }
                Ok(Err(e)) => {
                    warn!(endpoint = %endpoint, error = %e, "Span matcher connection failed");
                    last_error = e.to_string();
                }
                Err(_) => {
                    warn!(endpoint = %endpoint, "Span matcher connection timed out");
                    last_error = format!("connect to {endpoint} timed out");
                }
            }
        }

        Err(OntoscanError::MatcherUnavailable(format!(
            "could not reach {} or {}: {}",
            self.primary, self.alternate, last_error
        )))
    }

    async fn exchange(&self, stream: TcpStream, request: &str) -> Result<Vec<(u32, usize, usize)>> {
        let (read_half, mut write_half) = stream.into_split();
        write_half.write_all(request.as_bytes()).await?;
        write_half.flush().await?;

        let mut reader = BufReader::new(read_half);
        let mut rows = Vec::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = timeout(self.read_timeout, reader.read_until(b'\n', &mut buf))
                .await
                .map_err(|_| {
                    OntoscanError::Timeout(format!(
                        "no span matcher reply within {:?}",
                        self.read_timeout
                    ))
                })??;
            if read == 0 {
                return Err(OntoscanError::Protocol(
                    "connection closed before end of reply".into(),
                ));
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                break;
            }
            if let Some(row) = parse_reply_line(line) {
                rows.push(row);
            }
        }

        if let Err(e) = write_half.shutdown().await {
            debug!(error = %e, "Span matcher socket shutdown failed");
        }
        Ok(rows)
    }
}

#[async_trait]
impl Recognizer for MgrepClient {
    async fn recognize(
        &self,
        text: &str,
        longest_only: bool,
        whole_word_only: bool,
    ) -> Result<Vec<RawSpan>> {
        self.annotate(text, longest_only, whole_word_only).await
    }

    fn name(&self) -> &'static str {
        "mgrep"
    }
}

/// Build the request line for already-normalized text.
pub fn request_line(normalized: &str, longest_only: bool, whole_word_only: bool) -> String {
    let flag = |b: bool| if b { 'Y' } else { 'N' };
    format!("A{}{}{}\n", flag(longest_only), flag(whole_word_only), normalized)
}
