//! Minimal client for the story-generation backend.
//!
//! This crate provides a focused client for the backend's three generation
//! endpoints:
//! - `POST /generate_outline` — outline from a theme
//! - `POST /generate_storyline` — storyline from an outline
//! - `POST /generate_story` — full story from outline + storyline
//!
//! The client performs no retries. A transport error, timeout, non-2xx
//! status, or a 2xx body missing the expected field all surface as
//! [`Error`]; the caller decides what to do with a failed generation.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when calling the generation backend.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Response missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Story-generation backend client.
#[derive(Debug, Clone)]
pub struct StoryGen {
    client: reqwest::Client,
    base_url: String,
}

impl StoryGen {
    /// Create a new client for the backend at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL the client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate a story outline from a theme.
    pub async fn generate_outline(&self, theme: &str) -> Result<String, Error> {
        let response: OutlineResponse = self
            .post("generate_outline", &OutlineRequest { theme })
            .await?;
        response.outline.ok_or(Error::MissingField("outline"))
    }

    /// Generate a storyline from an outline.
    pub async fn generate_storyline(&self, outline: &str) -> Result<String, Error> {
        let response: StorylineResponse = self
            .post("generate_storyline", &StorylineRequest { outline })
            .await?;
        response.storyline.ok_or(Error::MissingField("storyline"))
    }

    /// Generate the full story text from an outline and storyline.
    pub async fn generate_story(&self, outline: &str, storyline: &str) -> Result<String, Error> {
        let response: StoryResponse = self
            .post("generate_story", &StoryRequest { outline, storyline })
            .await?;
        response.story.ok_or(Error::MissingField("story"))
    }

    async fn post<Req, Resp>(&self, endpoint: &str, body: &Req) -> Result<Resp, Error>
    where
        Req: Serialize,
        Resp: for<'de> Deserialize<'de>,
    {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(format!("{}/{endpoint}", self.base_url))
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }

        response.json().await.map_err(|e| Error::Parse(e.to_string()))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OutlineRequest<'a> {
    theme: &'a str,
}

#[derive(Debug, Deserialize)]
struct OutlineResponse {
    outline: Option<String>,
}

#[derive(Debug, Serialize)]
struct StorylineRequest<'a> {
    outline: &'a str,
}

#[derive(Debug, Deserialize)]
struct StorylineResponse {
    storyline: Option<String>,
}

#[derive(Debug, Serialize)]
struct StoryRequest<'a> {
    outline: &'a str,
    storyline: &'a str,
}

#[derive(Debug, Deserialize)]
struct StoryResponse {
    story: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = StoryGen::new("http://localhost:8000").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let client = StoryGen::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_request_serialization() {
        let body = serde_json::to_value(StoryRequest {
            outline: "o",
            storyline: "s",
        })
        .unwrap();
        assert_eq!(body["outline"], "o");
        assert_eq!(body["storyline"], "s");
    }

    #[test]
    fn test_response_missing_field() {
        let response: OutlineResponse = serde_json::from_str("{}").unwrap();
        assert!(response.outline.is_none());
    }

    #[test]
    fn test_response_with_field() {
        let response: OutlineResponse =
            serde_json::from_str(r#"{"outline": "a brave knight"}"#).unwrap();
        assert_eq!(response.outline.as_deref(), Some("a brave knight"));
    }
}
