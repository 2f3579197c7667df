//! Generative model client
//!
//! HTTP client for the Gemini `generateContent` REST API with rate limiting
//! and bounded timeouts. The model is a black box: prompt text in, response
//! text out. Failures here are transport errors; the generation boundary
//! absorbs them into the fallback synthesizer, so this path performs no
//! automatic retries.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::config::ModelConfig;
use crate::{Result, VoyageMindError};

/// Seam between the pipeline and the hosted model. Lets tests script responses
/// without network access.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Send one prompt and return the raw response text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Rate limiter for model API requests
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum requests per minute
    max_requests_per_minute: u32,
    /// Request timestamps within the current minute
    request_times: Vec<Instant>,
    /// Last cleanup time
    last_cleanup: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(max_requests_per_minute: u32) -> Self {
        Self {
            max_requests_per_minute,
            request_times: Vec::new(),
            last_cleanup: Instant::now(),
        }
    }

    /// Check if a request is allowed and record it
    pub fn allow_request(&mut self) -> bool {
        self.cleanup_old_requests();

        if self.request_times.len() >= self.max_requests_per_minute as usize {
            false
        } else {
            self.request_times.push(Instant::now());
            true
        }
    }

    /// Remove requests older than 1 minute
    fn cleanup_old_requests(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_cleanup) >= Duration::from_secs(10) {
            let cutoff = now - Duration::from_secs(60);
            self.request_times.retain(|&time| time > cutoff);
            self.last_cleanup = now;
        }
    }
}

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    /// HTTP client
    client: Client,
    /// Base API URL
    base_url: String,
    /// Model identifier
    model: String,
    /// API key
    api_key: String,
    /// Rate limiter
    rate_limiter: Mutex<RateLimiter>,
}

impl GeminiClient {
    /// Create a new model client from configuration. Requires an API key.
    pub fn new(config: &ModelConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| VoyageMindError::config("Model API key is required"))?;

        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent("VoyageMind/0.1.0")
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            rate_limiter: Mutex::new(RateLimiter::new(config.requests_per_minute)),
        })
    }
}

#[async_trait]
impl ModelBackend for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        {
            let mut limiter = self
                .rate_limiter
                .lock()
                .map_err(|_| VoyageMindError::general("Rate limiter lock poisoned"))?;
            if !limiter.allow_request() {
                warn!("Model request rejected by rate limiter");
                return Err(VoyageMindError::transport(
                    "Model request rate limit exceeded",
                ));
            }
        }

        info!("Requesting itinerary content from model '{}'", self.model);
        let start_time = Instant::now();

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoyageMindError::transport(format!("Model request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Model API returned status {}", status);
            return Err(VoyageMindError::transport(format!(
                "Model API returned status {status}"
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            VoyageMindError::transport(format!("Invalid model response body: {e}"))
        })?;

        let total_duration = start_time.elapsed();
        debug!(
            "Model responded in {:.3}s",
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 30 {
            warn!(
                "Slow model response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        parsed
            .first_text()
            .ok_or_else(|| VoyageMindError::transport("Model response contained no text"))
    }
}

/// Response body of the `generateContent` endpoint
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate part, if any
    fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .find_map(|part| part.text)
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_allows_up_to_limit() {
        let mut limiter = RateLimiter::new(3);
        assert!(limiter.allow_request());
        assert!(limiter.allow_request());
        assert!(limiter.allow_request());
        assert!(!limiter.allow_request());
    }

    #[test]
    fn test_rate_limiter_zero_limit_blocks() {
        let mut limiter = RateLimiter::new(0);
        assert!(!limiter.allow_request());
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = ModelConfig {
            api_key: None,
            base_url: "https://example.invalid/v1beta".to_string(),
            model: "gemini-1.5-pro-latest".to_string(),
            timeout_seconds: 10,
            requests_per_minute: 60,
        };
        assert!(GeminiClient::new(&config).is_err());
    }

    #[test]
    fn test_first_text_extraction() {
        let body = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "hello traveler" }] }
            }]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.first_text().as_deref(), Some("hello traveler"));
    }

    #[test]
    fn test_empty_candidates_yield_none() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(parsed.first_text().is_none());

        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.first_text().is_none());
    }
}
