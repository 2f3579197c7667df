//! Destination image search and retrieval
//!
//! Best-effort enrichment: queries an image search API for tourist-attraction
//! photos of the destination and fetches each result as bytes. Every failure
//! mode (no key, search error, bad URL, fetch error) simply yields fewer
//! images; this module never blocks itinerary generation.

use std::time::Duration;

use anyhow::Context;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::ImageSearchConfig;
use crate::models::DestinationImage;

/// Client for the image search API
pub struct ImageSearchClient {
    /// HTTP client with transient-retry middleware
    client: ClientWithMiddleware,
    /// Base API URL
    base_url: String,
    /// API key; absent disables image enrichment entirely
    api_key: Option<String>,
    /// Maximum images to return
    max_images: usize,
}

impl ImageSearchClient {
    /// Create a new image search client from configuration
    pub fn new(config: &ImageSearchConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("VoyageMind/0.1.0")
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        // This path is advisory, so a cheap transient retry is acceptable
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
            max_images: config.max_images as usize,
        })
    }

    /// Collect up to `max_images` destination images, best effort.
    #[instrument(skip(self))]
    pub async fn destination_images(&self, destination: &str) -> Vec<DestinationImage> {
        let Some(api_key) = &self.api_key else {
            debug!("Image search disabled: no API key configured");
            return Vec::new();
        };

        let query = format!("{destination} tourist attractions");
        let url = format!(
            "{}/search.json?q={}&tbm=isch&api_key={}",
            self.base_url,
            urlencoding::encode(&query),
            api_key
        );

        let urls = match self.search_image_urls(&url).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Image search failed for '{}': {}", destination, e);
                return Vec::new();
            }
        };

        let fetches = urls.into_iter().take(self.max_images).map(|source_url| async move {
            match self.fetch_image(&source_url).await {
                Ok(bytes) => Some(DestinationImage { bytes, source_url }),
                Err(e) => {
                    debug!("Skipping image {}: {}", source_url, e);
                    None
                }
            }
        });
        let images: Vec<DestinationImage> = futures::future::join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .collect();

        debug!("Collected {} destination images", images.len());
        images
    }

    async fn search_image_urls(&self, url: &str) -> anyhow::Result<Vec<String>> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;

        let body: ImageSearchResponse = response.json().await?;
        Ok(body
            .images_results
            .unwrap_or_default()
            .into_iter()
            .filter_map(|result| result.original)
            .collect())
    }

    async fn fetch_image(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Image search response body
#[derive(Debug, Deserialize)]
struct ImageSearchResponse {
    images_results: Option<Vec<ImageResult>>,
}

#[derive(Debug, Deserialize)]
struct ImageResult {
    original: Option<String>,
}
