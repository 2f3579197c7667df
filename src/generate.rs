//! Itinerary generation pipeline
//!
//! Orchestrates prompt building, the model call, parsing and normalization.
//! This is the error boundary of the whole pipeline: any failure past input
//! validation is absorbed into the fallback synthesizer, so callers always
//! receive a schema-conformant itinerary.

use tracing::{info, instrument, warn};

use crate::llm::ModelBackend;
use crate::models::{Itinerary, TripRequest};
use crate::sanitize::sanitize;
use crate::{Result, fallback, normalize, parser, prompt};

/// Generate an itinerary for a validated trip. Never fails; model, parse and
/// schema errors all degrade to the synthesized fallback.
#[instrument(skip(backend, trip), fields(destination = %trip.destination, days = trip.days()))]
pub async fn generate_itinerary(backend: &dyn ModelBackend, trip: &TripRequest) -> Itinerary {
    match try_generate(backend, trip).await {
        Ok(itinerary) => {
            info!("Generated {}-day itinerary from model output", itinerary.days.len());
            itinerary
        }
        Err(e) => {
            warn!("Itinerary generation failed ({}), using fallback", e);
            fallback::synthesize(trip)
        }
    }
}

async fn try_generate(backend: &dyn ModelBackend, trip: &TripRequest) -> Result<Itinerary> {
    let prompt = prompt::itinerary_prompt(trip);
    let raw = backend.generate(&prompt).await?;
    let payload = parser::parse_model_response(&raw)?;
    normalize::normalize(payload, trip)
}

/// File name for a downloaded itinerary document. Sanitized and
/// whitespace-free so it survives Content-Disposition headers and any
/// filesystem.
#[must_use]
pub fn document_file_name(destination: &str) -> String {
    let stem: String = sanitize(destination)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let stem = if stem.is_empty() { "Travel".to_string() } else { stem };
    format!("{stem}_Itinerary.pdf")
}
