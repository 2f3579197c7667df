//! `VoyageMind` - AI-assisted trip planning and itinerary generation
//!
//! This library provides the core functionality for trip preference capture,
//! model-backed itinerary generation with schema repair, a travel-assistant
//! chat surface, and PDF itinerary rendering.

pub mod chat;
pub mod config;
pub mod error;
pub mod fallback;
pub mod generate;
pub mod images;
pub mod llm;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod prompt;
pub mod render;
pub mod sanitize;
pub mod session;
pub mod web;

// Re-export core types for public API
pub use chat::{CHAT_APOLOGY, chat_turn};
pub use config::VoyageMindConfig;
pub use error::VoyageMindError;
pub use fallback::synthesize;
pub use generate::{document_file_name, generate_itinerary};
pub use images::ImageSearchClient;
pub use llm::{GeminiClient, ModelBackend};
pub use models::{
    BudgetBreakdown, ChatMessage, ChatRole, DestinationImage, FoodPreference, Itinerary,
    ItineraryDay, TransportMode, TripRequest,
};
pub use session::PlannerSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, VoyageMindError>;
