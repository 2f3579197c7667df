//! HTTP surface
//!
//! JSON API over the planner: submit trip preferences, chat, download the
//! itinerary document. One in-memory session per server process, guarded by an
//! async mutex so itinerary generation and chat turns serialize naturally.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::VoyageMindConfig;
use crate::generate::{self, document_file_name};
use crate::images::ImageSearchClient;
use crate::llm::{GeminiClient, ModelBackend};
use crate::models::{ChatMessage, FoodPreference, TransportMode, TripRequest};
use crate::session::PlannerSession;
use crate::{VoyageMindError, chat};

/// Shared application state
pub struct AppState {
    session: Mutex<PlannerSession>,
    model: Arc<dyn ModelBackend>,
    images: ImageSearchClient,
}

type SharedState = Arc<AppState>;

/// Build the API router over prepared state. Split from [`run`] so tests can
/// drive the handlers with a scripted model backend.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/trip", post(submit_trip))
        .route("/api/chat", post(chat_message))
        .route("/api/transcript", get(transcript))
        .route("/api/itinerary", get(download_itinerary))
        .with_state(state)
}

/// Start the web server with clients built from configuration.
pub async fn run(config: VoyageMindConfig) -> anyhow::Result<()> {
    let model: Arc<dyn ModelBackend> = Arc::new(GeminiClient::new(&config.model)?);
    let images = ImageSearchClient::new(&config.images)?;
    let session = PlannerSession::new(config.defaults.chat_history_limit as usize);

    let state = Arc::new(AppState {
        session: Mutex::new(session),
        model,
        images,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state).layer(cors);

    let addr = format!("0.0.0.0:{}", config.defaults.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web server running at http://localhost:{}", config.defaults.port);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Create state from already-built components, for tests and embedding.
#[must_use]
pub fn app_state(
    model: Arc<dyn ModelBackend>,
    images: ImageSearchClient,
    history_limit: usize,
) -> SharedState {
    Arc::new(AppState {
        session: Mutex::new(PlannerSession::new(history_limit)),
        model,
        images,
    })
}

/// Trip preference form body
#[derive(Debug, Deserialize)]
pub struct TripForm {
    pub destination: String,
    pub budget: String,
    pub travelers: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub transport_mode: Option<String>,
    #[serde(default)]
    pub food_preference: Option<String>,
}

#[derive(Debug, Serialize)]
struct TripSummary {
    destination: String,
    days: u32,
    preferences: String,
}

#[derive(Debug, Deserialize)]
struct ChatQuery {
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatReply {
    reply: String,
}

async fn submit_trip(
    State(state): State<SharedState>,
    Json(form): Json<TripForm>,
) -> Result<Json<TripSummary>, ApiError> {
    let trip = trip_from_form(form)?;
    let summary = TripSummary {
        destination: trip.destination.clone(),
        days: trip.days(),
        preferences: trip.preferences_label(),
    };

    let mut session = state.session.lock().await;
    session.set_trip(trip);
    Ok(Json(summary))
}

async fn chat_message(
    State(state): State<SharedState>,
    Json(query): Json<ChatQuery>,
) -> Result<Json<ChatReply>, ApiError> {
    if query.message.trim().is_empty() {
        return Err(ApiError::unprocessable("Message must not be empty"));
    }

    let mut session = state.session.lock().await;
    let reply = chat::chat_turn(state.model.as_ref(), &mut session, &query.message).await;
    Ok(Json(ChatReply { reply }))
}

async fn transcript(State(state): State<SharedState>) -> Json<Vec<ChatMessage>> {
    let session = state.session.lock().await;
    Json(session.messages().cloned().collect())
}

async fn download_itinerary(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let mut session = state.session.lock().await;
    let Some(trip) = session.trip().cloned() else {
        return Err(ApiError::unprocessable(
            "Submit trip preferences before requesting an itinerary",
        ));
    };

    let itinerary = generate::generate_itinerary(state.model.as_ref(), &trip).await;
    let images = state.images.destination_images(&trip.destination).await;
    let bytes = crate::render::render(&itinerary, &trip, &images);

    // The generated plan is worth a transcript entry too
    session.push_message(ChatMessage::assistant(format!(
        "Prepared your {} itinerary: {}",
        trip.destination, itinerary.title
    )));
    drop(session);

    let file_name = document_file_name(&trip.destination);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

fn trip_from_form(form: TripForm) -> Result<TripRequest, ApiError> {
    // Unrecognized mode or diet strings fall back to the defaults rather than
    // rejecting the whole form
    let transport = form
        .transport_mode
        .as_deref()
        .and_then(TransportMode::parse)
        .unwrap_or_default();
    let food = form
        .food_preference
        .as_deref()
        .and_then(FoodPreference::parse)
        .unwrap_or_default();

    TripRequest::new(
        &form.destination,
        &form.budget,
        form.travelers,
        form.start_date,
        form.end_date,
        form.preferences,
        transport,
        food,
    )
    .map_err(ApiError::from)
}

/// JSON error payload with an HTTP status
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }
}

impl From<VoyageMindError> for ApiError {
    fn from(e: VoyageMindError) -> Self {
        let status = match &e {
            VoyageMindError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageSearchConfig;
    use crate::{Result, VoyageMindError};
    use async_trait::async_trait;

    struct OfflineBackend;

    #[async_trait]
    impl ModelBackend for OfflineBackend {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(VoyageMindError::transport("offline"))
        }
    }

    #[tokio::test]
    async fn test_router_builds_from_components() {
        let images = ImageSearchClient::new(&ImageSearchConfig {
            api_key: None,
            base_url: "https://serpapi.com".to_string(),
            max_images: 3,
            timeout_seconds: 5,
            max_retries: 0,
        })
        .unwrap();
        let state = app_state(Arc::new(OfflineBackend), images, 50);
        let _app = router(state);
    }

    #[test]
    fn test_trip_form_lenient_enum_parsing() {
        let form = TripForm {
            destination: "Paris".to_string(),
            budget: "45000".to_string(),
            travelers: 2,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            preferences: vec![],
            transport_mode: Some("Hot air balloon".to_string()),
            food_preference: Some("Non-Vegetarian".to_string()),
        };
        let trip = trip_from_form(form).unwrap();
        assert_eq!(trip.transport_mode, TransportMode::Train);
        assert_eq!(trip.food_preference, FoodPreference::NonVegetarian);
    }

    #[test]
    fn test_trip_form_validation_maps_to_unprocessable() {
        let form = TripForm {
            destination: String::new(),
            budget: "45000".to_string(),
            travelers: 2,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            preferences: vec![],
            transport_mode: None,
            food_preference: None,
        };
        let err = trip_from_form(form).err().unwrap();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_form_json_shape() {
        let body = r#"{
            "destination": "Paris",
            "budget": "45000",
            "travelers": 2,
            "start_date": "2026-03-02",
            "end_date": "2026-03-04",
            "transport_mode": "flight"
        }"#;
        let form: TripForm = serde_json::from_str(body).unwrap();
        assert!(form.preferences.is_empty());
        let trip = trip_from_form(form).unwrap();
        assert_eq!(trip.transport_mode, TransportMode::Flight);
        assert_eq!(trip.days(), 3);
    }
}
