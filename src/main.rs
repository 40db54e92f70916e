use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod gateway;
mod models;
mod real_estate;
mod scene;


use gateway::GeminiClient;
use models::{
    ApiError, GenerateRequest, GenerateResponse, Mode, RealEstateRequest, RealEstateResponse,
};
use real_estate::HasDataClient;
use scene::{city_route, section_index, CameraPath, SECTIONS};

/// Stateless request handlers over env-derived credentials and one shared
/// HTTP client. No persistence, no per-session state.
#[derive(Clone)]
struct AppState {
    gemini_api_key: Option<String>,
    hasdata_api_key: Option<String>,
    http: reqwest::Client,
}

impl AppState {
    fn from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            hasdata_api_key: std::env::var("HASDATA_API_KEY").ok(),
            http: reqwest::Client::new(),
        }
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/generate", post(generate))
        .route("/api/real-estate", post(lookup_property))
        .route("/scene/route", get(scene_route))
        .route("/scene/pose", get(scene_pose))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = AppState::from_env();
    if state.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set, generation requests will fail");
    }
    if state.hasdata_api_key.is_none() {
        info!("HASDATA_API_KEY not set, real-estate lookups will return mock data");
    }

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn root() -> &'static str {
    "Knowledge Groove API v0.1.0"
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Prompted-generation gateway: select a template by mode, make exactly one
/// round trip upstream, post-process quiz output.
async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let api_key = state.gemini_api_key.clone().ok_or(ApiError::MissingGeminiKey)?;

    let prompt = gateway::system_prompt(&request);
    let message = gateway::effective_message(&request.message);

    let client = GeminiClient::new(state.http.clone(), api_key);
    let mut text = client.generate(&prompt, message).await?;

    if request.mode == Mode::Quiz {
        text = gateway::strip_code_fences(&text);
        if let Err(err) = gateway::parse_quiz(&text) {
            warn!("quiz output is not a valid question array: {}", err);
        }
    }

    Ok(Json(GenerateResponse { text }))
}

/// Real-estate lookup: provider-backed when a credential is configured,
/// synthesized demo data otherwise.
async fn lookup_property(
    State(state): State<AppState>,
    Json(request): Json<RealEstateRequest>,
) -> Result<Json<RealEstateResponse>, ApiError> {
    let address = request.address.trim();
    if address.is_empty() {
        return Err(ApiError::MissingAddress);
    }

    match &state.hasdata_api_key {
        Some(api_key) => {
            let client = HasDataClient::new(state.http.clone(), api_key.clone());
            let payload = client.lookup(address).await?;
            Ok(Json(RealEstateResponse {
                is_mock: false,
                data: real_estate::map_provider_response(&payload, address),
            }))
        }
        None => {
            info!("no provider credential, returning mock data for {}", address);
            Ok(Json(RealEstateResponse {
                is_mock: true,
                data: real_estate::mock_property(address),
            }))
        }
    }
}

/// The authored flythrough route, so the frontend renders the same
/// waypoints and overlay sections the camera is driven along.
async fn scene_route() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "waypoints": city_route(),
        "sections": SECTIONS,
    }))
}

#[derive(Debug, Deserialize)]
struct PoseQuery {
    #[serde(default)]
    progress: f32,
}

/// Camera pose for a scroll progress value, clamped into [0,1].
async fn scene_pose(Query(query): Query<PoseQuery>) -> Json<serde_json::Value> {
    let route = city_route();
    let path = CameraPath::new(route.iter().map(|w| w.position).collect());

    let progress = query.progress.clamp(0.0, 1.0);
    let pose = path.pose(progress);
    let section = section_index(progress, SECTIONS.len());

    Json(serde_json::json!({
        "progress": progress,
        "position": pose.position.to_array(),
        "lookAt": pose.look_at.to_array(),
        "section": {
            "index": section,
            "name": SECTIONS[section],
        },
    }))
}
