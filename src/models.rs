use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generation request from the site widgets (chat / quiz / schedule)
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub context: String,
    pub situation: Option<String>,
    #[serde(default)]
    pub mode: Mode,
}

/// Which instruction template the gateway uses.
/// Anything the client sends that isn't quiz/schedule falls back to chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Quiz,
    Schedule,
    #[serde(other)]
    Chat,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Chat
    }
}

/// Generation response: the raw model text (quiz mode is fence-stripped first)
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub text: String,
}

/// One multiple-choice question, the shape the quiz template asks the model for
#[derive(Debug, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub q: String,
    pub options: Vec<String>,
    pub correct: usize,
}

/// Real-estate lookup request
#[derive(Debug, Deserialize)]
pub struct RealEstateRequest {
    #[serde(default)]
    pub address: String,
}

/// Real-estate lookup response; `isMock` flags synthesized demo data
#[derive(Debug, Serialize)]
pub struct RealEstateResponse {
    #[serde(rename = "isMock")]
    pub is_mock: bool,
    pub data: PropertyRecord,
}

/// Display schema the frontend renders, regardless of data source
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub address: String,
    pub price: String,
    pub status: String,
    pub rent: String,
    pub school_rating: u8,
    pub area: String,
    pub lot_size: String,
    pub good_buy_score: u32,
    pub verdict: String,
    pub verdict_desc: String,
    pub similar: Vec<SimilarHome>,
}

#[derive(Debug, Serialize)]
pub struct SimilarHome {
    pub id: u32,
    pub address: String,
    pub price: String,
    pub image: String,
}

/// Every handler failure becomes `{"error": message}` with a non-success
/// status; the caller presents it, there is no retry or fallback here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("GEMINI_API_KEY is not set in environment variables.")]
    MissingGeminiKey,
    #[error("Address is required")]
    MissingAddress,
    #[error("{0}")]
    Upstream(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingAddress => StatusCode::BAD_REQUEST,
            ApiError::MissingGeminiKey | ApiError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
