use reqwest::Client;
use serde_json::{json, Value};

use crate::models::{ApiError, GenerateRequest, Mode, QuizQuestion};


const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Select the instruction template for a request. Pure mapping from mode
/// to template, parameterized by the request fields.
pub fn system_prompt(req: &GenerateRequest) -> String {
    match req.mode {
        Mode::Quiz => format!(
            "You are an expert teacher. Generate a 3-question multiple choice quiz about {}.\n\
             Return ONLY a JSON array with this format:\n\
             [\n\
               {{ \"q\": \"Question text\", \"options\": [\"A\", \"B\", \"C\", \"D\"], \"correct\": 0 }},\n\
               ...\n\
             ]\n\
             Do not wrap in markdown code blocks. Just the raw JSON.",
            req.context
        ),
        Mode::Schedule => format!(
            "You are an expert study strategist. Create a detailed, step-by-step study schedule \
             for a student in {} who is facing this situation: \"{}\".\n\
             The user's specific request is: \"{}\".\n\
             Format the response with bold headings, bullet points, and time estimates. \
             Be encouraging but firm.",
            req.context,
            req.situation.as_deref().unwrap_or(""),
            req.message
        ),
        Mode::Chat => {
            let context = if req.context.trim().is_empty() {
                "General High School Advice"
            } else {
                &req.context
            };
            let situation = match req.situation.as_deref() {
                Some(s) if !s.trim().is_empty() => s,
                _ => "General Inquiry",
            };
            format!(
                "You are an expert high school tutor and mentor for Knowledge Groove Academy.\n\
                 Your goal is to help students succeed in their courses by providing specific, \
                 actionable advice, practice problems, and explanations.\n\n\
                 Context:\n\
                 - Course: {context}\n\
                 - Student Situation: {situation}\n\n\
                 Guidelines:\n\
                 1. Be encouraging but realistic.\n\
                 2. If the student asks for practice, generate 1-2 specific problems relevant to their course and situation.\n\
                 3. If they are confused, explain concepts simply using analogies.\n\
                 4. If they are behind, prioritize the most important topics.\n\
                 5. Keep responses concise (under 3 paragraphs) unless asked for a detailed plan."
            )
        }
    }
}

/// The message actually sent upstream: a blank submission becomes the
/// bare "Generate" instruction (quiz requests often carry no message).
pub fn effective_message(message: &str) -> &str {
    if message.trim().is_empty() {
        "Generate"
    } else {
        message
    }
}

/// Strip markdown code-fence markers the model sometimes wraps quiz output
/// in, despite the template asking for raw JSON.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Best-effort check that quiz text matches the expected question array.
pub fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>, serde_json::Error> {
    serde_json::from_str(text)
}

/// The conversation is synthesized fresh for every call: the template is
/// re-sent as history, never accumulated server-side.
fn build_conversation(system_prompt: &str, message: &str) -> Value {
    json!({
        "contents": [
            { "role": "user", "parts": [{ "text": system_prompt }] },
            { "role": "model", "parts": [{ "text": "Understood. I am ready." }] },
            { "role": "user", "parts": [{ "text": message }] },
        ]
    })
}

/// Thin client for the Gemini generateContent REST endpoint. One round trip
/// per request; no retry, no streaming.
pub struct GeminiClient {
    http: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    pub async fn generate(&self, system_prompt: &str, message: &str) -> Result<String, ApiError> {
        let url = format!("{GEMINI_ENDPOINT}/{GEMINI_MODEL}:generateContent");
        let body = build_conversation(system_prompt, message);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "Gemini request failed: {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;
        data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::Upstream("Failed to extract text from Gemini response".to_string())
            })
    }
}
