//! Gemini `generateContent` wire format and transports
//!
//! The browser build talks to the API through `fetch`; the native runner
//! uses a blocking `ureq` call.

use serde::{Deserialize, Serialize};

use super::{CommentaryError, TextGenerator};

pub const MODEL: &str = "gemini-2.5-flash";
pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// High temperature for more creative insults
pub const TEMPERATURE: f32 = 1.2;
pub const MAX_OUTPUT_TOKENS: u32 = 60;

/// Endpoint for a model's `generateContent` call
pub fn endpoint(model: &str) -> String {
    format!("{API_BASE}/{model}:generateContent")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    pub fn new(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig::default(),
        }
    }

    /// Text of the first part
    pub fn prompt(&self) -> &str {
        self.contents
            .first()
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Response body, reduced to what we read
#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Extract the reply text from a raw response body
pub fn parse_response(body: &str) -> Result<String, CommentaryError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| CommentaryError::Malformed(e.to_string()))?;
    Ok(response.text())
}

/// Browser transport via `window.fetch`
#[cfg(target_arch = "wasm32")]
pub struct FetchGenerator {
    api_key: String,
    model: String,
}

#[cfg(target_arch = "wasm32")]
impl FetchGenerator {
    /// Key baked in at build time through `GEMINI_API_KEY`
    pub fn from_build_env() -> Option<Self> {
        let key = option_env!("GEMINI_API_KEY").filter(|k| !k.is_empty())?;
        Some(Self {
            api_key: key.to_string(),
            model: MODEL.to_string(),
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(value: wasm_bindgen::JsValue) -> CommentaryError {
    CommentaryError::Transport(format!("{value:?}"))
}

#[cfg(target_arch = "wasm32")]
impl TextGenerator for FetchGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, CommentaryError> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Request, RequestInit, RequestMode, Response};

        let body =
            serde_json::to_string(request).map_err(|e| CommentaryError::Transport(e.to_string()))?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_mode(RequestMode::Cors);
        init.set_body(&JsValue::from_str(&body));

        let http_request =
            Request::new_with_str_and_init(&endpoint(&self.model), &init).map_err(js_error)?;
        let headers = http_request.headers();
        headers
            .set("Content-Type", "application/json")
            .map_err(js_error)?;
        headers
            .set("x-goog-api-key", &self.api_key)
            .map_err(js_error)?;

        let window = web_sys::window()
            .ok_or_else(|| CommentaryError::Transport("no window".to_string()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&http_request))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(js_error)?;

        if !response.ok() {
            return Err(CommentaryError::Status(response.status()));
        }

        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .as_string()
            .ok_or_else(|| CommentaryError::Malformed("body is not text".to_string()))?;

        parse_response(&text)
    }
}

/// Native transport via a blocking `ureq` request
#[cfg(not(target_arch = "wasm32"))]
pub struct UreqGenerator {
    api_key: String,
    model: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl UreqGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: MODEL.to_string(),
        }
    }

    /// Key from the `GEMINI_API_KEY` environment variable
    pub fn from_env() -> Option<Self> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(Self::new)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TextGenerator for UreqGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, CommentaryError> {
        let response = ureq::post(&endpoint(&self.model))
            .set("x-goog-api-key", &self.api_key)
            .set("User-Agent", "flappy-genai")
            .send_json(request)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => CommentaryError::Status(code),
                ureq::Error::Transport(t) => CommentaryError::Transport(t.to_string()),
            })?;

        let body = response
            .into_string()
            .map_err(|e| CommentaryError::Malformed(e.to_string()))?;
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest::new("roast me".to_string());
        let json: serde_json::Value = serde_json::to_value(&request).expect("serialize");

        assert_eq!(json["contents"][0]["parts"][0]["text"], "roast me");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 60);
        let temperature = json["generationConfig"]["temperature"]
            .as_f64()
            .expect("temperature");
        assert!((temperature - 1.2).abs() < 1e-6);
        assert_eq!(request.prompt(), "roast me");
    }

    #[test]
    fn test_parse_joins_parts() {
        let body = r#"{
            "candidates": [
                { "content": { "parts": [{ "text": "Wow, " }, { "text": "three whole pipes." }], "role": "model" },
                  "finishReason": "STOP" }
            ],
            "usageMetadata": { "totalTokenCount": 12 }
        }"#;
        assert_eq!(parse_response(body).as_deref(), Ok("Wow, three whole pipes."));
    }

    #[test]
    fn test_parse_without_candidates_is_empty_text() {
        assert_eq!(parse_response("{}").as_deref(), Ok(""));
        assert_eq!(
            parse_response(r#"{ "candidates": [{ "finishReason": "SAFETY" }] }"#).as_deref(),
            Ok("")
        );
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        assert!(matches!(
            parse_response("<html>502</html>"),
            Err(CommentaryError::Malformed(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            endpoint(MODEL),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
