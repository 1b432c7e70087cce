//! Request and response bodies for the HTTP API

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::services::slide_service::GenerationSource;
use crate::types::deck::{lenient_number, Element, Slide};
use crate::types::session::Session;
use crate::types::suggestion::SlideAnalysis;

/// Accepts a number or a numeric string; anything else reads as absent.
fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(lenient_number).map(|n| n as i64))
}

fn lenient_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(lenient_number)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0)
        .map(|n| n as usize))
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default, alias = "slideCount", deserialize_with = "lenient_i64")]
    pub slide_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EditSlideRequest {
    #[serde(default, alias = "slideIndex", deserialize_with = "lenient_index")]
    pub index: Option<usize>,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveSlidesRequest {
    #[serde(default)]
    pub slides: Vec<Slide>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateThemeRequest {
    #[serde(default)]
    pub theme: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleExtensionRequest {
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySuggestionRequest {
    #[serde(default, alias = "suggestion_index", deserialize_with = "lenient_index")]
    pub suggestion_index: Option<usize>,
    /// Falls back to the session's stored analysis when absent.
    #[serde(default)]
    pub analysis: Option<SlideAnalysis>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "slide_index", deserialize_with = "lenient_index")]
    pub slide_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default = "default_export_format")]
    pub format: String,
    /// Exports the session's slides when absent.
    #[serde(default)]
    pub slides: Option<Vec<Slide>>,
    #[serde(default)]
    pub title: Option<String>,
    /// `base64` returns JSON instead of a binary download.
    #[serde(default)]
    pub encoding: Option<String>,
}

fn default_export_format() -> String {
    "pptx".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStateResponse {
    pub success: bool,
    pub session_id: String,
    pub session: Session,
}

#[derive(Debug, Serialize)]
pub struct SlidesResponse {
    pub success: bool,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub slides: Vec<Slide>,
    pub source: GenerationSource,
}

#[derive(Debug, Serialize)]
pub struct ElementsResponse {
    pub success: bool,
    pub elements: Vec<Element>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub analysis: SlideAnalysis,
}

#[derive(Debug, Serialize)]
pub struct SlideResponse {
    pub success: bool,
    pub slide: Slide,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub success: bool,
    pub file_name: String,
    pub content_type: String,
    pub data: String,
}
