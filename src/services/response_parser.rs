//! AI response ingestion.
//!
//! Model replies are free text that usually, but not always, is pure JSON. The
//! region between the first opening bracket and the last closing bracket of the
//! expected shape is parsed; everything around it (prose, code fences) is ignored.

use serde_json::Value;
use tracing::warn;

use crate::types::ai::JsonShape;
use crate::types::deck::{elements_from_value, Element, Slide};
use crate::types::errors::IngestError;
use crate::types::suggestion::{SlideAnalysis, Suggestion};

/// In-band failure markers some upstream gateways put in the reply text
/// ("error" and "balance").
pub const UPSTREAM_ERROR_MARKERS: [&str; 2] = ["오류", "잔액"];

/// True if the text is an upstream failure message rather than content.
pub fn is_upstream_error_signal(text: &str) -> bool {
    UPSTREAM_ERROR_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Extracts and parses the bracketed region of the given shape.
pub fn extract_json(text: &str, shape: JsonShape) -> Result<Value, IngestError> {
    let (open, close) = shape.brackets();
    let start = text.find(open).ok_or(IngestError::NoJsonFound(shape))?;
    let end = text.rfind(close).ok_or(IngestError::NoJsonFound(shape))?;
    if end <= start {
        return Err(IngestError::NoJsonFound(shape));
    }
    serde_json::from_str(&text[start..=end]).map_err(|e| IngestError::MalformedJson(e.to_string()))
}

/// Checks for an upstream error signal, then extracts JSON.
pub fn ingest(text: &str, shape: JsonShape) -> Result<Value, IngestError> {
    if is_upstream_error_signal(text) {
        return Err(IngestError::UpstreamSignal(text.trim().to_string()));
    }
    extract_json(text, shape)
}

/// Reads a generated deck. Non-object entries are skipped; a deck with no
/// slides at all counts as malformed.
pub fn parse_slides(value: &Value) -> Result<Vec<Slide>, IngestError> {
    let items = value
        .as_array()
        .ok_or_else(|| IngestError::MalformedJson("expected an array of slides".to_string()))?;
    let slides: Vec<Slide> = items.iter().filter_map(Slide::from_value).collect();
    if slides.is_empty() {
        return Err(IngestError::MalformedJson("the response contained no slides".to_string()));
    }
    Ok(slides)
}

/// Reads generated elements. Only shape/text/image elements are accepted from a model;
/// anything else is dropped. `base_z` offsets default stacking so new elements land on top.
pub fn parse_elements(value: &Value, base_z: usize) -> Vec<Element> {
    elements_from_value(value, base_z)
        .into_iter()
        .filter(|element| {
            let keep = element.kind.is_renderable();
            if !keep {
                warn!(kind = element.kind.type_tag(), "Dropped generated element of unsupported type");
            }
            keep
        })
        .collect()
}

/// Reads an analysis object. Suggestions that fail to parse or point past the
/// end of the deck are dropped.
pub fn parse_analysis(value: &Value, slide_count: usize) -> Result<SlideAnalysis, IngestError> {
    let object = value
        .as_object()
        .ok_or_else(|| IngestError::MalformedJson("expected an analysis object".to_string()))?;

    let improvement_suggestions = object
        .get("improvementSuggestions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<Suggestion>(item.clone()).ok())
                .filter(|s| {
                    let in_range = s.slide_index < slide_count;
                    if !in_range {
                        warn!(slide_index = s.slide_index, slide_count, "Dropped suggestion for missing slide");
                    }
                    in_range
                })
                .collect()
        })
        .unwrap_or_default();

    let summary = object.get("summary").and_then(Value::as_str).map(str::to_string);

    Ok(SlideAnalysis { improvement_suggestions, summary })
}
