use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::deck::SlideChanges;

/// How strongly the analysis recommends a suggestion.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let priority = match value.as_str().map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("high") => Priority::High,
            Some("low") => Priority::Low,
            _ => Priority::Medium,
        };
        Ok(priority)
    }
}

/// One improvement proposed by slide analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub slide_index: usize,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub auto_applicable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<SlideChanges>,
}

/// Result of analysing a deck.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlideAnalysis {
    #[serde(default)]
    pub improvement_suggestions: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
