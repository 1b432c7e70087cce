use serde::{Deserialize, Serialize};

use super::ai::LlmProviderName;

/// Top-level server settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ServerSettings {
    pub server: HttpSettings,
    pub llm: LlmSettings,
    pub deck: DeckSettings,
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl HttpSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Chat-completion client settings. The API key is not part of these; it comes
/// from the environment only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmSettings {
    pub provider: LlmProviderName,
    /// Overrides the provider preset endpoint.
    pub endpoint: Option<String>,
    /// Overrides the provider preset model.
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProviderName::DeepSeek,
            endpoint: None,
            model: None,
            temperature: 0.7,
            max_tokens: 4000,
            timeout_secs: 15,
        }
    }
}

/// Presentation defaults for new sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DeckSettings {
    pub default_theme: String,
    pub default_palette: String,
    pub default_font: String,
    pub version_history_limit: usize,
}

impl Default for DeckSettings {
    fn default() -> Self {
        Self {
            default_theme: "default".to_string(),
            default_palette: "blue".to_string(),
            default_font: "Pretendard".to_string(),
            version_history_limit: 20,
        }
    }
}
