// Slidesmith Settings Engine
// Manages server settings: loading, saving, updating individual values, resetting to defaults,
// and overlaying environment variables. Settings are stored as a JSON file.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::types::errors::SettingsError;
use crate::types::settings::ServerSettings;

/// Config file used when neither an explicit path nor `SLIDESMITH_CONFIG` is given.
pub const DEFAULT_CONFIG_FILE: &str = "slidesmith.json";

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 3] = ["LLM_API_KEY", "DEEPSEEK_API_KEY", "OPENAI_API_KEY"];

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ServerSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ServerSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: ServerSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise uses `slidesmith.json` in the working directory.
    pub fn new(path_override: Option<String>) -> Self {
        Self {
            config_path: path_override.unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()),
            settings: ServerSettings::default(),
        }
    }

    /// Overlays environment variables on the loaded settings without saving.
    ///
    /// `lookup` resolves a variable name; pass `|k| std::env::var(k).ok()` in production.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), SettingsError> {
        if let Some(host) = lookup("HOST") {
            self.update_in_memory("server.host", Value::String(host))?;
        }
        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| SettingsError::InvalidValue(format!("PORT must be a port number, got '{}'", port)))?;
            self.update_in_memory("server.port", Value::from(port))?;
        }
        if let Some(provider) = lookup("LLM_PROVIDER") {
            self.update_in_memory("llm.provider", Value::String(provider.trim().to_ascii_lowercase()))?;
        }
        if let Some(endpoint) = lookup("LLM_API_URL") {
            self.update_in_memory("llm.endpoint", Value::String(endpoint))?;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.update_in_memory("llm.model", Value::String(model))?;
        }
        debug!("Applied environment overrides");
        Ok(())
    }

    /// Navigates the dot-separated key path, replaces the value, and validates by
    /// deserializing back into `ServerSettings`.
    fn update_in_memory(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }
        let parts: Vec<&str> = key.split('.').collect();

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        {
            let mut current = &mut json_value;
            for (i, part) in parts.iter().enumerate() {
                if i == parts.len() - 1 {
                    match current {
                        Value::Object(map) => {
                            if !map.contains_key(*part) {
                                return Err(SettingsError::InvalidKey(format!(
                                    "Key '{}' not found in settings",
                                    key
                                )));
                            }
                            map.insert(part.to_string(), value.clone());
                        }
                        _ => {
                            return Err(SettingsError::InvalidKey(format!(
                                "Cannot navigate to key '{}': intermediate value is not an object",
                                key
                            )));
                        }
                    }
                } else {
                    current = match current.get_mut(*part) {
                        Some(v) => v,
                        None => {
                            return Err(SettingsError::InvalidKey(format!(
                                "Key '{}' not found in settings",
                                key
                            )));
                        }
                    };
                }
            }
        }

        let new_settings: ServerSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        self.settings = new_settings;
        Ok(())
    }
}

/// Reads the API key from the first non-empty of [`API_KEY_VARS`].
pub fn api_key_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<Zeroizing<String>> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(*name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .map(Zeroizing::new)
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings.
    /// If the file exists but is malformed, returns a serialization error.
    /// Missing keys take their defaults.
    fn load(&mut self) -> Result<ServerSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            info!(path = %self.config_path, "No config file, using defaults");
            self.settings = ServerSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: ServerSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;

        info!(path = %self.config_path, "Loaded config file");
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings to the JSON config file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SettingsError::IoError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Updates an individual setting by dot-notation key path and saves to disk.
    ///
    /// # Examples
    /// - `"server.port"` → updates `settings.server.port`
    /// - `"llm.timeoutSecs"` → updates `settings.llm.timeout_secs`
    /// - `"deck.defaultTheme"` → updates `settings.deck.default_theme`
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.update_in_memory(key, value)?;
        self.save()?;
        Ok(())
    }

    /// Resets all settings to defaults and saves to disk.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ServerSettings::default();
        self.save()?;
        Ok(())
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
