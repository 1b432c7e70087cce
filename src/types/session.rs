use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::deck::Slide;
use super::errors::SessionError;
use super::settings::DeckSettings;
use super::suggestion::Suggestion;

/// Name of the flag that enables AI features (and version snapshots).
pub const AI_FLAG: &str = "ai";

/// One browser user's presentation-editing state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub slides: Vec<Slide>,
    pub theme: String,
    pub color_palette: String,
    pub font_family: String,
    pub extensions: Extensions,
    /// Unix seconds.
    pub created_at: i64,
    pub updated_at: i64,
}

impl Session {
    /// An empty deck using the configured presentation defaults, all flags disabled.
    pub fn new(defaults: &DeckSettings, now: i64) -> Self {
        Self {
            slides: Vec::new(),
            theme: defaults.default_theme.clone(),
            color_palette: defaults.default_palette.clone(),
            font_family: defaults.default_font.clone(),
            extensions: Extensions::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn slide(&self, index: usize) -> Result<&Slide, SessionError> {
        let len = self.slides.len();
        self.slides
            .get(index)
            .ok_or(SessionError::SlideIndexOutOfRange { index, len })
    }

    pub fn slide_mut(&mut self, index: usize) -> Result<&mut Slide, SessionError> {
        let len = self.slides.len();
        self.slides
            .get_mut(index)
            .ok_or(SessionError::SlideIndexOutOfRange { index, len })
    }

    pub fn setting(&self, setting: DeckSetting) -> &str {
        match setting {
            DeckSetting::Theme => &self.theme,
            DeckSetting::ColorPalette => &self.color_palette,
            DeckSetting::FontFamily => &self.font_family,
        }
    }
}

/// Feature flags plus AI-related per-session state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Extensions {
    pub ai_enabled: bool,
    /// Every toggled flag, including `ai`.
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
    #[serde(default)]
    pub ai_suggestions: Vec<Suggestion>,
    /// Oldest first; bounded by `deck.versionHistoryLimit`.
    #[serde(default)]
    pub version_history: VecDeque<VersionSnapshot>,
}

impl Extensions {
    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}

/// Slides as they were right after a replace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionSnapshot {
    pub slides: Vec<Slide>,
    pub timestamp: i64,
}

/// Presentation-level settings that `update_setting` can change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DeckSetting {
    Theme,
    ColorPalette,
    FontFamily,
}

impl DeckSetting {
    pub fn as_str(self) -> &'static str {
        match self {
            DeckSetting::Theme => "theme",
            DeckSetting::ColorPalette => "colorPalette",
            DeckSetting::FontFamily => "fontFamily",
        }
    }
}

impl fmt::Display for DeckSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeckSetting {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "theme" => Ok(DeckSetting::Theme),
            "colorPalette" | "color_palette" | "palette" => Ok(DeckSetting::ColorPalette),
            "fontFamily" | "font_family" | "font" => Ok(DeckSetting::FontFamily),
            other => Err(SessionError::InvalidSetting(format!(
                "Unknown setting '{}'",
                other
            ))),
        }
    }
}
