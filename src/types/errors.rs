use thiserror::Error;

use super::ai::JsonShape;

// === SessionError ===

/// Errors raised by the session store and by index validation on a deck.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// No session exists for the given identifier.
    #[error("Session not found: {0}")]
    NotFound(String),
    /// The slide index is not below the deck's current length.
    #[error("Slide index out of range: {index} (deck has {len} slides)")]
    SlideIndexOutOfRange { index: usize, len: usize },
    /// The suggestion index is not below the analysis list length.
    #[error("Invalid suggestion index: {index} (analysis has {len} suggestions)")]
    InvalidSuggestionIndex { index: usize, len: usize },
    /// A setting key or value was rejected.
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

// === IngestError ===

/// Errors raised while turning free-text model output into deck JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    /// No bracketed region of the expected shape exists in the response.
    #[error("No JSON {0} found in the AI response")]
    NoJsonFound(JsonShape),
    /// The bracketed region was found but does not parse.
    #[error("Failed to parse the AI response: {0}")]
    MalformedJson(String),
    /// The response carries an in-band upstream failure message instead of content.
    #[error("{0}")]
    UpstreamSignal(String),
}

// === LlmError ===

/// Errors raised by the outbound chat-completion call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlmError {
    /// The call did not complete within the configured timeout.
    #[error("The AI request timed out. Please try again shortly.")]
    Timeout,
    /// The endpoint could not be reached.
    #[error("Could not connect to the AI service: {0}")]
    ConnectionFailed(String),
    /// The endpoint answered with a non-success status.
    #[error("AI service error ({0}). Please try again shortly.")]
    HttpStatus(u16),
    /// The endpoint answered 402: the operator's account has run out of credit.
    #[error("The AI service balance is insufficient. Please contact the administrator.")]
    InsufficientBalance,
    /// No API key is configured, so no call was attempted.
    #[error("No AI API key is configured")]
    NotConfigured,
    /// Any other failure (bad payload, unexpected body shape).
    #[error("AI request failed: {0}")]
    Other(String),
}

// === DeckError ===

/// Errors returned by the document mutators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeckError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// The model answered with JSON but none of it describes a usable element.
    #[error("The AI response did not contain any usable elements")]
    NoUsableElements,
}

// === ExportError ===

/// Errors related to presentation export.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    /// The format is recognised but has no exporter yet.
    #[error("Export format not implemented: {0}")]
    NotImplemented(String),
    /// The format tag is not recognised at all.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
    /// An element carries non-finite geometry.
    #[error("Invalid geometry for element '{element}' on slide {slide}")]
    InvalidGeometry { slide: usize, element: String },
    /// Writing the output package failed.
    #[error("Failed to write presentation package: {0}")]
    Package(String),
}

impl From<zip::result::ZipError> for ExportError {
    fn from(e: zip::result::ZipError) -> Self {
        ExportError::Package(e.to_string())
    }
}

impl From<std::fmt::Error> for ExportError {
    fn from(e: std::fmt::Error) -> Self {
        ExportError::Package(e.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Package(e.to_string())
    }
}

// === SettingsError ===

/// Errors related to server settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
