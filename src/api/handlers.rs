//! HTTP handlers for the Slidesmith API

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::error::{ApiError, ApiJson};
use super::models::*;
use super::session_id::{session_cookie, SessionId};
use crate::app::App;
use crate::managers::session_store::SessionStoreTrait;
use crate::services::exporter::{ExportFormat, ExporterTrait};
use crate::services::slide_service::DEFAULT_SLIDE_COUNT;
use crate::types::errors::SessionError;
use crate::types::session::DeckSetting;

type AppState = State<Arc<App>>;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Issue a new session and bind it to the browser with a cookie
pub async fn create_session(State(app): AppState) -> impl IntoResponse {
    let session_id = app.store.issue_session();
    (
        [(header::SET_COOKIE, session_cookie(&session_id))],
        Json(SessionResponse { success: true, session_id }),
    )
}

/// Full session state (slides, settings, flags, history)
pub async fn get_session(
    State(app): AppState,
    session_id: SessionId,
) -> Result<Json<SessionStateResponse>, ApiError> {
    app.store.ensure_session(session_id.as_str());
    let session = app
        .store
        .get_session(session_id.as_str())
        .ok_or_else(|| SessionError::NotFound(session_id.0.clone()))?;
    Ok(Json(SessionStateResponse {
        success: true,
        session_id: session_id.0,
        session,
    }))
}

pub async fn get_slides(State(app): AppState, session_id: SessionId) -> Json<SlidesResponse> {
    app.store.ensure_session(session_id.as_str());
    Json(SlidesResponse {
        success: true,
        slides: app.store.get_slides(session_id.as_str()),
    })
}

/// Replace the whole deck with the client's copy
pub async fn save_slides(
    State(app): AppState,
    session_id: SessionId,
    ApiJson(req): ApiJson<SaveSlidesRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if req.slides.is_empty() {
        return Err(ApiError::BadRequest("No slides data provided".to_string()));
    }

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;
    let mut slides = req.slides;
    for (index, slide) in slides.iter_mut().enumerate() {
        slide.assign_missing_ids(index, stamp);
    }

    app.store.ensure_session(session_id.as_str());
    app.store.replace_slides(session_id.as_str(), slides)?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Slides saved".to_string(),
    }))
}

pub async fn generate_from_topic(
    State(app): AppState,
    session_id: SessionId,
    ApiJson(req): ApiJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let topic = req.topic.trim();
    if topic.is_empty() {
        return Err(ApiError::BadRequest("Topic is required".to_string()));
    }

    let outcome = app
        .slides
        .generate_from_topic(
            session_id.as_str(),
            topic,
            req.slide_count.unwrap_or(DEFAULT_SLIDE_COUNT),
        )
        .await?;
    Ok(Json(GenerateResponse {
        success: true,
        slides: outcome.slides,
        source: outcome.source,
    }))
}

/// Append AI-generated elements to one slide
pub async fn edit_slide_ai(
    State(app): AppState,
    session_id: SessionId,
    ApiJson(req): ApiJson<EditSlideRequest>,
) -> Result<Json<ElementsResponse>, ApiError> {
    let prompt = req.prompt.trim();
    let index = match req.index {
        Some(index) if !prompt.is_empty() => index,
        _ => return Err(ApiError::BadRequest("Invalid request data".to_string())),
    };

    app.store.ensure_session(session_id.as_str());
    let elements = app
        .slides
        .add_elements_with_ai(session_id.as_str(), index, prompt)
        .await?;
    Ok(Json(ElementsResponse { success: true, elements }))
}

pub async fn update_theme(
    State(app): AppState,
    session_id: SessionId,
    ApiJson(req): ApiJson<UpdateThemeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if req.theme.trim().is_empty() {
        return Err(ApiError::BadRequest("Theme is required".to_string()));
    }

    app.store.ensure_session(session_id.as_str());
    app.store
        .update_setting(session_id.as_str(), DeckSetting::Theme, &req.theme)?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Theme updated".to_string(),
    }))
}

/// Update theme, color palette or font family by key
pub async fn update_setting(
    State(app): AppState,
    session_id: SessionId,
    ApiJson(req): ApiJson<UpdateSettingRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let setting: DeckSetting = req.key.parse()?;

    app.store.ensure_session(session_id.as_str());
    app.store
        .update_setting(session_id.as_str(), setting, &req.value)?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("{} updated", setting),
    }))
}

pub async fn toggle_extension(
    State(app): AppState,
    session_id: SessionId,
    ApiJson(req): ApiJson<ToggleExtensionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.store.ensure_session(session_id.as_str());
    app.store
        .toggle_extension(session_id.as_str(), &req.extension, req.enabled)?;
    let state = if req.enabled { "enabled" } else { "disabled" };
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Extension '{}' {}", req.extension.trim(), state),
    }))
}

pub async fn analyze(
    State(app): AppState,
    session_id: SessionId,
) -> Result<Json<AnalysisResponse>, ApiError> {
    app.store.ensure_session(session_id.as_str());
    let analysis = app.slides.analyze_slides(session_id.as_str()).await?;
    Ok(Json(AnalysisResponse { success: true, analysis }))
}

pub async fn apply_suggestion(
    State(app): AppState,
    session_id: SessionId,
    ApiJson(req): ApiJson<ApplySuggestionRequest>,
) -> Result<Json<SlideResponse>, ApiError> {
    let index = req
        .suggestion_index
        .ok_or_else(|| ApiError::BadRequest("Invalid request data".to_string()))?;

    app.store.ensure_session(session_id.as_str());
    let slide = app
        .slides
        .apply_suggestion(session_id.as_str(), index, req.analysis.as_ref())?;
    Ok(Json(SlideResponse { success: true, slide }))
}

pub async fn chat(
    State(app): AppState,
    session_id: SessionId,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }

    app.store.ensure_session(session_id.as_str());
    let response = app
        .slides
        .chat(session_id.as_str(), message, req.slide_index)
        .await?;
    Ok(Json(ChatResponse { success: true, response }))
}

/// Export the deck as a download, or as base64 JSON with `"encoding": "base64"`
pub async fn export(
    State(app): AppState,
    session_id: SessionId,
    ApiJson(req): ApiJson<ExportRequest>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = req.format.parse()?;

    let slides = match req.slides {
        Some(slides) => slides,
        None => {
            app.store.ensure_session(session_id.as_str());
            app.store.get_slides(session_id.as_str())
        }
    };
    let title = req
        .title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| slides.first().map(|s| s.title.clone()))
        .unwrap_or_else(|| "presentation".to_string());

    let file = app.exporter.export(&title, &slides, format)?;

    let wants_base64 = req
        .encoding
        .as_deref()
        .is_some_and(|e| e.eq_ignore_ascii_case("base64"));
    if wants_base64 {
        return Ok(Json(ExportResponse {
            success: true,
            file_name: file.file_name,
            content_type: file.content_type.to_string(),
            data: BASE64.encode(&file.bytes),
        })
        .into_response());
    }

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
