//! Document mutators for Slidesmith.
//!
//! Topic generation, AI element editing, slide analysis, suggestion application and
//! assistant chat. Every mutation goes through the [`SessionStore`] by session id.
//! Model calls run outside the per-session lock; the target slide is re-validated
//! when the result is applied.
//!
//! Failure policy differs by operation: generation never fails because of the model
//! (it falls back to deterministic demo slides), while editing, analysis and chat
//! hand the upstream failure back to the caller.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::managers::session_store::{unix_timestamp, SessionStore, SessionStoreTrait};
use crate::services::llm_client::LlmClient;
use crate::services::prompts;
use crate::services::response_parser;
use crate::types::ai::JsonShape;
use crate::types::deck::{assign_missing_ids, BorderStyle, Element, ElementKind, ShapeKind, Slide};
use crate::types::errors::{DeckError, SessionError};
use crate::types::suggestion::SlideAnalysis;

pub const MIN_SLIDE_COUNT: usize = 1;
pub const MAX_SLIDE_COUNT: usize = 20;
pub const DEFAULT_SLIDE_COUNT: i64 = 5;

/// Clamps a requested slide count into `[1, 20]`.
pub fn clamp_slide_count(requested: i64) -> usize {
    requested.clamp(MIN_SLIDE_COUNT as i64, MAX_SLIDE_COUNT as i64) as usize
}

/// Where a generated deck came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationSource {
    Ai,
    Demo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub slides: Vec<Slide>,
    pub source: GenerationSource,
}

/// Deterministic network-free deck: a title slide with a rule under the title, then
/// content slides whose shape and color cycle with period 3.
pub fn demo_slides(topic: &str, slide_count: usize) -> Vec<Slide> {
    (0..slide_count).map(|index| demo_slide(topic, index)).collect()
}

fn demo_slide(topic: &str, index: usize) -> Slide {
    if index == 0 {
        let mut slide = Slide::new(topic, "Presentation introduction");
        let mut rule = Element::new("shape_0_0", ElementKind::Shape(ShapeKind::Rectangle));
        rule.x = 100.0;
        rule.y = 300.0;
        rule.width = 600.0;
        rule.height = 5.0;
        rule.style.color = Some("#3498db".to_string());
        rule.style.border_style = Some(BorderStyle::Solid);
        slide.elements.push(rule);
        return slide;
    }

    let (shape, color) = match index % 3 {
        0 => (ShapeKind::Circle, "#2ecc71"),
        1 => (ShapeKind::Rectangle, "#e74c3c"),
        _ => (ShapeKind::Triangle, "#f1c40f"),
    };
    let mut slide = Slide::new(
        format!("{} - Slide {}", topic, index + 1),
        format!("This slide covers {}.", topic),
    );
    let mut element = Element::new(format!("shape_{}_0", index), ElementKind::Shape(shape));
    element.x = 500.0;
    element.y = 150.0;
    element.width = 100.0;
    element.height = 100.0;
    element.style.color = Some(color.to_string());
    element.style.border_style = Some(BorderStyle::Solid);
    slide.elements.push(element);
    slide
}

/// Drops non-renderable elements, synthesizes missing ids and removes duplicate ids.
fn normalize_generated(slides: &mut [Slide], stamp: i64) {
    for (index, slide) in slides.iter_mut().enumerate() {
        slide.elements.retain(|e| e.kind.is_renderable());
        slide.assign_missing_ids(index, stamp);
        let elements = std::mem::take(&mut slide.elements);
        slide.merge_elements(elements);
    }
}

/// Slide mutators backed by a session store and a completion client.
pub struct SlideService {
    store: Arc<SessionStore>,
    llm: Arc<dyn LlmClient>,
}

impl SlideService {
    pub fn new(store: Arc<SessionStore>, llm: Arc<dyn LlmClient>) -> Self {
        Self { store, llm }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Replaces the session's slides with a generated deck. Model failures of any kind
    /// downgrade to [`demo_slides`]; only store errors are returned.
    pub async fn generate_from_topic(
        &self,
        session_id: &str,
        topic: &str,
        slide_count: i64,
    ) -> Result<GenerationOutcome, DeckError> {
        let count = clamp_slide_count(slide_count);
        self.store.ensure_session(session_id);
        info!(session_id = %session_id, topic = %topic, count, "Generating slides");

        let (slides, source) = match self.generate_with_ai(topic, count).await {
            Ok(slides) => (slides, GenerationSource::Ai),
            Err(e) => {
                warn!(error = %e, "Falling back to demo slides");
                (demo_slides(topic, count), GenerationSource::Demo)
            }
        };

        self.store.replace_slides(session_id, slides.clone())?;
        Ok(GenerationOutcome { slides, source })
    }

    async fn generate_with_ai(&self, topic: &str, count: usize) -> Result<Vec<Slide>, DeckError> {
        let text = self.llm.complete(&prompts::generation_messages(topic, count)).await?;
        let value = response_parser::ingest(&text, JsonShape::Array)?;
        let mut slides = response_parser::parse_slides(&value)?;
        normalize_generated(&mut slides, unix_timestamp());
        Ok(slides)
    }

    /// Asks the model for new elements and appends them to one slide. Returns the
    /// slide's full element list afterwards. Upstream and parse failures are returned as-is.
    pub async fn add_elements_with_ai(
        &self,
        session_id: &str,
        slide_index: usize,
        prompt: &str,
    ) -> Result<Vec<Element>, DeckError> {
        let slide = self
            .store
            .read_session(session_id, |session| session.slide(slide_index).cloned())??;

        let text = self
            .llm
            .complete(&prompts::element_edit_messages(&slide, prompt))
            .await?;
        let value = response_parser::ingest(&text, JsonShape::Array)?;
        let mut incoming = response_parser::parse_elements(&value, slide.elements.len());
        if incoming.is_empty() {
            return Err(DeckError::NoUsableElements);
        }

        let stamp = unix_timestamp();
        let elements = self.store.with_session(session_id, |session| {
            let slide = session.slide_mut(slide_index)?;
            assign_missing_ids(&mut incoming, slide_index, slide.elements.len(), stamp, &slide.elements);
            let added = slide.merge_elements(incoming);
            info!(session_id = %session_id, slide_index, added, "Added AI elements");
            Ok(slide.elements.clone())
        })?;
        Ok(elements)
    }

    /// Reviews the deck and stores the suggestions in the session.
    pub async fn analyze_slides(&self, session_id: &str) -> Result<SlideAnalysis, DeckError> {
        let slides = self.store.read_session(session_id, |session| session.slides.clone())?;
        if slides.is_empty() {
            return Ok(SlideAnalysis::default());
        }

        let text = self.llm.complete(&prompts::analysis_messages(&slides)).await?;
        let value = response_parser::ingest(&text, JsonShape::Object)?;
        let analysis = response_parser::parse_analysis(&value, slides.len())?;

        self.store.with_session(session_id, |session| {
            session.extensions.ai_suggestions = analysis.improvement_suggestions.clone();
            Ok(())
        })?;
        info!(
            session_id = %session_id,
            suggestions = analysis.improvement_suggestions.len(),
            "Analyzed slides"
        );
        Ok(analysis)
    }

    /// Applies one suggestion's changes to its slide and returns the updated slide.
    ///
    /// Uses `analysis` when given, otherwise the suggestions stored by the last
    /// [`analyze_slides`](Self::analyze_slides). Title and content are overwritten; elements
    /// are appended only when their id is new on the slide. Nothing changes on error.
    pub fn apply_suggestion(
        &self,
        session_id: &str,
        suggestion_index: usize,
        analysis: Option<&SlideAnalysis>,
    ) -> Result<Slide, DeckError> {
        let stamp = unix_timestamp();
        let slide = self.store.with_session(session_id, |session| {
            let suggestions = match analysis {
                Some(analysis) => &analysis.improvement_suggestions,
                None => &session.extensions.ai_suggestions,
            };
            let suggestion = suggestions.get(suggestion_index).cloned().ok_or(
                SessionError::InvalidSuggestionIndex {
                    index: suggestion_index,
                    len: suggestions.len(),
                },
            )?;

            let slide_index = suggestion.slide_index;
            let slide = session.slide_mut(slide_index)?;
            if let Some(changes) = suggestion.changes {
                if let Some(title) = changes.title {
                    slide.title = title;
                }
                if let Some(content) = changes.content {
                    slide.content = content;
                }
                if let Some(elements) = changes.elements {
                    let mut incoming = response_parser::parse_elements(&elements, slide.elements.len());
                    assign_missing_ids(&mut incoming, slide_index, slide.elements.len(), stamp, &slide.elements);
                    slide.merge_elements(incoming);
                }
            }
            Ok(slide.clone())
        })?;
        info!(session_id = %session_id, suggestion_index, "Applied suggestion");
        Ok(slide)
    }

    /// Assistant chat. With `slide_index`, the slide is passed to the model as context.
    pub async fn chat(
        &self,
        session_id: &str,
        message: &str,
        slide_index: Option<usize>,
    ) -> Result<String, DeckError> {
        let context = match slide_index {
            Some(index) => Some((
                index,
                self.store
                    .read_session(session_id, |session| session.slide(index).cloned())??,
            )),
            None => None,
        };

        let messages = prompts::chat_messages(message, context.as_ref().map(|(i, s)| (*i, s)));
        Ok(self.llm.complete(&messages).await?)
    }
}
