// Prompt builders for the chat-completion calls.
// Each builder returns the full message list: a system message fixing the output
// contract and a user message carrying the request.

use crate::types::ai::ChatMessage;
use crate::types::deck::{ShapeKind, Slide};

const ELEMENT_SCHEMA: &str = r##"{
  "type": "shape" | "text" | "image",
  "content": "text, image reference, or shape kind",
  "id": "unique id",
  "x": number,
  "y": number,
  "width": number,
  "height": number,
  "rotation": number (degrees, 0-360),
  "style": {
    "color": "#RRGGBB",
    "borderStyle": "solid" | "dashed" | "dotted",
    "fontSize": number (px),
    "textAlign": "left" | "center" | "right"
  },
  "zIndex": number
}"##;

fn shape_vocabulary() -> String {
    ShapeKind::ALL
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Deck outline for a topic.
pub fn generation_messages(topic: &str, slide_count: usize) -> Vec<ChatMessage> {
    let system = format!(
        "You are a professional presentation designer. Build a presentation structure \
         for the topic and slide count the user gives you.\n\
         Every slide has a title and content, and may suggest visual elements \
         (shapes, text boxes, images).\n\n\
         Reply with a JSON array in this form:\n\
         [{{\"title\": \"Slide title\", \"content\": \"Slide content\", \"elements\": [{}]}}]\n\n\
         Shape kinds: {}.\n\
         Reply with JSON only. Do not add explanations.",
        ELEMENT_SCHEMA,
        shape_vocabulary()
    );
    let user = format!(
        "Topic: {topic}\nSlide count: {slide_count}\n\n\
         Create {slide_count} slides for this topic. The first slide is a title slide; \
         the rest are content slides that follow a logical flow. Keep each slide concise and clear."
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// New visual elements for one slide.
pub fn element_edit_messages(slide: &Slide, request: &str) -> Vec<ChatMessage> {
    let system = format!(
        "You edit the visual elements of presentation slides. Following the user's request, \
         return the elements to add (shapes, text boxes, images) as JSON.\n\n\
         Each element has this form:\n{}\n\n\
         Shape kinds: {}.\n\n\
         Reply with JSON only. Do not add explanations.",
        ELEMENT_SCHEMA,
        shape_vocabulary()
    );
    let user = format!(
        "Add the requested visual elements to this slide:\n\n\
         Title: {}\nContent: {}\n\nRequest: {}\n\n\
         Return a JSON array.",
        slide.title, slide.content, request
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Improvement review of a whole deck.
pub fn analysis_messages(slides: &[Slide]) -> Vec<ChatMessage> {
    let deck = serde_json::to_string_pretty(slides).unwrap_or_else(|_| "[]".to_string());
    let system = "You review presentation decks and propose concrete improvements.\n\n\
         Reply with a JSON object in this form:\n\
         {\"summary\": \"one-paragraph overview\", \"improvementSuggestions\": [{\
         \"slideIndex\": number, \"suggestion\": \"what to change and why\", \
         \"priority\": \"high\" | \"medium\" | \"low\", \"autoApplicable\": boolean, \
         \"changes\": {\"title\": \"...\", \"content\": \"...\", \"elements\": [...]}}]}\n\n\
         Only set autoApplicable when changes fully describe the edit. \
         Reply with JSON only. Do not add explanations.";
    let user = format!(
        "Analyze this presentation ({} slides, indexes start at 0):\n{}",
        slides.len(),
        deck
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Free-form assistant chat, optionally grounded in the slide being edited.
pub fn chat_messages(message: &str, context: Option<(usize, &Slide)>) -> Vec<ChatMessage> {
    let mut system = String::from(
        "You are a presentation assistant. Help the user improve their slides with \
         concise, practical advice.",
    );
    if let Some((index, slide)) = context {
        let slide_json = serde_json::to_string(slide).unwrap_or_default();
        system.push_str(&format!(
            "\n\nThe user is editing slide {} (index starts at 0):\n{}",
            index, slide_json
        ));
    }
    vec![ChatMessage::system(system), ChatMessage::user(message)]
}
