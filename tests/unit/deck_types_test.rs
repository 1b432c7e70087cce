//! Unit tests for the deck document model and its lenient coercion rules.

use rstest::rstest;
use serde_json::json;
use slidesmith::types::deck::*;
use slidesmith::types::session::{DeckSetting, Session};
use slidesmith::types::settings::DeckSettings;
use slidesmith::types::suggestion::{Priority, SlideAnalysis, Suggestion};

// === ShapeKind Tests ===

#[rstest]
#[case("rectangle", ShapeKind::Rectangle)]
#[case("RECT", ShapeKind::Rectangle)]
#[case("ellipse", ShapeKind::Oval)]
#[case("right_triangle", ShapeKind::RightTriangle)]
#[case("Double Arrow", ShapeKind::DoubleArrow)]
#[case("arc", ShapeKind::Curve)]
#[case(" star ", ShapeKind::Star)]
fn shape_tags_parse_with_aliases(#[case] tag: &str, #[case] expected: ShapeKind) {
    assert_eq!(ShapeKind::from_tag(tag), Some(expected));
}

#[test]
fn every_shape_round_trips_through_its_tag() {
    for kind in ShapeKind::ALL {
        assert_eq!(ShapeKind::from_tag(kind.as_str()), Some(kind));
    }
}

#[test]
fn unknown_shape_content_downlevels_to_rectangle() {
    let element = Element::from_value(&json!({"type": "shape", "content": "dodecahedron"}), 0).unwrap();
    assert_eq!(element.kind, ElementKind::Shape(ShapeKind::Rectangle));
}

// === Element Coercion Tests ===

#[test]
fn element_defaults_fill_missing_geometry() {
    let element = Element::from_value(&json!({"type": "text", "content": "hi"}), 3).unwrap();
    assert_eq!(element.id, "");
    assert_eq!(element.kind, ElementKind::Text("hi".to_string()));
    assert_eq!((element.x, element.y), (DEFAULT_X, DEFAULT_Y));
    assert_eq!((element.width, element.height), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
    assert_eq!(element.rotation, 0.0);
    assert_eq!(element.z_index, 3);
}

#[test]
fn element_coerces_numeric_strings_and_clamps() {
    let element = Element::from_value(
        &json!({
            "id": "e1",
            "type": "shape",
            "content": "circle",
            "x": "120",
            "y": 40,
            "width": -20,
            "height": "50px",
            "rotation": -90,
            "zIndex": "7"
        }),
        0,
    )
    .unwrap();
    assert_eq!(element.x, 120.0);
    assert_eq!(element.width, 0.0);
    assert_eq!(element.height, 50.0);
    assert_eq!(element.rotation, 270.0);
    assert_eq!(element.z_index, 7);
}

#[test]
fn rotation_of_full_turn_normalizes_to_zero() {
    let element = Element::from_value(&json!({"type": "text", "rotation": 720}), 0).unwrap();
    assert_eq!(element.rotation, 0.0);
}

#[test]
fn invalid_style_values_are_dropped() {
    let element = Element::from_value(
        &json!({
            "type": "text",
            "content": "x",
            "style": {
                "color": "blue",
                "borderStyle": "wavy",
                "fontSize": "16px",
                "textAlign": "justify",
                "fontFamily": "Pretendard"
            }
        }),
        0,
    )
    .unwrap();
    assert_eq!(element.style.color, None);
    assert_eq!(element.style.border_style, None);
    assert_eq!(element.style.font_size, Some(16.0));
    assert_eq!(element.style.text_align, None);
    assert_eq!(element.style.extra.get("fontFamily"), Some(&json!("Pretendard")));
}

#[test]
fn short_hex_colors_are_expanded() {
    let element = Element::from_value(&json!({"type": "shape", "style": {"color": "#F0A"}}), 0).unwrap();
    assert_eq!(element.style.color.as_deref(), Some("#ff00aa"));
}

#[test]
fn element_without_type_infers_shape_from_content() {
    let shape = Element::from_value(&json!({"content": "hexagon"}), 0).unwrap();
    assert_eq!(shape.kind, ElementKind::Shape(ShapeKind::Hexagon));

    let text = Element::from_value(&json!({"content": "Quarterly revenue"}), 0).unwrap();
    assert_eq!(text.kind, ElementKind::Text("Quarterly revenue".to_string()));
}

#[test]
fn unknown_element_types_are_kept_verbatim() {
    let value = json!({"id": "c1", "type": "chart", "content": {"series": [1, 2, 3]}, "x": 1, "y": 2});
    let element = Element::from_value(&value, 0).unwrap();
    assert!(!element.kind.is_renderable());
    assert_eq!(element.kind.type_tag(), "chart");

    let back = element.to_value();
    assert_eq!(back["type"], "chart");
    assert_eq!(back["content"], json!({"series": [1, 2, 3]}));
}

#[test]
fn unknown_element_fields_survive_serialization() {
    let element = Element::from_value(&json!({"id": "a", "type": "text", "locked": true}), 0).unwrap();
    let value = serde_json::to_value(&element).unwrap();
    assert_eq!(value["locked"], true);
    assert_eq!(value["zIndex"], 0);
}

#[test]
fn non_object_element_is_rejected() {
    assert!(Element::from_value(&json!("rectangle"), 0).is_none());
    assert!(serde_json::from_value::<Element>(json!(42)).is_err());
}

// === Slide Tests ===

#[test]
fn single_element_object_is_wrapped_into_a_list() {
    let slide = Slide::from_value(&json!({
        "title": "T",
        "content": "C",
        "elements": {"id": "only", "type": "shape", "content": "star"}
    }))
    .unwrap();
    assert_eq!(slide.elements.len(), 1);
    assert_eq!(slide.elements[0].id, "only");
}

#[test]
fn bullet_array_content_is_joined() {
    let slide = Slide::from_value(&json!({"title": "T", "content": ["one", "two"]})).unwrap();
    assert_eq!(slide.content, "one\ntwo");
    assert!(slide.elements.is_empty());
}

#[test]
fn slide_keeps_background_and_unknown_fields() {
    let value = json!({
        "title": "T",
        "content": "",
        "elements": [],
        "background": {"type": "solid", "color": "#ffffff"},
        "notes": "speaker notes"
    });
    let slide: Slide = serde_json::from_value(value).unwrap();
    assert_eq!(slide.background.as_ref().and_then(|b| b.color.as_deref()), Some("#ffffff"));

    let back = serde_json::to_value(&slide).unwrap();
    assert_eq!(back["notes"], "speaker notes");
    assert_eq!(back["background"]["type"], "solid");
}

#[test]
fn assign_missing_ids_uses_slide_and_position() {
    let mut slide = Slide::from_value(&json!({
        "elements": [{"type": "text"}, {"id": "keep", "type": "text"}, {"type": "text"}]
    }))
    .unwrap();
    slide.assign_missing_ids(2, 99);
    let ids: Vec<&str> = slide.elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["elem_2_0_99", "keep", "elem_2_2_99"]);
}

#[test]
fn merge_elements_drops_duplicates_without_overwriting() {
    let mut slide = Slide::new("T", "C");
    let mut original = Element::new("a", ElementKind::Text("original".to_string()));
    original.x = 5.0;
    slide.elements.push(original.clone());

    let incoming = vec![
        Element::new("a", ElementKind::Text("replacement".to_string())),
        Element::new("b", ElementKind::Text("new".to_string())),
        Element::new("b", ElementKind::Text("dup in batch".to_string())),
    ];
    let added = slide.merge_elements(incoming);

    assert_eq!(added, 1);
    assert_eq!(slide.elements.len(), 2);
    assert_eq!(slide.elements[0], original);
    assert_eq!(slide.elements[1].kind, ElementKind::Text("new".to_string()));
}

// === Suggestion Tests ===

#[test]
fn suggestion_parses_camel_case_with_defaults() {
    let suggestion: Suggestion = serde_json::from_value(json!({
        "slideIndex": 1,
        "suggestion": "Shorten the title",
        "priority": "HIGH",
        "changes": {"title": "Short"}
    }))
    .unwrap();
    assert_eq!(suggestion.slide_index, 1);
    assert_eq!(suggestion.priority, Priority::High);
    assert!(!suggestion.auto_applicable);
    assert_eq!(suggestion.changes.unwrap().title.as_deref(), Some("Short"));
}

#[test]
fn unknown_priority_reads_as_medium() {
    let suggestion: Suggestion =
        serde_json::from_value(json!({"slideIndex": 0, "priority": "urgent"})).unwrap();
    assert_eq!(suggestion.priority, Priority::Medium);
}

#[test]
fn analysis_serializes_with_wire_names() {
    let analysis = SlideAnalysis {
        improvement_suggestions: vec![Suggestion {
            slide_index: 0,
            suggestion: "Add a visual".to_string(),
            priority: Priority::Low,
            auto_applicable: true,
            changes: None,
        }],
        summary: None,
    };
    let value = serde_json::to_value(&analysis).unwrap();
    assert_eq!(value["improvementSuggestions"][0]["slideIndex"], 0);
    assert_eq!(value["improvementSuggestions"][0]["autoApplicable"], true);
    assert_eq!(value["improvementSuggestions"][0]["priority"], "low");
}

// === Session Tests ===

#[test]
fn new_session_uses_deck_defaults() {
    let session = Session::new(&DeckSettings::default(), 42);
    assert!(session.slides.is_empty());
    assert_eq!(session.theme, "default");
    assert_eq!(session.color_palette, "blue");
    assert_eq!(session.font_family, "Pretendard");
    assert!(!session.extensions.ai_enabled);
    assert!(session.extensions.flags.is_empty());
    assert_eq!(session.created_at, 42);
}

#[test]
fn session_serializes_with_wire_names() {
    let session = Session::new(&DeckSettings::default(), 0);
    let value = serde_json::to_value(&session).unwrap();
    assert!(value.get("colorPalette").is_some());
    assert!(value.get("fontFamily").is_some());
    assert!(value["extensions"].get("aiEnabled").is_some());
    assert!(value["extensions"].get("aiSuggestions").is_some());
    assert!(value["extensions"].get("versionHistory").is_some());
}

#[rstest]
#[case("theme", DeckSetting::Theme)]
#[case("colorPalette", DeckSetting::ColorPalette)]
#[case("palette", DeckSetting::ColorPalette)]
#[case("font_family", DeckSetting::FontFamily)]
fn deck_setting_keys_parse(#[case] key: &str, #[case] expected: DeckSetting) {
    assert_eq!(key.parse::<DeckSetting>().unwrap(), expected);
}

#[test]
fn unknown_deck_setting_is_rejected() {
    assert!("layout".parse::<DeckSetting>().is_err());
}
