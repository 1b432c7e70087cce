//! Property-based tests for deterministic demo deck generation.
//!
//! The demo deck is what users get whenever the completion service is
//! unavailable, so its shape must hold for any topic and any requested count.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use slidesmith::managers::session_store::{SessionStore, SessionStoreTrait};
use slidesmith::services::llm_client::OfflineClient;
use slidesmith::services::slide_service::{
    clamp_slide_count, demo_slides, GenerationSource, SlideService, MAX_SLIDE_COUNT, MIN_SLIDE_COUNT,
};
use slidesmith::types::deck::{ElementKind, ShapeKind};
use slidesmith::types::settings::DeckSettings;

fn arb_topic() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z0-9 ]{1,40}",
        Just("기후 변화".to_string()),
        Just("R&D <roadmap>".to_string()),
    ]
}

// **Property 1: Demo deck shape**
//
// *For any* topic and requested count, the demo deck has the clamped number of
// slides, the topic as its first title, shapes cycling with period 3, and unique
// element ids on every slide.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn demo_deck_shape(topic in arb_topic(), requested in -10i64..40) {
        let count = clamp_slide_count(requested);
        prop_assert!((MIN_SLIDE_COUNT..=MAX_SLIDE_COUNT).contains(&count));

        let slides = demo_slides(&topic, count);
        prop_assert_eq!(slides.len(), count);
        prop_assert_eq!(&slides[0].title, &topic);

        for (index, slide) in slides.iter().enumerate().skip(1) {
            let expected = match index % 3 {
                0 => ShapeKind::Circle,
                1 => ShapeKind::Rectangle,
                _ => ShapeKind::Triangle,
            };
            prop_assert_eq!(&slide.elements[0].kind, &ElementKind::Shape(expected));
            prop_assert_eq!(slide.title.clone(), format!("{} - Slide {}", topic, index + 1));
        }

        for slide in &slides {
            let ids: HashSet<&str> = slide.elements.iter().map(|e| e.id.as_str()).collect();
            prop_assert_eq!(ids.len(), slide.elements.len());
        }
    }
}

// **Property 2: Demo deck determinism**
//
// *For any* topic and count, two generations are identical, and offline topic
// generation stores exactly that deck in the session.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn offline_generation_is_deterministic(topic in arb_topic(), requested in -5i64..30) {
        let count = clamp_slide_count(requested);
        prop_assert_eq!(demo_slides(&topic, count), demo_slides(&topic, count));

        let store = Arc::new(SessionStore::new(DeckSettings::default()));
        let service = SlideService::new(Arc::clone(&store), Arc::new(OfflineClient));
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let outcome = runtime
            .block_on(service.generate_from_topic("prop", &topic, requested))
            .unwrap();

        prop_assert_eq!(outcome.source, GenerationSource::Demo);
        prop_assert_eq!(&outcome.slides, &demo_slides(&topic, count));
        prop_assert_eq!(store.get_slides("prop"), outcome.slides);
    }
}
