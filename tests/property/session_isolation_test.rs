//! Property-based tests for session isolation and version history bounds.
//!
//! Random operation sequences are applied to a handful of sessions and checked
//! against a simple model of what each session should contain.

use std::collections::HashMap;

use proptest::prelude::*;
use slidesmith::managers::session_store::{SessionStore, SessionStoreTrait};
use slidesmith::types::deck::Slide;
use slidesmith::types::session::DeckSetting;
use slidesmith::types::settings::DeckSettings;

const SESSIONS: [&str; 3] = ["alpha", "beta", "gamma"];

#[derive(Debug, Clone)]
enum Op {
    Replace { session: usize, titles: Vec<String> },
    Theme { session: usize, theme: String },
    ToggleAi { session: usize, enabled: bool },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..SESSIONS.len(), proptest::collection::vec("[A-Z][a-z]{0,6}", 0..4))
            .prop_map(|(session, titles)| Op::Replace { session, titles }),
        (0..SESSIONS.len(), "[a-z]{1,8}").prop_map(|(session, theme)| Op::Theme { session, theme }),
        (0..SESSIONS.len(), any::<bool>()).prop_map(|(session, enabled)| Op::ToggleAi { session, enabled }),
    ]
}

#[derive(Debug, Clone, Default)]
struct Model {
    titles: Vec<String>,
    theme: Option<String>,
    ai: bool,
    snapshots: usize,
}

// **Property 5: Sessions are isolated**
//
// *For any* sequence of replace / theme / flag operations across several
// sessions, each session holds exactly the result of its own operations, and
// version history never exceeds the configured limit.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn sessions_are_isolated(ops in proptest::collection::vec(arb_op(), 1..30), limit in 0usize..4) {
        let store = SessionStore::new(DeckSettings { version_history_limit: limit, ..DeckSettings::default() });
        let mut models: HashMap<&str, Model> = HashMap::new();
        for id in SESSIONS {
            store.create_session(id);
            models.insert(id, Model::default());
        }

        for op in &ops {
            match op {
                Op::Replace { session, titles } => {
                    let id = SESSIONS[*session];
                    let slides = titles.iter().map(|t| Slide::new(t.clone(), "")).collect();
                    store.replace_slides(id, slides).unwrap();
                    let model = models.get_mut(id).unwrap();
                    model.titles = titles.clone();
                    if model.ai && limit > 0 {
                        model.snapshots = (model.snapshots + 1).min(limit);
                    }
                }
                Op::Theme { session, theme } => {
                    let id = SESSIONS[*session];
                    store.update_setting(id, DeckSetting::Theme, theme).unwrap();
                    models.get_mut(id).unwrap().theme = Some(theme.clone());
                }
                Op::ToggleAi { session, enabled } => {
                    let id = SESSIONS[*session];
                    store.toggle_extension(id, "ai", *enabled).unwrap();
                    models.get_mut(id).unwrap().ai = *enabled;
                }
            }
        }

        for id in SESSIONS {
            let session = store.get_session(id).unwrap();
            let model = &models[id];
            let titles: Vec<String> = session.slides.iter().map(|s| s.title.clone()).collect();
            prop_assert_eq!(&titles, &model.titles);
            prop_assert_eq!(session.theme.as_str(), model.theme.as_deref().unwrap_or("default"));
            prop_assert_eq!(session.extensions.ai_enabled, model.ai);
            prop_assert!(session.extensions.version_history.len() <= limit);
            prop_assert_eq!(session.extensions.version_history.len(), model.snapshots);
            prop_assert_eq!(store.get_slides(id), store.get_slides(id));
        }
        prop_assert_eq!(store.session_count(), SESSIONS.len());
    }
}
