//! Slidesmith — session-scoped slide deck editor backend.
//!
//! Keeps one in-memory deck per browser session, fills and edits decks through an
//! OpenAI-compatible chat-completion API with a deterministic offline fallback, and
//! exports decks as PPTX. This library crate exposes all modules for use by the
//! binary and integration tests.

pub mod api;
pub mod app;
pub mod managers;
pub mod services;
pub mod types;
