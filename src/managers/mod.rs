// Slidesmith state managers
// Managers own stateful data: the per-session slide decks.

pub mod session_store;
