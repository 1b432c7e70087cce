// Slidesmith shared type definitions
// Each submodule defines types used across the application.

pub mod ai;
pub mod deck;
pub mod errors;
pub mod session;
pub mod settings;
pub mod suggestion;
