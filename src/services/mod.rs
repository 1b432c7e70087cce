// Slidesmith services
// Services provide core functionality: AI ingestion, completion client, slide mutators, export, settings.

pub mod exporter;
pub mod llm_client;
pub mod pptx_writer;
pub mod prompts;
pub mod response_parser;
pub mod settings_engine;
pub mod slide_service;
