// CSV import: upload parsing, text features/tagging, and the persistence
// pipeline behind the submission endpoint.

pub mod classifier;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod timestamps;

pub use orchestrator::{ImportOrchestrator, ImportSettings, Owner};
