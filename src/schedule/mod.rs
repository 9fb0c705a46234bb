// Public API - what other modules can use
pub use handlers::{list_matches, list_teams, record_outcome};
pub use models::{MatchModel, MatchOutcome, Participants, Team};
pub use provider::{InMemoryMatchOutcomeProvider, MatchOutcomeProvider};
pub use resolution_task::{resolve_pending_matches, start_resolution_task, ResolutionConfig};

// Internal modules
mod data;
mod handlers;
pub mod models;
pub mod provider;
mod resolution_task;
mod types;
