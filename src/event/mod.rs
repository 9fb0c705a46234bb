// Event-driven plumbing between the prediction lifecycle and the leaderboard.
//
// Writes to the prediction store emit facts on the bus; subscribers react
// (the leaderboard refresh subscriber republishes the ranking snapshot).

// Public API - what other modules can use
pub use bus::EventBus;
pub use events::PredictionEvent;
pub use handler::{EventError, PredictionEventHandler};
pub use subscription::EventSubscription;

// Internal modules
mod bus;
mod events;
mod handler;
mod subscription;
