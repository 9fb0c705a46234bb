// Public API - what other modules can use
pub use handlers::{
    create_prediction, delete_prediction, get_prediction, list_match_predictions,
    list_predictions, list_user_predictions, list_week_predictions, update_prediction_status,
};
pub use models::{Prediction, PredictionStatus};
pub use repository::{
    DeleteResult, InMemoryPredictionStore, InsertResult, PostgresPredictionStore,
    PredictionStore, TransitionResult,
};
pub use service::{PredictionService, PredictionServiceBuilder, ResolutionSummary};
pub use types::{
    CreatePredictionRequest, MatchPredictionsResponse, PredictionsResponse,
    UpdateStatusRequest, UserPredictionsResponse, WeekPredictionsResponse,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
