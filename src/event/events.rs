use serde::{Deserialize, Serialize};

use crate::prediction::PredictionStatus;

/// Facts about prediction state that has already been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PredictionEvent {
    /// A new pending prediction was stored
    Created {
        prediction_id: String,
        user_id: String,
        match_id: String,
    },

    /// A pending prediction was withdrawn
    Deleted {
        prediction_id: String,
        user_id: String,
        match_id: String,
    },

    /// Pending predictions for a match were moved to a terminal status
    Resolved { match_id: String, resolved: usize },

    /// An administrator forced a terminal status on a prediction
    StatusOverridden {
        prediction_id: String,
        user_id: String,
        status: PredictionStatus,
    },
}

impl PredictionEvent {
    /// Get the match_id associated with this event, when known
    pub fn match_id(&self) -> Option<&str> {
        match self {
            PredictionEvent::Created { match_id, .. } => Some(match_id),
            PredictionEvent::Deleted { match_id, .. } => Some(match_id),
            PredictionEvent::Resolved { match_id, .. } => Some(match_id),
            PredictionEvent::StatusOverridden { .. } => None,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            PredictionEvent::Created { .. } => "prediction_created",
            PredictionEvent::Deleted { .. } => "prediction_deleted",
            PredictionEvent::Resolved { .. } => "predictions_resolved",
            PredictionEvent::StatusOverridden { .. } => "prediction_status_overridden",
        }
    }

    /// Whether user aggregates may differ after this event
    pub fn affects_standings(&self) -> bool {
        match self {
            PredictionEvent::Resolved { resolved, .. } => *resolved > 0,
            _ => true,
        }
    }
}
