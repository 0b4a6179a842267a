use thiserror::Error;

use crate::models::{ConsultationId, ConsultationStatus, ExpertId};
use crate::store::StoreError;

/// Error taxonomy for every engine operation. Callers can tell retryable
/// system trouble (`Store`) apart from caller errors (`InvalidTransition`,
/// `Unauthenticated`) and from "nothing to do" (`NotFound`, `AlreadyClaimed`).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("consultation not found: {0}")]
    NotFound(ConsultationId),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: ConsultationStatus,
        to: ConsultationStatus,
    },

    #[error("consultation {0} was already claimed")]
    AlreadyClaimed(ConsultationId),

    #[error("caller identity missing or not permitted")]
    Unauthenticated,

    #[error("expert not found: {0}")]
    ExpertNotFound(ExpertId),

    #[error("expert {0} is not available for direct calls")]
    ExpertUnavailable(ExpertId),

    #[error("consultation is {0}, no call session can be started")]
    InvalidState(ConsultationStatus),

    #[error("transient store failure")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Retry guidance for callers: only transient backing-store trouble is
    /// worth retrying unchanged. A duplicate id stays duplicate.
    #[allow(dead_code)]
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Store(StoreError::Duplicate(_)) => false,
            EngineError::Store(_) => true,
            _ => false,
        }
    }
}
