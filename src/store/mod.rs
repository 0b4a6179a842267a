mod consultations;
mod experts;

pub use consultations::{ClaimOutcome, ConsultationStore, SessionOutcome, TransitionOutcome};
pub use experts::ExpertStore;

use thiserror::Error;

/// Failures talking to the backing store. I/O and parse trouble is transient
/// and may be retried; `Duplicate` is permanent, the id is already taken.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store record is unreadable: {0}")]
    Corrupt(#[from] serde_yaml::Error),

    #[error("record already exists: {0}")]
    Duplicate(String),
}
