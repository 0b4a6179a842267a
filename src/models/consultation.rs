use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use super::ActorId;

/// Unique identifier for consultations
pub type ConsultationId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    #[default]
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl ConsultationStatus {
    /// Legal forward transitions. Claiming moves `Pending` to `Scheduled`;
    /// completion is reachable from `Scheduled` or `InProgress`; cancellation
    /// from `Pending` or `Scheduled`. `Completed` and `Cancelled` are terminal.
    pub fn can_transition_to(self, to: ConsultationStatus) -> bool {
        use ConsultationStatus::*;
        matches!(
            (self, to),
            (Pending, Scheduled)
                | (Scheduled, Completed)
                | (InProgress, Completed)
                | (Pending, Cancelled)
                | (Scheduled, Cancelled)
        )
    }

    #[allow(dead_code)]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ConsultationStatus::Completed | ConsultationStatus::Cancelled
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConsultationStatus::Pending => "pending",
            ConsultationStatus::Scheduled => "scheduled",
            ConsultationStatus::InProgress => "in_progress",
            ConsultationStatus::Completed => "completed",
            ConsultationStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A consultation request and its full lifecycle record.
///
/// `consultant_id` unset is the "unclaimed" marker; it is set exactly once,
/// through the claim coordinator. Terminal records are retained for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: ConsultationId,
    pub farmer_id: ActorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultant_id: Option<ActorId>,
    pub status: ConsultationStatus,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_handle: Option<String>,
}

impl Consultation {
    #[allow(dead_code)]
    pub fn is_unclaimed(&self) -> bool {
        self.consultant_id.is_none()
    }

    pub fn is_assigned_to(&self, actor_id: &str) -> bool {
        self.consultant_id.as_deref() == Some(actor_id)
    }
}

/// The two creation paths, as one tagged constructor so the status machine
/// stays the single source of truth for legal initial states.
#[derive(Debug, Clone)]
pub enum NewConsultation {
    /// Marketplace path: created unbound and `Pending`, open to any consultant.
    Marketplace {
        farmer_id: ActorId,
        topic: String,
        scheduled_for: Option<DateTime<Utc>>,
    },
    /// Direct-call path: consultant pre-selected, record starts `InProgress`.
    Direct {
        farmer_id: ActorId,
        consultant_id: ActorId,
        topic: String,
    },
}

impl NewConsultation {
    pub fn build(self) -> Consultation {
        let created_at = Utc::now();
        match self {
            NewConsultation::Marketplace {
                farmer_id,
                topic,
                scheduled_for,
            } => Consultation {
                id: new_consultation_id(&farmer_id, created_at),
                farmer_id,
                consultant_id: None,
                status: ConsultationStatus::Pending,
                topic,
                created_at,
                scheduled_for,
                notes: None,
                session_handle: None,
            },
            NewConsultation::Direct {
                farmer_id,
                consultant_id,
                topic,
            } => Consultation {
                id: new_consultation_id(&farmer_id, created_at),
                farmer_id,
                consultant_id: Some(consultant_id),
                status: ConsultationStatus::InProgress,
                topic,
                created_at,
                scheduled_for: None,
                notes: None,
                session_handle: None,
            },
        }
    }
}

/// Mint a fresh consultation id: second-resolution timestamp for readability,
/// xxh3 over requester and nanoseconds for uniqueness within a second.
fn new_consultation_id(farmer_id: &str, created_at: DateTime<Utc>) -> ConsultationId {
    let seed = format!("{}:{}", farmer_id, created_at.timestamp_nanos_opt().unwrap_or(0));
    format!(
        "consult-{}-{:08x}",
        created_at.format("%Y%m%d-%H%M%S"),
        xxh3_64(seed.as_bytes()) as u32
    )
}
