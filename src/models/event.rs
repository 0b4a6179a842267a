use serde::{Deserialize, Serialize};

use super::{ActorId, ConsultationId};

/// Notifications published for the UI layer: refresh the pending list when a
/// request opens or disappears, congratulate the winning claimant, surface the
/// session handle once minted. Delivery beyond the in-process channel is an
/// external concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    ConsultationOpened {
        consultation_id: ConsultationId,
        farmer_id: ActorId,
        topic: String,
    },
    ConsultationClaimed {
        consultation_id: ConsultationId,
        consultant_id: ActorId,
        topic: String,
    },
    SessionReady {
        consultation_id: ConsultationId,
        session_handle: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_kind_tag() {
        let event = Event::ConsultationClaimed {
            consultation_id: "consult-1".to_string(),
            consultant_id: "exp-2".to_string(),
            topic: "Pest control".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"consultation_claimed\""));
        assert!(json.contains("\"consultant_id\":\"exp-2\""));
    }
}
