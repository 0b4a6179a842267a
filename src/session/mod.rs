use sha2::{Digest, Sha256};

use crate::error::EngineError;
use crate::models::{Consultation, Event};
use crate::notify::Notifier;
use crate::store::{ConsultationStore, SessionOutcome};

/// Opaque handle the external media layer consumes. The engine only mints and
/// records it; the call itself happens elsewhere.
pub type SessionHandle = String;

/// Mints call session handles for consultations that are `scheduled` or
/// `in_progress`. Idempotent: repeated initiation returns the handle already
/// on record, the store's set-if-absent write resolves concurrent initiation.
pub struct SessionInitiator {
    store: ConsultationStore,
    notifier: Notifier,
}

impl SessionInitiator {
    pub fn new(store: ConsultationStore, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn initiate(&self, consultation_id: &str) -> Result<SessionHandle, EngineError> {
        let consultation = self
            .store
            .get(consultation_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(consultation_id.to_string()))?;

        let handle = mint_handle(&consultation);
        match self
            .store
            .record_session_handle(consultation_id, &handle)
            .await?
        {
            SessionOutcome::Recorded(handle) => {
                tracing::info!(consultation = %consultation_id, "call session provisioned");
                self.notifier.publish(Event::SessionReady {
                    consultation_id: consultation_id.to_string(),
                    session_handle: handle.clone(),
                });
                Ok(handle)
            }
            SessionOutcome::Existing(handle) => Ok(handle),
            SessionOutcome::Missing => Err(EngineError::NotFound(consultation_id.to_string())),
            SessionOutcome::Ineligible(status) => Err(EngineError::InvalidState(status)),
        }
    }
}

/// Deterministic 16-char hex token over the record's immutable identity, so
/// even a double mint for the same consultation produces the same handle.
fn mint_handle(consultation: &Consultation) -> SessionHandle {
    let mut hasher = Sha256::new();
    hasher.update(consultation.id.as_bytes());
    hasher.update(consultation.created_at.to_rfc3339().as_bytes());
    let digest = hasher.finalize();
    format!("call-{}", hex::encode(&digest[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsultationStatus, NewConsultation};
    use tempfile::TempDir;

    async fn setup() -> (SessionInitiator, ConsultationStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = ConsultationStore::new(temp.path().to_path_buf());
        store.init().await.unwrap();
        let initiator = SessionInitiator::new(store.clone(), Notifier::default());
        (initiator, store, temp)
    }

    async fn in_progress(store: &ConsultationStore) -> Consultation {
        let c = NewConsultation::Direct {
            farmer_id: "farmer-1".to_string(),
            consultant_id: "exp-1".to_string(),
            topic: "t".to_string(),
        }
        .build();
        store.insert(&c).await.unwrap();
        c
    }

    #[tokio::test]
    async fn initiate_mints_and_records_handle() {
        let (initiator, store, _temp) = setup().await;
        let c = in_progress(&store).await;

        let handle = initiator.initiate(&c.id).await.unwrap();
        assert!(handle.starts_with("call-"));

        let stored = store.get(&c.id).await.unwrap().unwrap();
        assert_eq!(stored.session_handle.as_deref(), Some(handle.as_str()));
    }

    #[tokio::test]
    async fn initiate_twice_returns_identical_handle() {
        let (initiator, store, _temp) = setup().await;
        let c = in_progress(&store).await;

        let first = initiator.initiate(&c.id).await.unwrap();
        let second = initiator.initiate(&c.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn initiate_on_pending_is_invalid_state() {
        let (initiator, store, _temp) = setup().await;
        let c = NewConsultation::Marketplace {
            farmer_id: "farmer-1".to_string(),
            topic: "t".to_string(),
            scheduled_for: None,
        }
        .build();
        store.insert(&c).await.unwrap();

        let result = initiator.initiate(&c.id).await;
        assert!(matches!(
            result,
            Err(EngineError::InvalidState(ConsultationStatus::Pending))
        ));
    }

    #[tokio::test]
    async fn initiate_on_scheduled_is_eligible() {
        let (initiator, store, _temp) = setup().await;
        let c = NewConsultation::Marketplace {
            farmer_id: "farmer-1".to_string(),
            topic: "t".to_string(),
            scheduled_for: None,
        }
        .build();
        store.insert(&c).await.unwrap();
        store.try_claim(&c.id, "exp-1").await.unwrap();

        assert!(initiator.initiate(&c.id).await.is_ok());
    }

    #[tokio::test]
    async fn initiate_unknown_id_is_not_found() {
        let (initiator, _store, _temp) = setup().await;
        let result = initiator.initiate("consult-ghost").await;
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn concurrent_initiation_converges_on_one_handle() {
        let (initiator, store, _temp) = setup().await;
        let c = in_progress(&store).await;
        let initiator = std::sync::Arc::new(initiator);

        let calls = (0..8).map(|_| {
            let initiator = initiator.clone();
            let id = c.id.clone();
            tokio::spawn(async move { initiator.initiate(&id).await.unwrap() })
        });
        let handles = futures::future::join_all(calls).await;

        let mut tokens: Vec<String> = handles.into_iter().map(|h| h.unwrap()).collect();
        tokens.dedup();
        assert_eq!(tokens.len(), 1);
    }
}
