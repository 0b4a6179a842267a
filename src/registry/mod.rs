use std::sync::Arc;

use crate::error::EngineError;
use crate::identity::IdentityProvider;
use crate::models::{Actor, Consultation, ConsultationStatus};
use crate::store::{ConsultationStore, TransitionOutcome};

/// Data access over consultation records plus the guarded lifecycle
/// transitions. Every status change is validated against the transition table
/// and against the caller's identity; no other mutation is expressible here.
pub struct ConsultationRegistry {
    store: ConsultationStore,
    identity: Arc<dyn IdentityProvider>,
}

impl ConsultationRegistry {
    pub fn new(store: ConsultationStore, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    async fn require_actor(&self) -> Result<Actor, EngineError> {
        self.identity
            .current_actor()
            .await?
            .ok_or(EngineError::Unauthenticated)
    }

    pub async fn get(&self, id: &str) -> Result<Consultation, EngineError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    /// Open marketplace requests, oldest first.
    pub async fn list_pending(&self) -> Result<Vec<Consultation>, EngineError> {
        Ok(self.store.list_pending().await?)
    }

    /// Close out a consultation. Only the assigned consultant or an
    /// administrator may complete, and only from `scheduled` or `in_progress`.
    pub async fn complete(&self, id: &str) -> Result<Consultation, EngineError> {
        let actor = self.require_actor().await?;
        let consultation = self.get(id).await?;

        if !consultation
            .status
            .can_transition_to(ConsultationStatus::Completed)
        {
            return Err(EngineError::InvalidTransition {
                from: consultation.status,
                to: ConsultationStatus::Completed,
            });
        }
        if !actor.is_admin() && !consultation.is_assigned_to(&actor.id) {
            return Err(EngineError::Unauthenticated);
        }

        self.apply(id, ConsultationStatus::Completed).await
    }

    /// Withdraw a consultation before it completes. The requesting farmer,
    /// the assigned consultant, or an administrator may cancel, from `pending`
    /// or `scheduled` only.
    pub async fn cancel(&self, id: &str) -> Result<Consultation, EngineError> {
        let actor = self.require_actor().await?;
        let consultation = self.get(id).await?;

        if !consultation
            .status
            .can_transition_to(ConsultationStatus::Cancelled)
        {
            return Err(EngineError::InvalidTransition {
                from: consultation.status,
                to: ConsultationStatus::Cancelled,
            });
        }
        let permitted = actor.is_admin()
            || consultation.farmer_id == actor.id
            || consultation.is_assigned_to(&actor.id);
        if !permitted {
            return Err(EngineError::Unauthenticated);
        }

        self.apply(id, ConsultationStatus::Cancelled).await
    }

    async fn apply(
        &self,
        id: &str,
        to: ConsultationStatus,
    ) -> Result<Consultation, EngineError> {
        match self.store.apply_transition(id, to).await? {
            TransitionOutcome::Applied(c) => {
                tracing::info!(consultation = %c.id, status = %c.status, "consultation transitioned");
                Ok(c)
            }
            TransitionOutcome::Missing => Err(EngineError::NotFound(id.to_string())),
            // the record moved underneath us; report the state it reached
            TransitionOutcome::Rejected { from } => {
                Err(EngineError::InvalidTransition { from, to })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{AnonymousIdentity, StaticIdentity};
    use crate::models::{ActorRole, NewConsultation};
    use tempfile::TempDir;

    async fn store() -> (ConsultationStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = ConsultationStore::new(temp.path().to_path_buf());
        store.init().await.unwrap();
        (store, temp)
    }

    fn registry_as(store: &ConsultationStore, id: &str, role: ActorRole) -> ConsultationRegistry {
        ConsultationRegistry::new(
            store.clone(),
            Arc::new(StaticIdentity(Actor::new(id, role))),
        )
    }

    async fn pending(store: &ConsultationStore, farmer: &str) -> Consultation {
        let c = NewConsultation::Marketplace {
            farmer_id: farmer.to_string(),
            topic: "Blight on tomatoes".to_string(),
            scheduled_for: None,
        }
        .build();
        store.insert(&c).await.unwrap();
        c
    }

    async fn scheduled(store: &ConsultationStore, farmer: &str, consultant: &str) -> Consultation {
        let c = pending(store, farmer).await;
        match store.try_claim(&c.id, consultant).await.unwrap() {
            crate::store::ClaimOutcome::Claimed(c) => c,
            other => panic!("claim failed: {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let (store, _temp) = store().await;
        let registry = registry_as(&store, "exp-1", ActorRole::Consultant);

        let result = registry.get("consult-ghost").await;
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn complete_on_pending_is_invalid_transition() {
        let (store, _temp) = store().await;
        let c = pending(&store, "farmer-1").await;
        let registry = registry_as(&store, "admin-1", ActorRole::Admin);

        let result = registry.complete(&c.id).await;
        assert!(matches!(
            result,
            Err(EngineError::InvalidTransition {
                from: ConsultationStatus::Pending,
                to: ConsultationStatus::Completed,
            })
        ));
    }

    #[tokio::test]
    async fn assigned_consultant_completes_scheduled() {
        let (store, _temp) = store().await;
        let c = scheduled(&store, "farmer-1", "exp-1").await;
        let registry = registry_as(&store, "exp-1", ActorRole::Consultant);

        let done = registry.complete(&c.id).await.unwrap();
        assert_eq!(done.status, ConsultationStatus::Completed);
    }

    #[tokio::test]
    async fn other_consultant_cannot_complete() {
        let (store, _temp) = store().await;
        let c = scheduled(&store, "farmer-1", "exp-1").await;
        let registry = registry_as(&store, "exp-2", ActorRole::Consultant);

        let result = registry.complete(&c.id).await;
        assert!(matches!(result, Err(EngineError::Unauthenticated)));
    }

    #[tokio::test]
    async fn admin_completes_any_assigned_consultation() {
        let (store, _temp) = store().await;
        let c = scheduled(&store, "farmer-1", "exp-1").await;
        let registry = registry_as(&store, "admin-1", ActorRole::Admin);

        let done = registry.complete(&c.id).await.unwrap();
        assert_eq!(done.status, ConsultationStatus::Completed);
    }

    #[tokio::test]
    async fn anonymous_caller_is_rejected() {
        let (store, _temp) = store().await;
        let c = scheduled(&store, "farmer-1", "exp-1").await;
        let registry = ConsultationRegistry::new(store.clone(), Arc::new(AnonymousIdentity));

        let result = registry.complete(&c.id).await;
        assert!(matches!(result, Err(EngineError::Unauthenticated)));
    }

    #[tokio::test]
    async fn farmer_cancels_own_pending_request() {
        let (store, _temp) = store().await;
        let c = pending(&store, "farmer-1").await;
        let registry = registry_as(&store, "farmer-1", ActorRole::Farmer);

        let cancelled = registry.cancel(&c.id).await.unwrap();
        assert_eq!(cancelled.status, ConsultationStatus::Cancelled);
    }

    #[tokio::test]
    async fn unrelated_farmer_cannot_cancel() {
        let (store, _temp) = store().await;
        let c = pending(&store, "farmer-1").await;
        let registry = registry_as(&store, "farmer-2", ActorRole::Farmer);

        let result = registry.cancel(&c.id).await;
        assert!(matches!(result, Err(EngineError::Unauthenticated)));
    }

    #[tokio::test]
    async fn completed_consultation_cannot_be_cancelled() {
        let (store, _temp) = store().await;
        let c = scheduled(&store, "farmer-1", "exp-1").await;
        let registry = registry_as(&store, "exp-1", ActorRole::Consultant);
        registry.complete(&c.id).await.unwrap();

        let result = registry.cancel(&c.id).await;
        assert!(matches!(
            result,
            Err(EngineError::InvalidTransition {
                from: ConsultationStatus::Completed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn in_progress_direct_call_cannot_be_cancelled() {
        let (store, _temp) = store().await;
        let c = NewConsultation::Direct {
            farmer_id: "farmer-1".to_string(),
            consultant_id: "exp-1".to_string(),
            topic: "t".to_string(),
        }
        .build();
        store.insert(&c).await.unwrap();
        let registry = registry_as(&store, "farmer-1", ActorRole::Farmer);

        let result = registry.cancel(&c.id).await;
        assert!(matches!(
            result,
            Err(EngineError::InvalidTransition {
                from: ConsultationStatus::InProgress,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn list_pending_excludes_claimed_records() {
        let (store, _temp) = store().await;
        let open = pending(&store, "farmer-1").await;
        let claimed = scheduled(&store, "farmer-2", "exp-1").await;
        let registry = registry_as(&store, "exp-2", ActorRole::Consultant);

        let listed = registry.list_pending().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, open.id);
        assert_ne!(listed[0].id, claimed.id);
    }
}
