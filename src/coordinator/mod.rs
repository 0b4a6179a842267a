use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::identity::IdentityProvider;
use crate::models::{Actor, Consultation, ConsultationStatus, Event, NewConsultation};
use crate::notify::Notifier;
use crate::store::{ClaimOutcome, ConsultationStore, ExpertStore};

/// Performs the two operations that bind a consultant to a consultation: the
/// marketplace claim (conditional update, exactly one of N concurrent callers
/// wins) and the direct-call creation (fresh record, consultant pre-bound, no
/// contention possible).
pub struct ClaimCoordinator {
    consultations: ConsultationStore,
    experts: ExpertStore,
    identity: Arc<dyn IdentityProvider>,
    notifier: Notifier,
}

impl ClaimCoordinator {
    pub fn new(
        consultations: ConsultationStore,
        experts: ExpertStore,
        identity: Arc<dyn IdentityProvider>,
        notifier: Notifier,
    ) -> Self {
        Self {
            consultations,
            experts,
            identity,
            notifier,
        }
    }

    async fn require_actor(&self) -> Result<Actor, EngineError> {
        self.identity
            .current_actor()
            .await?
            .ok_or(EngineError::Unauthenticated)
    }

    /// Marketplace path: open an unbound pending request for the calling
    /// farmer. Any consultant may claim it later.
    pub async fn open_request(
        &self,
        topic: impl Into<String>,
        scheduled_for: Option<DateTime<Utc>>,
    ) -> Result<Consultation, EngineError> {
        let actor = self.require_actor().await?;
        let topic = topic.into();

        let consultation = NewConsultation::Marketplace {
            farmer_id: actor.id,
            topic: topic.clone(),
            scheduled_for,
        }
        .build();
        self.consultations.insert(&consultation).await?;

        tracing::info!(consultation = %consultation.id, "marketplace request opened");
        self.notifier.publish(Event::ConsultationOpened {
            consultation_id: consultation.id.clone(),
            farmer_id: consultation.farmer_id.clone(),
            topic,
        });

        Ok(consultation)
    }

    /// Claim a pending consultation for the calling consultant. The
    /// consultant id comes from the authenticated identity, never from the
    /// request. The bind itself is the store's conditional update; a lost
    /// race surfaces as `AlreadyClaimed` and leaves no trace on the record.
    pub async fn claim(&self, consultation_id: &str) -> Result<Consultation, EngineError> {
        let actor = self.require_actor().await?;

        match self
            .consultations
            .try_claim(consultation_id, &actor.id)
            .await?
        {
            ClaimOutcome::Claimed(consultation) => {
                tracing::info!(
                    consultation = %consultation.id,
                    consultant = %actor.id,
                    "claim won"
                );
                self.notifier.publish(Event::ConsultationClaimed {
                    consultation_id: consultation.id.clone(),
                    consultant_id: actor.id,
                    topic: consultation.topic.clone(),
                });
                Ok(consultation)
            }
            ClaimOutcome::Missing => Err(EngineError::NotFound(consultation_id.to_string())),
            ClaimOutcome::AlreadyClaimed => {
                Err(EngineError::AlreadyClaimed(consultation_id.to_string()))
            }
            ClaimOutcome::NotClaimable(from) => Err(EngineError::InvalidTransition {
                from,
                to: ConsultationStatus::Scheduled,
            }),
        }
    }

    /// Direct-call path: the farmer picks an available expert and the
    /// consultation is created already in progress with the consultant bound.
    /// Fresh-id generation makes double-assignment impossible here.
    pub async fn create_and_assign(
        &self,
        farmer_id: &str,
        expert_id: &str,
        topic: impl Into<String>,
    ) -> Result<Consultation, EngineError> {
        let actor = self.require_actor().await?;
        if actor.id != farmer_id {
            return Err(EngineError::Unauthenticated);
        }

        let expert = self
            .experts
            .get(expert_id)
            .await?
            .ok_or_else(|| EngineError::ExpertNotFound(expert_id.to_string()))?;
        if !expert.available {
            return Err(EngineError::ExpertUnavailable(expert.id));
        }

        let consultation = NewConsultation::Direct {
            farmer_id: farmer_id.to_string(),
            consultant_id: expert.id,
            topic: topic.into(),
        }
        .build();
        self.consultations.insert(&consultation).await?;

        tracing::info!(
            consultation = %consultation.id,
            consultant = ?consultation.consultant_id,
            "direct consultation created"
        );
        Ok(consultation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{AnonymousIdentity, StaticIdentity};
    use crate::models::{ActorRole, Expert};
    use tempfile::TempDir;

    struct Fixture {
        consultations: ConsultationStore,
        experts: ExpertStore,
        notifier: Notifier,
        _temp: TempDir,
    }

    async fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let consultations = ConsultationStore::new(temp.path().to_path_buf());
        consultations.init().await.unwrap();
        let experts = ExpertStore::new(temp.path().to_path_buf());
        experts.init().await.unwrap();
        Fixture {
            consultations,
            experts,
            notifier: Notifier::default(),
            _temp: temp,
        }
    }

    fn coordinator_as(fx: &Fixture, id: &str, role: ActorRole) -> ClaimCoordinator {
        ClaimCoordinator::new(
            fx.consultations.clone(),
            fx.experts.clone(),
            Arc::new(StaticIdentity(Actor::new(id, role))),
            fx.notifier.clone(),
        )
    }

    fn available_expert(id: &str) -> Expert {
        Expert {
            id: id.to_string(),
            name: format!("Expert {id}"),
            specialty: "Horticulture".to_string(),
            languages: vec!["en".to_string()],
            rating: 4.6,
            verified: true,
            available: true,
            price_per_minute: Some(40.0),
            experience: None,
        }
    }

    #[tokio::test]
    async fn open_request_creates_pending_and_notifies() {
        let fx = fixture().await;
        let coordinator = coordinator_as(&fx, "farmer-1", ActorRole::Farmer);
        let mut rx = fx.notifier.subscribe();

        let c = coordinator.open_request("Leaf curl", None).await.unwrap();

        assert_eq!(c.status, ConsultationStatus::Pending);
        assert!(c.is_unclaimed());
        assert_eq!(c.farmer_id, "farmer-1");

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, Event::ConsultationOpened { consultation_id, .. } if consultation_id == c.id));
    }

    #[tokio::test]
    async fn claim_binds_caller_and_notifies() {
        let fx = fixture().await;
        let farmer = coordinator_as(&fx, "farmer-1", ActorRole::Farmer);
        let c = farmer.open_request("Soil acidity", None).await.unwrap();

        let consultant = coordinator_as(&fx, "exp-1", ActorRole::Consultant);
        let mut rx = fx.notifier.subscribe();
        let claimed = consultant.claim(&c.id).await.unwrap();

        assert_eq!(claimed.status, ConsultationStatus::Scheduled);
        assert!(claimed.is_assigned_to("exp-1"));

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            Event::ConsultationClaimed { consultant_id, .. } if consultant_id == "exp-1"
        ));
    }

    #[tokio::test]
    async fn two_simultaneous_claims_one_wins_one_loses() {
        let fx = fixture().await;
        let farmer = coordinator_as(&fx, "farmer-1", ActorRole::Farmer);
        let c = farmer.open_request("Contested topic", None).await.unwrap();

        let x = coordinator_as(&fx, "exp-x", ActorRole::Consultant);
        let y = coordinator_as(&fx, "exp-y", ActorRole::Consultant);
        let id_x = c.id.clone();
        let id_y = c.id.clone();

        let (rx, ry) = tokio::join!(
            tokio::spawn(async move { x.claim(&id_x).await }),
            tokio::spawn(async move { y.claim(&id_y).await }),
        );
        let results = vec![rx.unwrap(), ry.unwrap()];

        let winners: Vec<&Consultation> =
            results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].status, ConsultationStatus::Scheduled);

        let losses = results
            .iter()
            .filter(|r| matches!(r, Err(EngineError::AlreadyClaimed(_))))
            .count();
        assert_eq!(losses, 1);

        // the stored consultant is the winner's
        let stored = fx.consultations.get(&c.id).await.unwrap().unwrap();
        assert_eq!(stored.consultant_id, winners[0].consultant_id);
    }

    #[tokio::test]
    async fn claim_on_scheduled_fails_with_already_claimed() {
        let fx = fixture().await;
        let farmer = coordinator_as(&fx, "farmer-1", ActorRole::Farmer);
        let c = farmer.open_request("t", None).await.unwrap();

        coordinator_as(&fx, "exp-1", ActorRole::Consultant)
            .claim(&c.id)
            .await
            .unwrap();

        let result = coordinator_as(&fx, "exp-2", ActorRole::Consultant)
            .claim(&c.id)
            .await;
        assert!(matches!(result, Err(EngineError::AlreadyClaimed(_))));
    }

    #[tokio::test]
    async fn claim_unknown_id_is_not_found() {
        let fx = fixture().await;
        let consultant = coordinator_as(&fx, "exp-1", ActorRole::Consultant);
        let result = consultant.claim("consult-ghost").await;
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn claim_without_identity_is_unauthenticated() {
        let fx = fixture().await;
        let coordinator = ClaimCoordinator::new(
            fx.consultations.clone(),
            fx.experts.clone(),
            Arc::new(AnonymousIdentity),
            fx.notifier.clone(),
        );
        let result = coordinator.claim("consult-1").await;
        assert!(matches!(result, Err(EngineError::Unauthenticated)));
    }

    #[tokio::test]
    async fn create_and_assign_starts_in_progress_bound() {
        let fx = fixture().await;
        fx.experts
            .save_all(&[available_expert("exp-1")])
            .await
            .unwrap();
        let coordinator = coordinator_as(&fx, "farmer-1", ActorRole::Farmer);

        let c = coordinator
            .create_and_assign("farmer-1", "exp-1", "Urgent pest call")
            .await
            .unwrap();

        assert_eq!(c.status, ConsultationStatus::InProgress);
        assert!(c.is_assigned_to("exp-1"));
        assert_eq!(c.farmer_id, "farmer-1");
    }

    #[tokio::test]
    async fn create_and_assign_rejects_identity_mismatch() {
        let fx = fixture().await;
        fx.experts
            .save_all(&[available_expert("exp-1")])
            .await
            .unwrap();
        let coordinator = coordinator_as(&fx, "farmer-2", ActorRole::Farmer);

        let result = coordinator
            .create_and_assign("farmer-1", "exp-1", "t")
            .await;
        assert!(matches!(result, Err(EngineError::Unauthenticated)));
    }

    #[tokio::test]
    async fn create_and_assign_unknown_expert() {
        let fx = fixture().await;
        let coordinator = coordinator_as(&fx, "farmer-1", ActorRole::Farmer);

        let result = coordinator
            .create_and_assign("farmer-1", "exp-404", "t")
            .await;
        assert!(matches!(result, Err(EngineError::ExpertNotFound(_))));
    }

    #[tokio::test]
    async fn create_and_assign_unavailable_expert() {
        let fx = fixture().await;
        let mut offline = available_expert("exp-1");
        offline.available = false;
        fx.experts.save_all(&[offline]).await.unwrap();
        let coordinator = coordinator_as(&fx, "farmer-1", ActorRole::Farmer);

        let result = coordinator
            .create_and_assign("farmer-1", "exp-1", "t")
            .await;
        assert!(matches!(result, Err(EngineError::ExpertUnavailable(_))));
    }

    #[tokio::test]
    async fn direct_consultations_never_share_an_id() {
        let fx = fixture().await;
        fx.experts
            .save_all(&[available_expert("exp-1")])
            .await
            .unwrap();
        let coordinator = coordinator_as(&fx, "farmer-1", ActorRole::Farmer);

        let mut ids = Vec::new();
        for _ in 0..10 {
            let c = coordinator
                .create_and_assign("farmer-1", "exp-1", "t")
                .await
                .unwrap();
            ids.push(c.id);
        }
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }
}
