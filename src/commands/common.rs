use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::coordinator::ClaimCoordinator;
use crate::directory::ExpertDirectory;
use crate::identity::{ConfigIdentity, IdentityProvider};
use crate::notify::Notifier;
use crate::registry::ConsultationRegistry;
use crate::session::SessionInitiator;
use crate::store::{ConsultationStore, ExpertStore};

/// Everything a command needs: initialized stores, the configured identity,
/// and the event bus, wired from the local config.
pub struct Core {
    pub config: Config,
    pub experts: ExpertStore,
    pub consultations: ConsultationStore,
    pub identity: Arc<dyn IdentityProvider>,
    pub notifier: Notifier,
}

impl Core {
    pub async fn open() -> Result<Self> {
        let config = Config::load(None)?;
        let experts = ExpertStore::new(config.data_path.clone());
        let consultations = ConsultationStore::new(config.data_path.clone());
        experts.init().await?;
        consultations.init().await?;
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(ConfigIdentity::new(config.actor()));

        Ok(Self {
            config,
            experts,
            consultations,
            identity,
            notifier: Notifier::default(),
        })
    }

    pub fn directory(&self) -> ExpertDirectory {
        ExpertDirectory::new(self.experts.clone())
    }

    pub fn registry(&self) -> ConsultationRegistry {
        ConsultationRegistry::new(self.consultations.clone(), self.identity.clone())
    }

    pub fn coordinator(&self) -> ClaimCoordinator {
        ClaimCoordinator::new(
            self.consultations.clone(),
            self.experts.clone(),
            self.identity.clone(),
            self.notifier.clone(),
        )
    }

    pub fn initiator(&self) -> SessionInitiator {
        SessionInitiator::new(self.consultations.clone(), self.notifier.clone())
    }
}
