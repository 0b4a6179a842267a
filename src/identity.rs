use async_trait::async_trait;

use crate::error::EngineError;
use crate::models::Actor;

/// Seam to whatever answers "who is making this call". The engine never takes
/// an actor id from a request payload for authorization decisions; it always
/// asks the provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The authenticated caller, or `None` when nobody is signed in.
    async fn current_actor(&self) -> Result<Option<Actor>, EngineError>;
}

/// Identity backed by the local configuration file; the CLI's stand-in for a
/// real login session.
pub struct ConfigIdentity {
    actor: Option<Actor>,
}

impl ConfigIdentity {
    pub fn new(actor: Option<Actor>) -> Self {
        Self { actor }
    }
}

#[async_trait]
impl IdentityProvider for ConfigIdentity {
    async fn current_actor(&self) -> Result<Option<Actor>, EngineError> {
        Ok(self.actor.clone())
    }
}

/// Fixed identity for tests.
#[cfg(test)]
pub struct StaticIdentity(pub Actor);

#[cfg(test)]
#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_actor(&self) -> Result<Option<Actor>, EngineError> {
        Ok(Some(self.0.clone()))
    }
}

/// No authenticated caller, for tests.
#[cfg(test)]
pub struct AnonymousIdentity;

#[cfg(test)]
#[async_trait]
impl IdentityProvider for AnonymousIdentity {
    async fn current_actor(&self) -> Result<Option<Actor>, EngineError> {
        Ok(None)
    }
}
