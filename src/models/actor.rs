use serde::{Deserialize, Serialize};

/// Unique identifier for authenticated actors (farmers, consultants, admins)
pub type ActorId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Farmer,
    Consultant,
    Admin,
}

impl ActorRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ActorRole::Farmer => "farmer",
            ActorRole::Consultant => "consultant",
            ActorRole::Admin => "admin",
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated caller, as supplied by the identity provider.
/// Never constructed from request payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<ActorId>, role: ActorRole) -> Self {
        Self { id: id.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, ActorRole::Admin)
    }
}
