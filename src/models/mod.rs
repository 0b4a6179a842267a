mod actor;
mod consultation;
mod event;
mod expert;

pub use actor::{Actor, ActorId, ActorRole};
pub use consultation::{Consultation, ConsultationId, ConsultationStatus, NewConsultation};
pub use event::Event;
pub use expert::{Expert, ExpertId};
