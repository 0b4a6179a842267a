mod loader;

pub use loader::{ActorConfig, Config};
