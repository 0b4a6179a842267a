pub mod call;
pub mod cancel;
pub mod claim;
pub mod common;
pub mod complete;
pub mod experts;
pub mod import;
pub mod pending;
pub mod request;
pub mod session;
pub mod show;
