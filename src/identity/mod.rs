//! Identity provider: account registry, token issuance and verification.

pub mod error;
pub mod messages;
mod service;

pub use error::*;
pub use messages::*;
pub use service::*;
