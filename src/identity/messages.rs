use tokio::sync::oneshot;

use super::error::IdentityError;
use crate::domain::{Account, Claim, Role};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed messages for the identity actor. Each variant carries its parameters
/// and a oneshot channel for the response.
#[derive(Debug)]
pub enum IdentityRequest {
    Register {
        name: String,
        role: Role,
        respond_to: ServiceResponse<Account, IdentityError>,
    },
    Verify {
        token: String,
        respond_to: ServiceResponse<Claim, IdentityError>,
    },
    GetAccount {
        id: String,
        respond_to: ServiceResponse<Option<Account>, IdentityError>,
    },
    Shutdown,
}
