use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::domain::{Account, Claim, Role};
use crate::identity::{IdentityError, IdentityRequest};

/// Generate client methods with oneshot channel boilerplate and automatic tracing.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[instrument(skip(self))]
            #[allow(dead_code)]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                debug!("Sending request");
                let (respond_to, response) = oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| <$error_type>::ActorCommunicationError("Actor closed".to_string()))?;

                response.await.map_err(|_| <$error_type>::ActorCommunicationError("Actor dropped".to_string()))?
            }
        }
    };
}

/// Client for the identity actor.
#[derive(Clone)]
pub struct IdentityClient {
    sender: mpsc::Sender<IdentityRequest>,
}

impl IdentityClient {
    pub fn new(sender: mpsc::Sender<IdentityRequest>) -> Self {
        Self { sender }
    }

    /// Manual method: shutdown needs no response channel.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), IdentityError> {
        debug!("Sending shutdown request");
        self.sender
            .send(IdentityRequest::Shutdown)
            .await
            .map_err(|_| IdentityError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(IdentityClient => fn register(name: String, role: Role) -> Account as IdentityRequest::Register, Error = IdentityError);
client_method!(IdentityClient => fn verify(token: String) -> Claim as IdentityRequest::Verify, Error = IdentityError);
client_method!(IdentityClient => fn get_account(id: String) -> Option<Account> as IdentityRequest::GetAccount, Error = IdentityError);
