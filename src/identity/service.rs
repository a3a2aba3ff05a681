use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use super::error::IdentityError;
use super::messages::{IdentityRequest, ServiceResponse};
use crate::clients::IdentityClient;
use crate::domain::{Account, Claim, Role};

/// Account registry actor. Issues an opaque token per account at registration
/// and verifies tokens back into claims; tokens are the identity, names are
/// display data.
pub struct IdentityService {
    receiver: mpsc::Receiver<IdentityRequest>,
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    next_id: u64,
}

impl IdentityService {
    pub fn new(buffer_size: usize) -> (Self, IdentityClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            accounts: HashMap::new(),
            tokens: HashMap::new(),
            next_id: 1,
        };
        let client = IdentityClient::new(sender);
        (service, client)
    }

    #[instrument(name = "identity_service", skip(self))]
    pub async fn run(mut self) {
        info!("IdentityService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                IdentityRequest::Register {
                    name,
                    role,
                    respond_to,
                } => {
                    self.handle_register(name, role, respond_to);
                }
                IdentityRequest::Verify { token, respond_to } => {
                    self.handle_verify(token, respond_to);
                }
                IdentityRequest::GetAccount { id, respond_to } => {
                    self.handle_get_account(id, respond_to);
                }
                IdentityRequest::Shutdown => {
                    info!("IdentityService shutting down");
                    break;
                }
            }
        }

        info!("IdentityService stopped");
    }

    #[instrument(fields(account_name = %name, role = %role), skip(self, name, respond_to))]
    fn handle_register(
        &mut self,
        name: String,
        role: Role,
        respond_to: ServiceResponse<Account, IdentityError>,
    ) {
        debug!("Processing register request");

        let result = if name.trim().is_empty() {
            error!("Validation failed: empty name");
            Err(IdentityError::ValidationError("Name required".to_string()))
        } else {
            let id = format!("{}_{}", role, self.next_id);
            self.next_id += 1;
            let token = format!("token_{}", id);
            let account = Account {
                id: id.clone(),
                name,
                role,
                token: token.clone(),
                created_at: Utc::now(),
            };
            self.accounts.insert(id, account.clone());
            self.tokens.insert(token, account.id.clone());

            info!(account_id = %account.id, "Account registered");
            Ok(account)
        };

        let _ = respond_to.send(result);
    }

    /// Token contents stay out of the logs.
    #[instrument(skip(self, token, respond_to))]
    fn handle_verify(&self, token: String, respond_to: ServiceResponse<Claim, IdentityError>) {
        debug!("Processing verify request");

        let result = self
            .tokens
            .get(&token)
            .and_then(|id| self.accounts.get(id))
            .map(Account::claim)
            .ok_or(IdentityError::InvalidToken);

        match &result {
            Ok(claim) => info!(subject_id = %claim.subject_id, "Token verified"),
            Err(_) => warn!("Token rejected"),
        }

        let _ = respond_to.send(result);
    }

    #[instrument(fields(account_id = %id), skip(self, respond_to))]
    fn handle_get_account(
        &self,
        id: String,
        respond_to: ServiceResponse<Option<Account>, IdentityError>,
    ) {
        debug!("Processing get_account request");

        let account = self.accounts.get(&id).cloned();
        match &account {
            Some(account) => info!(account_name = %account.name, "Account found"),
            None => debug!("Account not found"),
        }

        let _ = respond_to.send(Ok(account));
    }
}
