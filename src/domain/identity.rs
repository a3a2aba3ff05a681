use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// The two parties of a group buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Vendor,
    Supplier,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Vendor => write!(f, "vendor"),
            Role::Supplier => write!(f, "supplier"),
        }
    }
}

/// Verified identity of a caller, as yielded by token verification.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub subject_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("{required} role required, caller {subject_id} is a {actual}")]
pub struct RoleMismatch {
    pub subject_id: String,
    pub required: Role,
    pub actual: Role,
}

impl Claim {
    /// Central capability check: every role-gated operation goes through here
    /// instead of comparing role values inline.
    pub fn require(&self, required: Role) -> Result<(), RoleMismatch> {
        if self.role == required {
            Ok(())
        } else {
            Err(RoleMismatch {
                subject_id: self.subject_id.clone(),
                required,
                actual: self.role,
            })
        }
    }
}

/// A registered account held by the identity service.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn claim(&self) -> Claim {
        Claim {
            subject_id: self.id.clone(),
            role: self.role,
        }
    }
}
