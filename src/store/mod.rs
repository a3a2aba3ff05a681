//! Durable record store abstraction.
//!
//! The engine only requires per-record atomic read-modify-write semantics
//! from its store. A plain read-then-overwrite store cannot honor the
//! join-race guarantee and must not be substituted here.

mod memory;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;

/// Record types a [`RecordStore`] can hold.
pub trait StoredRecord: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    /// Error a mutation may abort with, leaving the record untouched.
    type Rejection: Send + Debug + 'static;

    fn id(&self) -> &Self::Id;
}

/// Closure run inside [`RecordStore::update_if_present`]: receives the
/// committed record and returns its replacement, or aborts.
pub type Mutator<T> =
    Box<dyn FnOnce(&T) -> Result<T, <T as StoredRecord>::Rejection> + Send>;

#[derive(Debug, Clone, Error, PartialEq)]
#[allow(dead_code)]
pub enum StoreError {
    #[error("Record already exists: {0}")]
    AlreadyExists(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failure modes of an atomic update, kept distinct so callers can tell a
/// missing record from a rejected mutation from an unavailable store.
#[derive(Debug, Error, PartialEq)]
pub enum UpdateError<E> {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Mutation rejected: {0}")]
    Rejected(E),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RecordStore<T: StoredRecord>: Send + Sync + 'static {
    /// Snapshot of the latest committed record.
    async fn get(&self, id: &T::Id) -> Result<Option<T>, StoreError>;

    /// Insert a fresh record. Ids are allocated monotonically and never
    /// reused, so a collision is a store integrity failure.
    async fn insert(&self, record: T) -> Result<(), StoreError>;

    /// Run `mutate` against the committed record with serializable isolation
    /// per record id and commit its replacement. A rejection or a store
    /// failure leaves the record unchanged.
    async fn update_if_present(
        &self,
        id: &T::Id,
        mutate: Mutator<T>,
    ) -> Result<T, UpdateError<T::Rejection>>;

    /// Snapshot of every committed record, in no particular order.
    async fn list(&self) -> Result<Vec<T>, StoreError>;
}
