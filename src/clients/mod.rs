//! Cloneable handles for talking to the service actors.

#[macro_use]
mod macros;

mod catalog_client;
mod identity_client;

pub use catalog_client::CatalogClient;
pub use identity_client::IdentityClient;
