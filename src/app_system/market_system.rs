use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{error, info};

use crate::actor_framework::ResourceActor;
use crate::clients::{CatalogClient, IdentityClient};
use crate::domain::{CatalogProduct, GroupOrder};
use crate::engine::OrderEngine;
use crate::identity::IdentityService;
use crate::store::MemoryStore;

/// The main application system that wires every service together.
///
/// Responsible for starting the actors, injecting clients into the engine,
/// and handling shutdown.
pub struct MarketSystem {
    pub identity_client: IdentityClient,
    pub catalog_client: CatalogClient,
    pub engine: Arc<OrderEngine>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl MarketSystem {
    pub fn new() -> Self {
        info!("Starting market system");

        // 1. Identity service
        let (identity_service, identity_client) = IdentityService::new(32);
        let identity_handle = tokio::spawn(identity_service.run());

        // 2. Catalog actor
        let product_id_counter = Arc::new(AtomicU64::new(1));
        let next_product_id = move || {
            let id = product_id_counter.fetch_add(1, Ordering::SeqCst);
            format!("product_{}", id)
        };
        let (catalog_actor, catalog_resource_client) =
            ResourceActor::<CatalogProduct>::new(32, next_product_id);
        let catalog_client = CatalogClient::new(catalog_resource_client);
        let catalog_handle = tokio::spawn(catalog_actor.run());

        // 3. Aggregation engine over the per-record store
        let store = Arc::new(MemoryStore::<GroupOrder>::new());
        let engine = Arc::new(OrderEngine::new(store, catalog_client.clone()));

        info!("Market system started successfully");

        Self {
            identity_client,
            catalog_client,
            engine,
            handles: vec![identity_handle, catalog_handle],
        }
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down market system");

        let _ = self.identity_client.shutdown().await;

        // The catalog actor stops once its last client is dropped; the
        // engine holds one of those clients.
        drop(self.engine);
        drop(self.catalog_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Market system shutdown complete.");
        Ok(())
    }
}

impl Default for MarketSystem {
    fn default() -> Self {
        Self::new()
    }
}
