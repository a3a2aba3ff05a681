//! The group order aggregation engine: the only writer of aggregate quantity
//! and participant lists.

pub mod error;

pub use error::OrderError;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument};

use crate::clients::CatalogClient;
use crate::domain::{Claim, GroupOrder, OrderDraft, OrderFilter, Role};
use crate::store::{MemoryStore, Mutator, RecordStore, StoredRecord, UpdateError};

impl StoredRecord for GroupOrder {
    type Id = String;
    type Rejection = OrderError;

    fn id(&self) -> &String {
        &self.id
    }
}

/// Orchestrates group order lifecycle against the record store.
///
/// The engine itself holds no order state and no lock: every mutation is
/// delegated to the store's per-record atomic update, so joins on the same
/// order are linearized while joins on different orders stay independent.
pub struct OrderEngine<S: RecordStore<GroupOrder> = MemoryStore<GroupOrder>> {
    store: Arc<S>,
    catalog: CatalogClient,
    order_seq: AtomicU64,
}

impl<S: RecordStore<GroupOrder>> OrderEngine<S> {
    pub fn new(store: Arc<S>, catalog: CatalogClient) -> Self {
        Self {
            store,
            catalog,
            order_seq: AtomicU64::new(1),
        }
    }

    /// Monotonic, collision-free even under concurrent creation.
    fn next_order_id(&self) -> String {
        let id = self.order_seq.fetch_add(1, Ordering::SeqCst);
        format!("order_{}", id)
    }

    #[instrument(
        fields(supplier_id = %claim.subject_id, product_id = %draft.product_id),
        skip(self, claim, draft)
    )]
    pub async fn create_order(
        &self,
        claim: &Claim,
        draft: OrderDraft,
    ) -> Result<GroupOrder, OrderError> {
        debug!("Processing create_order request");

        claim
            .require(Role::Supplier)
            .map_err(|e| OrderError::Unauthorized(e.to_string()))?;

        let now = Utc::now();
        draft.validate(now)?;

        // Step 1: Resolve the product and check ownership
        let product = match self.catalog.get_product(draft.product_id.clone()).await {
            Ok(Some(product)) => {
                info!(product_name = %product.name, "Product validation successful");
                product
            }
            Ok(None) => {
                error!("Product not found");
                return Err(OrderError::NotFound(format!(
                    "product {}",
                    draft.product_id
                )));
            }
            Err(e) => {
                error!(error = %e, "Catalog lookup failed");
                return Err(OrderError::StoreUnavailable(format!(
                    "catalog lookup failed: {}",
                    e
                )));
            }
        };

        if product.supplier_id != claim.subject_id {
            error!(owner_id = %product.supplier_id, "Product belongs to another supplier");
            return Err(OrderError::Unauthorized(format!(
                "product {} belongs to another supplier",
                product.id
            )));
        }

        // Step 2: The group price must undercut the catalog price
        if draft.price_per_unit >= product.base_price {
            return Err(OrderError::InvalidInput(format!(
                "group price {} must undercut base price {}",
                draft.price_per_unit, product.base_price
            )));
        }

        // Step 3: Allocate the id and persist the fresh order
        let order = GroupOrder::open(
            self.next_order_id(),
            claim.subject_id.clone(),
            draft,
            now,
        );
        match self.store.insert(order.clone()).await {
            Ok(()) => {
                info!(
                    order_id = %order.id,
                    title = %order.title,
                    target = order.target_quantity,
                    base_price = %product.base_price,
                    unit = %product.unit,
                    "Group order created"
                );
                Ok(order)
            }
            Err(e) => {
                error!(error = %e, "Store insert failed");
                Err(OrderError::StoreUnavailable(e.to_string()))
            }
        }
    }

    pub async fn join_order(
        &self,
        claim: &Claim,
        order_id: String,
        quantity: u32,
    ) -> Result<GroupOrder, OrderError> {
        self.join_order_at(claim, order_id, quantity, Utc::now())
            .await
    }

    /// `join_order` with an explicit clock, so deadline behavior is testable.
    ///
    /// The status check, deadline check, duplicate-vendor check, participant
    /// append and aggregate increment all run inside one atomic store update;
    /// a failure on any of them leaves the record untouched.
    #[instrument(
        fields(vendor_id = %claim.subject_id, order_id = %order_id),
        skip(self, claim, now)
    )]
    pub async fn join_order_at(
        &self,
        claim: &Claim,
        order_id: String,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<GroupOrder, OrderError> {
        debug!("Processing join_order request");

        claim
            .require(Role::Vendor)
            .map_err(|e| OrderError::Unauthorized(e.to_string()))?;
        if quantity == 0 {
            return Err(OrderError::InvalidInput(
                "Quantity must be positive".to_string(),
            ));
        }

        let vendor_id = claim.subject_id.clone();
        let mutate: Mutator<GroupOrder> =
            Box::new(move |order| order.join(vendor_id, quantity, now));
        let updated = self
            .store
            .update_if_present(&order_id, mutate)
            .await
            .map_err(|e| match e {
                UpdateError::NotFound(id) => OrderError::NotFound(format!("order {}", id)),
                UpdateError::Rejected(rejection) => rejection,
                UpdateError::Unavailable(msg) => OrderError::StoreUnavailable(msg),
            })?;

        let before = updated.current_quantity - quantity;
        if updated.target_reached() && before < updated.target_quantity {
            info!(
                order_id = %updated.id,
                current = updated.current_quantity,
                target = updated.target_quantity,
                "Target quantity reached; order stays active until the supplier closes it"
            );
        }
        info!(current = updated.current_quantity, "Vendor joined group order");
        Ok(updated)
    }

    #[instrument(fields(order_id = %order_id), skip(self))]
    pub async fn get_order(&self, order_id: String) -> Result<GroupOrder, OrderError> {
        debug!("Processing get_order request");

        match self.store.get(&order_id).await {
            Ok(Some(order)) => Ok(order),
            Ok(None) => Err(OrderError::NotFound(format!("order {}", order_id))),
            Err(e) => Err(OrderError::StoreUnavailable(e.to_string())),
        }
    }

    #[instrument(skip(self, filter))]
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<GroupOrder>, OrderError> {
        debug!("Processing list_orders request");

        let mut orders: Vec<GroupOrder> = self
            .store
            .list()
            .await
            .map_err(|e| OrderError::StoreUnavailable(e.to_string()))?
            .into_iter()
            .filter(|order| filter.matches(order))
            .collect();
        // Creation order; length-then-lex ranks the numeric id suffixes.
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.len().cmp(&b.id.len()))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(orders)
    }

    /// External close action: `Active -> Fulfilled` when the target was met,
    /// `Active -> Cancelled` otherwise. Owner-only.
    #[instrument(
        fields(supplier_id = %claim.subject_id, order_id = %order_id),
        skip(self, claim)
    )]
    pub async fn close_order(
        &self,
        claim: &Claim,
        order_id: String,
    ) -> Result<GroupOrder, OrderError> {
        debug!("Processing close_order request");

        claim
            .require(Role::Supplier)
            .map_err(|e| OrderError::Unauthorized(e.to_string()))?;

        let supplier_id = claim.subject_id.clone();
        let mutate: Mutator<GroupOrder> = Box::new(move |order| {
            if order.supplier_id != supplier_id {
                return Err(OrderError::Unauthorized(format!(
                    "order {} belongs to another supplier",
                    order.id
                )));
            }
            order.close()
        });
        let updated = self
            .store
            .update_if_present(&order_id, mutate)
            .await
            .map_err(|e| match e {
                UpdateError::NotFound(id) => OrderError::NotFound(format!("order {}", id)),
                UpdateError::Rejected(rejection) => rejection,
                UpdateError::Unavailable(msg) => OrderError::StoreUnavailable(msg),
            })?;

        info!(
            status = %updated.status,
            product_id = %updated.product_id,
            current = updated.current_quantity,
            "Group order closed"
        );
        Ok(updated)
    }

    /// Deadline sweep hook for an out-of-core scheduler: transitions every
    /// active order whose deadline has passed to `Expired`. Races with a
    /// concurrent close resolve in the close's favor and are not an error.
    #[instrument(skip(self, now))]
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<usize, OrderError> {
        debug!("Processing expire_overdue sweep");

        let overdue: Vec<String> = self
            .store
            .list()
            .await
            .map_err(|e| OrderError::StoreUnavailable(e.to_string()))?
            .into_iter()
            .filter(|order| order.status.is_active() && order.deadline < now)
            .map(|order| order.id)
            .collect();

        let mut expired = 0;
        for order_id in overdue {
            let mutate: Mutator<GroupOrder> = Box::new(move |order| order.expire(now));
            match self.store.update_if_present(&order_id, mutate).await {
                Ok(order) => {
                    expired += 1;
                    info!(order_id = %order.id, "Group order expired");
                }
                // Lost the race to a close between the snapshot and here.
                Err(UpdateError::Rejected(_)) | Err(UpdateError::NotFound(_)) => {}
                Err(UpdateError::Unavailable(msg)) => {
                    return Err(OrderError::StoreUnavailable(msg));
                }
            }
        }
        Ok(expired)
    }
}
