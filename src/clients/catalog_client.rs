use tracing::{debug, error, instrument};

use crate::actor_framework::ResourceClient;
use crate::catalog::CatalogError;
use crate::domain::{CatalogProduct, Claim, ProductCreate, ProductDraft, ProductPatch, Role};

/// Client for the catalog actor.
///
/// Registration is role-gated here: only suppliers may add products, and a
/// product is always attributed to the caller's own identity, never to an id
/// in the payload.
#[derive(Clone)]
pub struct CatalogClient {
    inner: ResourceClient<CatalogProduct>,
}

impl_basic_client!(CatalogClient, CatalogProduct, CatalogError, product);

impl CatalogClient {
    #[instrument(
        fields(supplier_id = %claim.subject_id, product_name = %draft.name),
        skip(self, claim, draft)
    )]
    pub async fn add_product(
        &self,
        claim: &Claim,
        draft: ProductDraft,
    ) -> Result<CatalogProduct, CatalogError> {
        debug!("Sending request");

        if let Err(e) = claim.require(Role::Supplier) {
            error!(error = %e, "Product registration refused");
            return Err(CatalogError::Unauthorized(e.to_string()));
        }

        let params = ProductCreate {
            supplier_id: claim.subject_id.clone(),
            name: draft.name,
            category: draft.category,
            base_price: draft.base_price,
            unit: draft.unit,
            min_order: draft.min_order,
        };
        self.inner.create(params).await.map_err(CatalogError::from)
    }

    #[instrument(fields(product_id = %id), skip(self, patch))]
    pub async fn update_product(
        &self,
        id: String,
        patch: ProductPatch,
    ) -> Result<CatalogProduct, CatalogError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(CatalogError::from)
    }
}
