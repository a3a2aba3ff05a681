use rust_decimal::Decimal;

use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{CatalogProduct, ProductCreate, ProductPatch};

impl Entity for CatalogProduct {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;

    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, FrameworkError> {
        if params.name.trim().is_empty() {
            return Err(FrameworkError::Rejected(
                "Product name is required".to_string(),
            ));
        }
        if params.category.trim().is_empty() {
            return Err(FrameworkError::Rejected(
                "Product category is required".to_string(),
            ));
        }
        if params.unit.trim().is_empty() {
            return Err(FrameworkError::Rejected(
                "Product unit is required".to_string(),
            ));
        }
        if params.base_price <= Decimal::ZERO {
            return Err(FrameworkError::Rejected(
                "Base price must be positive".to_string(),
            ));
        }
        if params.min_order == 0 {
            return Err(FrameworkError::Rejected(
                "Minimum order must be positive".to_string(),
            ));
        }
        Ok(Self {
            id,
            supplier_id: params.supplier_id,
            name: params.name,
            category: params.category,
            base_price: params.base_price,
            unit: params.unit,
            min_order: params.min_order,
        })
    }

    /// Catalog updates never touch existing group orders; they snapshot
    /// their unit price at creation.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), FrameworkError> {
        if let Some(base_price) = patch.base_price {
            if base_price <= Decimal::ZERO {
                return Err(FrameworkError::Rejected(
                    "Base price must be positive".to_string(),
                ));
            }
            self.base_price = base_price;
        }
        if let Some(min_order) = patch.min_order {
            if min_order == 0 {
                return Err(FrameworkError::Rejected(
                    "Minimum order must be positive".to_string(),
                ));
            }
            self.min_order = min_order;
        }
        Ok(())
    }
}
