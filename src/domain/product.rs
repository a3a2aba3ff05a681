use rust_decimal::Decimal;

/// A supplier-owned catalog entry.
///
/// Read-only from the aggregation engine's perspective: group orders snapshot
/// their own unit price at creation, so later catalog changes never affect an
/// existing order.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogProduct {
    pub id: String,
    pub supplier_id: String,
    pub name: String,
    pub category: String,
    pub base_price: Decimal,
    pub unit: String,
    pub min_order: u32,
}

/// Caller-facing payload for registering a product. The owning supplier is
/// taken from the caller's claim, never from the payload.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub base_price: Decimal,
    pub unit: String,
    pub min_order: u32,
}

/// Actor-side creation params, with ownership already attributed.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub supplier_id: String,
    pub name: String,
    pub category: String,
    pub base_price: Decimal,
    pub unit: String,
    pub min_order: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub base_price: Option<Decimal>,
    pub min_order: Option<u32>,
}
