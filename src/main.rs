mod actor_framework;
mod app_system;
mod catalog;
mod clients;
mod domain;
mod engine;
mod identity;
mod store;

#[cfg(test)]
mod mock_framework;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

use crate::app_system::{setup_tracing, MarketSystem};
use crate::domain::{OrderDraft, OrderFilter, ProductDraft, ProductPatch, Role};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting group order system");

    let system = MarketSystem::new();

    // Register one supplier and two vendors
    let span = tracing::info_span!("registration");
    let (supplier, vendor_one, vendor_two) = async {
        info!("Registering accounts");
        let supplier_account = system
            .identity_client
            .register("Amrita Wholesale".to_string(), Role::Supplier)
            .await
            .map_err(|e| e.to_string())?;
        let vendor_one_account = system
            .identity_client
            .register("Chaat Corner".to_string(), Role::Vendor)
            .await
            .map_err(|e| e.to_string())?;
        let vendor_two_account = system
            .identity_client
            .register("Dosa Cart".to_string(), Role::Vendor)
            .await
            .map_err(|e| e.to_string())?;

        // Callers authenticate with their opaque token on every request.
        let supplier = system
            .identity_client
            .verify(supplier_account.token.clone())
            .await
            .map_err(|e| e.to_string())?;
        let vendor_one = system
            .identity_client
            .verify(vendor_one_account.token.clone())
            .await
            .map_err(|e| e.to_string())?;
        let vendor_two = system
            .identity_client
            .verify(vendor_two_account.token.clone())
            .await
            .map_err(|e| e.to_string())?;
        Ok::<_, String>((supplier, vendor_one, vendor_two))
    }
    .instrument(span)
    .await?;

    if let Some(account) = system
        .identity_client
        .get_account(supplier.subject_id.clone())
        .await
        .map_err(|e| e.to_string())?
    {
        info!(name = %account.name, registered_at = %account.created_at, "Supplier profile");
    }

    // Supplier lists a product in the catalog
    let span = tracing::info_span!("product_registration");
    let product = async {
        info!("Registering product");
        system
            .catalog_client
            .add_product(
                &supplier,
                ProductDraft {
                    name: "Basmati rice".to_string(),
                    category: "Grains".to_string(),
                    base_price: Decimal::from(30),
                    unit: "kg".to_string(),
                    min_order: 10,
                },
            )
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    info!(
        product_id = %product.id,
        category = %product.category,
        min_order = product.min_order,
        "Product registered"
    );

    // Supplier posts a group order below the catalog price
    let span = tracing::info_span!("order_creation");
    let order = async {
        info!("Creating group order");
        system
            .engine
            .create_order(
                &supplier,
                OrderDraft {
                    product_id: product.id.clone(),
                    title: "Weekend market rice pool".to_string(),
                    target_quantity: 500,
                    price_per_unit: Decimal::from(25),
                    deadline: Utc::now() + Duration::days(7),
                },
            )
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    info!(order_id = %order.id, target = order.target_quantity, "Group order created");

    // Two vendors pool quantity against it
    let span = tracing::info_span!("order_joining");
    async {
        for (vendor, quantity) in [(&vendor_one, 200u32), (&vendor_two, 300u32)] {
            match system
                .engine
                .join_order(vendor, order.id.clone(), quantity)
                .await
            {
                Ok(updated) => info!(
                    current = updated.current_quantity,
                    target_reached = updated.target_reached(),
                    "Vendor joined"
                ),
                Err(e) => error!(error = %e, "Join failed"),
            }
        }
    }
    .instrument(span)
    .await;

    // A catalog price change never touches the posted order
    let bumped = system
        .catalog_client
        .update_product(
            product.id.clone(),
            ProductPatch {
                base_price: Some(Decimal::from(32)),
                min_order: None,
            },
        )
        .await
        .map_err(|e| e.to_string())?;
    let refreshed = system
        .engine
        .get_order(order.id.clone())
        .await
        .map_err(|e| e.to_string())?;
    info!(
        catalog_price = %bumped.base_price,
        order_price = %refreshed.price_per_unit,
        "Catalog update left the order price untouched"
    );
    if let Some(participant) = refreshed.participants.last() {
        info!(
            vendor_id = %participant.vendor_id,
            quantity = participant.quantity,
            joined_at = %participant.joined_at,
            "Latest participation"
        );
    }

    // Supplier closes out the pool; target was met, so it fulfills
    let closed = system
        .engine
        .close_order(&supplier, order.id.clone())
        .await
        .map_err(|e| e.to_string())?;
    info!(status = %closed.status, "Order closed");

    let expired = system
        .engine
        .expire_overdue(Utc::now())
        .await
        .map_err(|e| e.to_string())?;
    info!(expired, "Deadline sweep complete");

    let orders = system
        .engine
        .list_orders(OrderFilter::default())
        .await
        .map_err(|e| e.to_string())?;
    info!(order_count = orders.len(), "Retrieved group order list");

    let products = system
        .catalog_client
        .list_products()
        .await
        .map_err(|e| e.to_string())?;
    info!(product_count = products.len(), "Retrieved product catalog");

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
