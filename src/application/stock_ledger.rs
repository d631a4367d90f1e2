//! The only path through which order lifecycle operations change stock.

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{ProductStore, StockAdjustment, StoreTx};
use crate::domain::product::Product;

/// Locks every product in `ids` in a stable order before any delta is applied.
pub fn lock_products(
    tx: &mut dyn StoreTx,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<(), DomainError> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    tx.lock_products(&ids)
}

/// Applies a signed delta to a product's stock.
///
/// Negative deltas consume stock, positive deltas release it. The write is
/// conditional at the store, so a delta that would take stock below zero fails
/// with `InsufficientStock` and leaves the product untouched.
pub fn apply_delta(
    tx: &mut dyn StoreTx,
    product_id: Uuid,
    delta: i32,
) -> Result<Product, DomainError> {
    match tx.adjust_stock(product_id, delta)? {
        StockAdjustment::Applied(product) => {
            log::debug!(
                "stock of product {} adjusted by {} to {}",
                product_id,
                delta,
                product.quantity
            );
            Ok(product)
        }
        StockAdjustment::Insufficient(product) => {
            log::warn!(
                "rejected stock delta {} for product {}: only {} available",
                delta,
                product_id,
                product.quantity
            );
            Err(DomainError::InsufficientStock {
                product_id,
                product_name: product.name,
                requested: -delta,
                available: product.quantity,
            })
        }
        StockAdjustment::Missing => Err(DomainError::product_not_found(product_id)),
    }
}
