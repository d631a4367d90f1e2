use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{LineItemRequest, OrderLineItem};
use crate::domain::ports::StoreTx;

use super::stock_ledger;

/// Applies each requested item to stock, in input order, and returns the
/// resulting line items. Stops at the first item that cannot be satisfied;
/// the enclosing transaction discards whatever was applied before it.
pub fn materialize(
    tx: &mut dyn StoreTx,
    requested: &[LineItemRequest],
    consuming: bool,
) -> Result<Vec<OrderLineItem>, DomainError> {
    let mut items = Vec::with_capacity(requested.len());
    for item in requested {
        let delta = if consuming {
            -item.quantity
        } else {
            item.quantity
        };
        let product = stock_ledger::apply_delta(tx, item.product_id, delta)?;
        items.push(OrderLineItem {
            id: Uuid::new_v4(),
            product_id: product.id,
            product_name: product.name,
            product_reference: product.reference,
            product_image: product.image,
            quantity: item.quantity,
        });
    }
    Ok(items)
}

/// Returns the stock held by `existing` to inventory.
pub fn release(tx: &mut dyn StoreTx, existing: &[OrderLineItem]) -> Result<(), DomainError> {
    for item in existing {
        stock_ledger::apply_delta(tx, item.product_id, item.quantity)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{ProductStore, Store};
    use crate::domain::product::ProductInput;
    use crate::infrastructure::memory_store::InMemoryStore;

    fn product(store: &InMemoryStore, name: &str, quantity: i32) -> Uuid {
        store
            .insert_product(ProductInput {
                name: name.to_string(),
                reference: name.to_uppercase(),
                quantity,
                image: Some(format!("{name}.png")),
            })
            .unwrap()
            .id
    }

    fn stock(store: &InMemoryStore, id: Uuid) -> i32 {
        store
            .transaction(|tx| tx.get_product(id))
            .unwrap()
            .unwrap()
            .quantity
    }

    #[test]
    fn materialize_keeps_requested_quantity_and_product_snapshot() {
        let store = InMemoryStore::new();
        let cup = product(&store, "cup", 10);

        let items = store
            .transaction(|tx| {
                materialize(
                    tx,
                    &[LineItemRequest {
                        product_id: cup,
                        quantity: 4,
                    }],
                    true,
                )
            })
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 4);
        assert_eq!(items[0].product_name, "cup");
        assert_eq!(items[0].product_reference, "CUP");
        assert_eq!(items[0].product_image.as_deref(), Some("cup.png"));
        assert_eq!(stock(&store, cup), 6);
    }

    #[test]
    fn failing_item_rolls_back_earlier_items() {
        let store = InMemoryStore::new();
        let cup = product(&store, "cup", 10);
        let plate = product(&store, "plate", 1);

        let err = store
            .transaction(|tx| {
                materialize(
                    tx,
                    &[
                        LineItemRequest {
                            product_id: cup,
                            quantity: 2,
                        },
                        LineItemRequest {
                            product_id: plate,
                            quantity: 2,
                        },
                    ],
                    true,
                )
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        assert_eq!(stock(&store, cup), 10);
        assert_eq!(stock(&store, plate), 1);
    }

    #[test]
    fn release_returns_every_item() {
        let store = InMemoryStore::new();
        let cup = product(&store, "cup", 3);
        let requested = [
            LineItemRequest {
                product_id: cup,
                quantity: 1,
            },
            LineItemRequest {
                product_id: cup,
                quantity: 2,
            },
        ];

        let items = store
            .transaction(|tx| materialize(tx, &requested, true))
            .unwrap();
        assert_eq!(stock(&store, cup), 0);

        store.transaction(|tx| release(tx, &items)).unwrap();
        assert_eq!(stock(&store, cup), 3);
    }
}
