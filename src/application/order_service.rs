use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderUpdate};
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{OrderStore, Store};
use crate::domain::status::OrderStatus;

use super::{line_items, stock_ledger};

/// Order lifecycle operations. Each one runs in a single store transaction,
/// so stock and the order record either change together or not at all.
pub struct OrderService<S> {
    store: S,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl<S: Store> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            today: local_today,
        }
    }

    /// Uses `today` instead of the local calendar when stamping pickup dates.
    pub fn with_clock(store: S, today: fn() -> NaiveDate) -> Self {
        Self { store, today }
    }

    pub fn create_order(&self, input: NewOrder) -> Result<Order, DomainError> {
        input.validate()?;

        let order = self.store.transaction(|tx| {
            stock_ledger::lock_products(tx, input.items.iter().map(|item| item.product_id))?;
            let items = line_items::materialize(tx, &input.items, true)?;
            let order = Order::create(&input, items);
            tx.save_order(&order)
        })?;

        log::info!(
            "order {} created with status {} and {} line item(s)",
            order.id,
            order.status,
            order.items.len()
        );
        Ok(order)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.store
            .transaction(|tx| tx.get_order(id))?
            .ok_or_else(|| DomainError::order_not_found(id))
    }

    pub fn list_orders(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        self.store.transaction(|tx| tx.find_orders(status, page))
    }

    /// Merges `update` into the stored order. A non-empty item list replaces
    /// the current items: their stock is released first, then the new items
    /// are consumed.
    pub fn replace_order(&self, id: Uuid, mut update: OrderUpdate) -> Result<Order, DomainError> {
        update.validate()?;
        let items = update.items.take().filter(|items| !items.is_empty());
        let today = (self.today)();

        let order = self.store.transaction(|tx| {
            let mut order = tx
                .get_order(id)?
                .ok_or_else(|| DomainError::order_not_found(id))?;

            order.merge_details(update, today);

            if let Some(requested) = &items {
                let held = order.items.iter().map(|item| item.product_id);
                let wanted = requested.iter().map(|item| item.product_id);
                stock_ledger::lock_products(tx, held.chain(wanted))?;
                line_items::release(tx, &order.items)?;
                order.items = line_items::materialize(tx, requested, true)?;
            }

            tx.save_order(&order)
        })?;

        log::info!(
            "order {} updated{}",
            order.id,
            if items.is_some() {
                " with replaced line items"
            } else {
                ""
            }
        );
        Ok(order)
    }

    pub fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        self.store.transaction(|tx| {
            let order = tx
                .get_order(id)?
                .ok_or_else(|| DomainError::order_not_found(id))?;
            stock_ledger::lock_products(tx, order.items.iter().map(|item| item.product_id))?;
            line_items::release(tx, &order.items)?;
            if !tx.delete_order(id)? {
                return Err(DomainError::order_not_found(id));
            }
            Ok(())
        })?;

        log::info!("order {} deleted and its stock released", id);
        Ok(())
    }

    /// Overwrites the status only. Stock is not touched.
    pub fn patch_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
        let order = self.store.transaction(|tx| {
            let mut order = tx
                .get_order(id)?
                .ok_or_else(|| DomainError::order_not_found(id))?;
            order.status = status;
            tx.save_order(&order)
        })?;

        log::info!("order {} moved to status {}", id, status);
        Ok(order)
    }
}
