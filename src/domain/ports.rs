use uuid::Uuid;

use super::errors::DomainError;
use super::order::Order;
use super::page::{Page, PageRequest};
use super::product::Product;
use super::status::OrderStatus;

/// Outcome of a conditional stock write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockAdjustment {
    /// The delta was applied; carries the product after the write.
    Applied(Product),
    /// The delta would have taken stock below zero; nothing was written.
    Insufficient(Product),
    Missing,
}

pub trait ProductStore {
    fn get_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn save_product(&mut self, product: &Product) -> Result<Product, DomainError>;
    fn delete_product(&mut self, id: Uuid) -> Result<bool, DomainError>;
    /// Takes a write lock on every listed product until the transaction ends.
    /// `ids` must be sorted so that concurrent callers lock in the same order.
    fn lock_products(&mut self, ids: &[Uuid]) -> Result<(), DomainError>;
    /// Adds `delta` to the product's quantity only if the result stays `>= 0`.
    /// The check and the write are a single atomic step.
    fn adjust_stock(&mut self, id: Uuid, delta: i32) -> Result<StockAdjustment, DomainError>;
    fn find_products(
        &mut self,
        reference: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError>;
}

pub trait OrderStore {
    fn get_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Upserts the order and replaces its stored line items with `order.items`.
    fn save_order(&mut self, order: &Order) -> Result<Order, DomainError>;
    fn delete_order(&mut self, id: Uuid) -> Result<bool, DomainError>;
    fn find_orders(
        &mut self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError>;
}

/// One unit of work spanning both stores.
pub trait StoreTx: OrderStore + ProductStore {}

impl<T: OrderStore + ProductStore> StoreTx for T {}

pub trait Store: Clone + Send + Sync + 'static {
    /// Runs `f` as a single transaction: everything it wrote is committed when
    /// it returns `Ok` and discarded when it returns `Err`.
    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, DomainError>;
}
