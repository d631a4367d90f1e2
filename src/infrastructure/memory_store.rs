use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{OrderStore, ProductStore, StockAdjustment, Store, StoreTx};
use crate::domain::product::{Product, ProductInput};
use crate::domain::status::OrderStatus;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
}

/// Process-local store.
///
/// A transaction holds the store lock for its whole duration and works on a
/// private copy of the state, which replaces the shared state only when the
/// transaction succeeds. Transactions are therefore serialized and atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a product directly, bypassing validation.
    pub fn insert_product(&self, input: ProductInput) -> Result<Product, DomainError> {
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            reference: input.reference,
            quantity: input.quantity,
            image: input.image,
            created_at: Utc::now(),
        };
        self.transaction(|tx| tx.save_product(&product))
    }
}

impl Store for InMemoryStore {
    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, DomainError>,
    {
        let mut shared = self
            .state
            .lock()
            .map_err(|_| DomainError::Internal("in-memory store lock poisoned".to_string()))?;
        let mut scratch = shared.clone();
        let result = f(&mut scratch)?;
        *shared = scratch;
        Ok(result)
    }
}

impl MemoryState {
    fn with_current_products(&self, mut order: Order) -> Order {
        for item in &mut order.items {
            if let Some(product) = self.products.get(&item.product_id) {
                item.product_name = product.name.clone();
                item.product_reference = product.reference.clone();
                item.product_image = product.image.clone();
            }
        }
        order
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    Page::new(items, total, page)
}

impl ProductStore for MemoryState {
    fn get_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.products.get(&id).cloned())
    }

    fn save_product(&mut self, product: &Product) -> Result<Product, DomainError> {
        self.products.insert(product.id, product.clone());
        Ok(product.clone())
    }

    fn delete_product(&mut self, id: Uuid) -> Result<bool, DomainError> {
        let referencing = self
            .orders
            .values()
            .find(|order| order.items.iter().any(|item| item.product_id == id));
        if let Some(order) = referencing {
            return Err(DomainError::Conflict(format!(
                "product {} is still referenced by order {}",
                id, order.id
            )));
        }
        Ok(self.products.remove(&id).is_some())
    }

    fn lock_products(&mut self, _ids: &[Uuid]) -> Result<(), DomainError> {
        // The whole state is already locked for the transaction.
        Ok(())
    }

    fn adjust_stock(&mut self, id: Uuid, delta: i32) -> Result<StockAdjustment, DomainError> {
        let Some(product) = self.products.get_mut(&id) else {
            return Ok(StockAdjustment::Missing);
        };
        match product.quantity.checked_add(delta) {
            Some(quantity) if quantity >= 0 => {
                product.quantity = quantity;
                Ok(StockAdjustment::Applied(product.clone()))
            }
            Some(_) => Ok(StockAdjustment::Insufficient(product.clone())),
            None => Err(DomainError::Internal(format!(
                "stock of product {} would overflow",
                id
            ))),
        }
    }

    fn find_products(
        &mut self,
        reference: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        let mut matching: Vec<Product> = self
            .products
            .values()
            .filter(|p| reference.map_or(true, |r| p.reference.contains(r)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matching, page))
    }
}

impl OrderStore for MemoryState {
    fn get_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self
            .orders
            .get(&id)
            .cloned()
            .map(|order| self.with_current_products(order)))
    }

    fn save_order(&mut self, order: &Order) -> Result<Order, DomainError> {
        if let Some(item) = order
            .items
            .iter()
            .find(|item| !self.products.contains_key(&item.product_id))
        {
            return Err(DomainError::Conflict(format!(
                "order line references missing product {}",
                item.product_id
            )));
        }
        self.orders.insert(order.id, order.clone());
        Ok(self.with_current_products(order.clone()))
    }

    fn delete_order(&mut self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.orders.remove(&id).is_some())
    }

    fn find_orders(
        &mut self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        let mut matching: Vec<Order> = self
            .orders
            .values()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .map(|o| self.with_current_products(o))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(matching, page))
    }
}
