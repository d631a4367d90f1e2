use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{ProductStore, Store};
use crate::domain::product::{Product, ProductInput};

pub struct ProductService<S> {
    store: S,
}

impl<S: Store> ProductService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create_product(&self, input: ProductInput) -> Result<Product, DomainError> {
        input.validate()?;
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            reference: input.reference,
            quantity: input.quantity,
            image: input.image,
            created_at: Utc::now(),
        };
        let product = self.store.transaction(|tx| tx.save_product(&product))?;
        log::info!(
            "product {} ({}) created with {} unit(s)",
            product.id,
            product.reference,
            product.quantity
        );
        Ok(product)
    }

    pub fn get_product(&self, id: Uuid) -> Result<Product, DomainError> {
        self.store
            .transaction(|tx| tx.get_product(id))?
            .ok_or_else(|| DomainError::product_not_found(id))
    }

    pub fn list_products(
        &self,
        reference: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        self.store
            .transaction(|tx| tx.find_products(reference, page))
    }

    /// Overwrites every editable field, including the absolute stock level.
    pub fn update_product(&self, id: Uuid, input: ProductInput) -> Result<Product, DomainError> {
        input.validate()?;
        let product = self.store.transaction(|tx| {
            let mut product = tx
                .get_product(id)?
                .ok_or_else(|| DomainError::product_not_found(id))?;
            product.name = input.name;
            product.reference = input.reference;
            product.quantity = input.quantity;
            product.image = input.image;
            tx.save_product(&product)
        })?;
        log::info!("product {} updated, stock now {}", id, product.quantity);
        Ok(product)
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = self.store.transaction(|tx| tx.delete_product(id))?;
        if !deleted {
            return Err(DomainError::product_not_found(id));
        }
        log::info!("product {} deleted", id);
        Ok(())
    }
}
