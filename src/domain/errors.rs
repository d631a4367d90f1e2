use thiserror::Error;
use uuid::Uuid;

use super::validation::FieldError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error(
        "Product {product_name} has insufficient stock. Requested: {requested}, available: {available}"
    )]
    InsufficientStock {
        product_id: Uuid,
        product_name: String,
        requested: i32,
        available: i32,
    },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Concurrent modification, retry the request: {0}")]
    ConcurrencyConflict(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn order_not_found(id: Uuid) -> Self {
        DomainError::NotFound {
            entity: "Order",
            id,
        }
    }

    pub fn product_not_found(id: Uuid) -> Self {
        DomainError::NotFound {
            entity: "Product",
            id,
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
