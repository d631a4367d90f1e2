use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::validation::Validator;

pub const NAME_MAX_LEN: usize = 255;
pub const REFERENCE_MAX_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub reference: String,
    /// Units on hand. Never negative.
    pub quantity: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating or fully overwriting a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub reference: String,
    pub quantity: i32,
    pub image: Option<String>,
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        Validator::new()
            .not_blank("name", &self.name)
            .not_blank("reference", &self.reference)
            .max_len("name", Some(self.name.as_str()), NAME_MAX_LEN)
            .max_len("reference", Some(self.reference.as_str()), REFERENCE_MAX_LEN)
            .at_least("quantity", self.quantity, 0)
            .finish()
    }
}
