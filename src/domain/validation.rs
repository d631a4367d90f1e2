use serde::Serialize;
use utoipa::ToSchema;

use super::errors::DomainError;

/// A single rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collects field errors and turns them into a single `DomainError::Validation`.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require<T>(&mut self, field: &str, value: Option<&T>) -> &mut Self {
        if value.is_none() {
            self.errors.push(FieldError::new(field, "is required"));
        }
        self
    }

    pub fn not_blank(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, "must not be blank"));
        }
        self
    }

    pub fn at_least(&mut self, field: &str, value: i32, min: i32) -> &mut Self {
        if value < min {
            self.errors
                .push(FieldError::new(field, format!("must be at least {}", min)));
        }
        self
    }

    /// Counts characters, matching `VARCHAR(n)` semantics.
    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.errors.push(FieldError::new(
                field,
                format!("must be at most {} characters", max),
            ));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), DomainError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}
