use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::shipping::ShippingDetails;
use super::status::OrderStatus;
use super::validation::Validator;
use super::{blank_to_none, overwrite};

pub const CUSTOMER_NAME_MAX_LEN: usize = 255;
pub const CUSTOMER_EMAIL_MAX_LEN: usize = 255;
pub const CUSTOMER_PHONE_MAX_LEN: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CustomerDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CustomerDetails {
    pub fn normalized(self) -> Self {
        Self {
            name: blank_to_none(self.name),
            email: blank_to_none(self.email),
            phone: blank_to_none(self.phone),
        }
    }

    fn check_lengths(&self, validator: &mut Validator) {
        validator
            .max_len(
                "customer_details.name",
                self.name.as_deref(),
                CUSTOMER_NAME_MAX_LEN,
            )
            .max_len(
                "customer_details.email",
                self.email.as_deref(),
                CUSTOMER_EMAIL_MAX_LEN,
            )
            .max_len(
                "customer_details.phone",
                self.phone.as_deref(),
                CUSTOMER_PHONE_MAX_LEN,
            );
    }

    fn merge(&mut self, update: CustomerDetails) {
        overwrite(&mut self.name, update.name);
        overwrite(&mut self.email, update.email);
        overwrite(&mut self.phone, update.phone);
    }
}

/// A product/quantity pairing held by an order.
///
/// Carries a snapshot of the product's display fields as of the last read so
/// that orders can be rendered without a second lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_reference: String,
    pub product_image: Option<String>,
    pub quantity: i32,
}

/// A requested line item, before any stock has been touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub customer: CustomerDetails,
    pub shipping: ShippingDetails,
    pub status: OrderStatus,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLineItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer: CustomerDetails,
    pub shipping: ShippingDetails,
    pub observations: Option<String>,
    pub items: Vec<LineItemRequest>,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut validator = Validator::new();
        self.customer.check_lengths(&mut validator);
        check_line_items(&mut validator, &self.items);
        validator.finish()
    }
}

/// A full update. Every `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub customer: Option<CustomerDetails>,
    pub shipping: Option<ShippingDetails>,
    pub status: Option<OrderStatus>,
    pub observations: Option<String>,
    /// Replaces the whole line-item collection when present and non-empty.
    pub items: Option<Vec<LineItemRequest>>,
}

impl OrderUpdate {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut validator = Validator::new();
        if let Some(customer) = &self.customer {
            customer.check_lengths(&mut validator);
        }
        if let Some(items) = &self.items {
            check_line_items(&mut validator, items);
        }
        validator.finish()
    }
}

impl Order {
    /// Builds a fresh order with the creation-time status derived from shipping.
    pub fn create(input: &NewOrder, items: Vec<OrderLineItem>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer: input.customer.clone(),
            shipping: input.shipping.clone(),
            status: OrderStatus::initial_for(&input.shipping),
            observations: input.observations.clone(),
            created_at: Utc::now(),
            items,
        }
    }

    /// Merges every field of `update` except the line items.
    pub fn merge_details(&mut self, update: OrderUpdate, today: NaiveDate) {
        if let Some(customer) = update.customer {
            self.customer.merge(customer);
        }
        if let Some(shipping) = update.shipping {
            let current = self.shipping.clone();
            self.shipping = current.merged_with(shipping, today);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        overwrite(&mut self.observations, update.observations);
    }
}

fn check_line_items(validator: &mut Validator, items: &[LineItemRequest]) {
    for (i, item) in items.iter().enumerate() {
        validator.at_least(&format!("items[{}].quantity", i), item.quantity, 1);
    }
}
