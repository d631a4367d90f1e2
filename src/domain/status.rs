use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::shipping::ShippingDetails;

/// Order lifecycle status.
///
/// Only the initial value is derived; every later change is a direct overwrite
/// through a status patch or a full update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Open,
    StorePickup,
    Completed,
}

impl OrderStatus {
    /// Status assigned when an order is created with the given shipping details.
    pub fn initial_for(shipping: &ShippingDetails) -> Self {
        match shipping {
            ShippingDetails::StorePickup { .. } => OrderStatus::StorePickup,
            _ => OrderStatus::Open,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "OPEN",
            OrderStatus::StorePickup => "STORE_PICKUP",
            OrderStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(OrderStatus::Open),
            "STORE_PICKUP" => Ok(OrderStatus::StorePickup),
            "COMPLETED" => Ok(OrderStatus::Completed),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}
