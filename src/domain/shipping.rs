use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{blank_to_none, overwrite};

/// How an order leaves the store. Each variant carries only its own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingDetails {
    StorePickup(PickupDetails),
    Excursion(ExcursionDetails),
    Carrier(CarrierDetails),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PickupDetails {
    pub delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ExcursionDetails {
    pub excursion_name: Option<String>,
    pub seat_number: Option<String>,
    pub sector: Option<String>,
    pub delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CarrierDetails {
    pub transporter_name: Option<String>,
    pub delivery_address: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingType {
    StorePickup,
    Excursion,
    Carrier,
}

impl ShippingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingType::StorePickup => "STORE_PICKUP",
            ShippingType::Excursion => "EXCURSION",
            ShippingType::Carrier => "CARRIER",
        }
    }
}

impl FromStr for ShippingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STORE_PICKUP" => Ok(ShippingType::StorePickup),
            "EXCURSION" => Ok(ShippingType::Excursion),
            "CARRIER" => Ok(ShippingType::Carrier),
            other => Err(format!("unknown shipping type '{}'", other)),
        }
    }
}

impl ShippingDetails {
    pub fn shipping_type(&self) -> ShippingType {
        match self {
            ShippingDetails::StorePickup(_) => ShippingType::StorePickup,
            ShippingDetails::Excursion(_) => ShippingType::Excursion,
            ShippingDetails::Carrier(_) => ShippingType::Carrier,
        }
    }

    /// Empty strings carry no information; treat them as absent.
    pub fn normalized(self) -> Self {
        match self {
            ShippingDetails::StorePickup(d) => ShippingDetails::StorePickup(d),
            ShippingDetails::Excursion(d) => ShippingDetails::Excursion(ExcursionDetails {
                excursion_name: blank_to_none(d.excursion_name),
                seat_number: blank_to_none(d.seat_number),
                sector: blank_to_none(d.sector),
                delivery_date: d.delivery_date,
            }),
            ShippingDetails::Carrier(d) => ShippingDetails::Carrier(CarrierDetails {
                transporter_name: blank_to_none(d.transporter_name),
                delivery_address: blank_to_none(d.delivery_address),
                street: blank_to_none(d.street),
                number: blank_to_none(d.number),
                neighborhood: blank_to_none(d.neighborhood),
                city: blank_to_none(d.city),
                state: blank_to_none(d.state),
            }),
        }
    }

    /// Applies a shipping update on top of the stored details.
    ///
    /// Only the fields of the requested variant are considered. Staying on the
    /// same variant overwrites the fields that are present; switching variant
    /// replaces the stored details outright. Store pickup always takes `today`
    /// as its delivery date.
    pub fn merged_with(self, request: ShippingDetails, today: NaiveDate) -> ShippingDetails {
        match (self, request) {
            (_, ShippingDetails::StorePickup(_)) => ShippingDetails::StorePickup(PickupDetails {
                delivery_date: Some(today),
            }),
            (ShippingDetails::Excursion(mut current), ShippingDetails::Excursion(req)) => {
                overwrite(&mut current.excursion_name, req.excursion_name);
                overwrite(&mut current.seat_number, req.seat_number);
                overwrite(&mut current.sector, req.sector);
                overwrite(&mut current.delivery_date, req.delivery_date);
                ShippingDetails::Excursion(current)
            }
            (ShippingDetails::Carrier(mut current), ShippingDetails::Carrier(req)) => {
                overwrite(&mut current.transporter_name, req.transporter_name);
                overwrite(&mut current.delivery_address, req.delivery_address);
                overwrite(&mut current.street, req.street);
                overwrite(&mut current.number, req.number);
                overwrite(&mut current.neighborhood, req.neighborhood);
                overwrite(&mut current.city, req.city);
                overwrite(&mut current.state, req.state);
                ShippingDetails::Carrier(current)
            }
            (_, switched) => switched,
        }
    }
}
