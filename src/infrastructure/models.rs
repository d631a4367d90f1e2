use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{CustomerDetails, Order, OrderLineItem};
use crate::domain::product::Product;
use crate::domain::shipping::{
    CarrierDetails, ExcursionDetails, PickupDetails, ShippingDetails, ShippingType,
};
use crate::schema::{order_lines, orders, products};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub reference: String,
    pub quantity: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            reference: row.reference,
            quantity: row.quantity,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        ProductRow {
            id: product.id,
            name: product.name.clone(),
            reference: product.reference.clone(),
            quantity: product.quantity,
            image: product.image.clone(),
            created_at: product.created_at,
        }
    }
}

/// Orders are stored flat; the shipping variant is rebuilt from
/// `shipping_type` and only the columns that belong to it.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable, AsChangeset)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct OrderRow {
    pub id: Uuid,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub shipping_type: String,
    pub delivery_address: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub excursion_name: Option<String>,
    pub seat_number: Option<String>,
    pub sector: Option<String>,
    pub transporter_name: Option<String>,
    pub status: String,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn from_order(order: &Order) -> Self {
        let mut row = OrderRow {
            id: order.id,
            customer_name: order.customer.name.clone(),
            customer_email: order.customer.email.clone(),
            customer_phone: order.customer.phone.clone(),
            shipping_type: order.shipping.shipping_type().as_str().to_string(),
            delivery_address: None,
            street: None,
            number: None,
            neighborhood: None,
            city: None,
            state: None,
            delivery_date: None,
            excursion_name: None,
            seat_number: None,
            sector: None,
            transporter_name: None,
            status: order.status.as_str().to_string(),
            observations: order.observations.clone(),
            created_at: order.created_at,
            updated_at: Utc::now(),
        };
        match &order.shipping {
            ShippingDetails::StorePickup(d) => {
                row.delivery_date = d.delivery_date;
            }
            ShippingDetails::Excursion(d) => {
                row.excursion_name = d.excursion_name.clone();
                row.seat_number = d.seat_number.clone();
                row.sector = d.sector.clone();
                row.delivery_date = d.delivery_date;
            }
            ShippingDetails::Carrier(d) => {
                row.transporter_name = d.transporter_name.clone();
                row.delivery_address = d.delivery_address.clone();
                row.street = d.street.clone();
                row.number = d.number.clone();
                row.neighborhood = d.neighborhood.clone();
                row.city = d.city.clone();
                row.state = d.state.clone();
            }
        }
        row
    }

    pub fn into_order(self, items: Vec<OrderLineItem>) -> Result<Order, DomainError> {
        let shipping_type: ShippingType =
            self.shipping_type.parse().map_err(DomainError::Internal)?;
        let shipping = match shipping_type {
            ShippingType::StorePickup => ShippingDetails::StorePickup(PickupDetails {
                delivery_date: self.delivery_date,
            }),
            ShippingType::Excursion => ShippingDetails::Excursion(ExcursionDetails {
                excursion_name: self.excursion_name,
                seat_number: self.seat_number,
                sector: self.sector,
                delivery_date: self.delivery_date,
            }),
            ShippingType::Carrier => ShippingDetails::Carrier(CarrierDetails {
                transporter_name: self.transporter_name,
                delivery_address: self.delivery_address,
                street: self.street,
                number: self.number,
                neighborhood: self.neighborhood,
                city: self.city,
                state: self.state,
            }),
        };
        Ok(Order {
            id: self.id,
            customer: CustomerDetails {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
            },
            shipping,
            status: self.status.parse().map_err(DomainError::Internal)?,
            observations: self.observations,
            created_at: self.created_at,
            items,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_lines)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub position: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl OrderLineRow {
    pub fn into_item(self, product: ProductRow) -> OrderLineItem {
        OrderLineItem {
            id: self.id,
            product_id: self.product_id,
            product_name: product.name,
            product_reference: product.reference,
            product_image: product.image,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_lines)]
pub struct NewOrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub position: i32,
    pub quantity: i32,
}
