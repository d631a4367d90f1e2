use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::OrderService;
use crate::domain::blank_to_none;
use crate::domain::order::{CustomerDetails, LineItemRequest, NewOrder, Order, OrderUpdate};
use crate::domain::page::{PageRequest, DEFAULT_LIMIT};
use crate::domain::ports::Store;
use crate::domain::shipping::ShippingDetails;
use crate::domain::status::OrderStatus;
use crate::domain::validation::Validator;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LineItemPayload {
    pub product_id: Uuid,
    /// Units requested; must be at least 1.
    pub quantity: i32,
}

impl From<LineItemPayload> for LineItemRequest {
    fn from(p: LineItemPayload) -> Self {
        LineItemRequest {
            product_id: p.product_id,
            quantity: p.quantity,
        }
    }
}

/// Body of both `POST /orders` and `PUT /orders/{id}`.
///
/// On update, absent fields and empty strings leave the stored value alone,
/// and an absent or empty `items` list keeps the current line items.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct OrderRequest {
    pub customer_details: Option<CustomerDetails>,
    pub shipping_details: Option<ShippingDetails>,
    pub status: Option<OrderStatus>,
    pub observations: Option<String>,
    pub items: Option<Vec<LineItemPayload>>,
}

impl OrderRequest {
    fn into_new_order(self) -> Result<NewOrder, AppError> {
        Validator::new()
            .require("customer_details", self.customer_details.as_ref())
            .require("shipping_details", self.shipping_details.as_ref())
            .require("items", self.items.as_ref())
            .finish()?;

        let (Some(customer), Some(shipping), Some(items)) =
            (self.customer_details, self.shipping_details, self.items)
        else {
            return Err(AppError::BadRequest("incomplete order request".to_string()));
        };

        Ok(NewOrder {
            customer: customer.normalized(),
            shipping: shipping.normalized(),
            observations: blank_to_none(self.observations),
            items: items.into_iter().map(LineItemRequest::from).collect(),
        })
    }

    fn into_update(self) -> OrderUpdate {
        OrderUpdate {
            customer: self.customer_details.map(CustomerDetails::normalized),
            shipping: self.shipping_details.map(ShippingDetails::normalized),
            status: self.status,
            observations: blank_to_none(self.observations),
            items: self
                .items
                .filter(|items| !items.is_empty())
                .map(|items| items.into_iter().map(LineItemRequest::from).collect()),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PatchStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub reference: String,
    pub quantity: i32,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_details: CustomerDetails,
    pub shipping_details: ShippingDetails,
    pub status: OrderStatus,
    pub observations: Option<String>,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            customer_details: o.customer,
            shipping_details: o.shipping,
            status: o.status,
            observations: o.observations,
            created_at: o.created_at.to_rfc3339(),
            items: o
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    product_id: i.product_id,
                    name: i.product_name,
                    reference: i.product_reference,
                    quantity: i.quantity,
                    image: i.product_image,
                })
                .collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Only return orders in this status.
    pub status: Option<OrderStatus>,
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub(crate) fn default_page() -> i64 {
    1
}

pub(crate) fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders
///
/// Returns a page of orders with their line items, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("status" = Option<OrderStatus>, Query, description = "Status filter"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders<S: Store>(
    service: web::Data<OrderService<S>>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = PageRequest::new(params.page, params.limit);

    let result = web::block(move || service.list_orders(params.status, page)).await??;

    let result = result.map(OrderResponse::from);
    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items,
        total: result.total,
        page: result.page,
        limit: result.limit,
    }))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order<S: Store>(
    service: web::Data<OrderService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = web::block(move || service.get_order(order_id)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /orders
///
/// Creates an order and takes its items out of stock. Either every item is
/// available and the order is stored, or nothing changes.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Invalid request or insufficient stock"),
        (status = 404, description = "Referenced product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order<S: Store>(
    service: web::Data<OrderService<S>>,
    body: web::Json<OrderRequest>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner().into_new_order()?;
    let order = web::block(move || service.create_order(input)).await??;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// PUT /orders/{id}
///
/// Merges the present fields into the order. A non-empty `items` list
/// replaces the current line items, returning their stock before taking the
/// new quantities.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid request or insufficient stock"),
        (status = 404, description = "Order or product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order<S: Store>(
    service: web::Data<OrderService<S>>,
    path: web::Path<Uuid>,
    body: web::Json<OrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let update = body.into_inner().into_update();
    let order = web::block(move || service.replace_order(order_id, update)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /orders/{id}
///
/// Returns the order's stock to inventory, then removes it.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn delete_order<S: Store>(
    service: web::Data<OrderService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    web::block(move || service.delete_order(order_id)).await??;
    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /orders/{id}/status
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = PatchStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn patch_order_status<S: Store>(
    service: web::Data<OrderService<S>>,
    path: web::Path<Uuid>,
    body: web::Json<PatchStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status = body.into_inner().status;
    let order = web::block(move || service.patch_status(order_id, status)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shipping::CarrierDetails;

    #[test]
    fn create_requires_customer_shipping_and_items() {
        let err = OrderRequest::default().into_new_order().unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["customer_details", "shipping_details", "items"]);
    }

    #[test]
    fn update_treats_empty_values_as_absent() {
        let request = OrderRequest {
            customer_details: Some(CustomerDetails {
                name: Some(String::new()),
                email: Some("new@example.com".to_string()),
                phone: None,
            }),
            shipping_details: Some(ShippingDetails::Carrier(CarrierDetails {
                city: Some(String::new()),
                ..Default::default()
            })),
            status: None,
            observations: Some(String::new()),
            items: Some(vec![]),
        };
        let update = request.into_update();
        let customer = update.customer.unwrap();
        assert_eq!(customer.name, None);
        assert_eq!(customer.email.as_deref(), Some("new@example.com"));
        assert_eq!(
            update.shipping,
            Some(ShippingDetails::Carrier(CarrierDetails::default()))
        );
        assert_eq!(update.observations, None);
        assert!(update.items.is_none());
    }

    #[test]
    fn request_body_uses_snake_case_and_tagged_shipping() {
        let json = r#"{
            "customer_details": {"name": "Rui"},
            "shipping_details": {"type": "STORE_PICKUP"},
            "items": [{"product_id": "67e55044-10b1-426f-9247-bb680e5fe0c8", "quantity": 2}]
        }"#;
        let request: OrderRequest = serde_json::from_str(json).unwrap();
        let order = request.into_new_order().unwrap();
        assert_eq!(order.items[0].quantity, 2);
        assert!(matches!(order.shipping, ShippingDetails::StorePickup(_)));
    }
}
