use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::ProductService;
use crate::domain::blank_to_none;
use crate::domain::page::PageRequest;
use crate::domain::ports::Store;
use crate::domain::product::{Product, ProductInput};
use crate::errors::AppError;

use super::orders::{default_limit, default_page};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: String,
    pub reference: String,
    /// Units on hand; must not be negative.
    pub quantity: i32,
    pub image: Option<String>,
}

impl From<ProductRequest> for ProductInput {
    fn from(r: ProductRequest) -> Self {
        ProductInput {
            name: r.name,
            reference: r.reference,
            quantity: r.quantity,
            image: blank_to_none(r.image),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub reference: String,
    pub quantity: i32,
    pub image: Option<String>,
    pub created_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            reference: p.reference,
            quantity: p.quantity,
            image: p.image,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListProductsParams {
    /// Substring of the product reference.
    pub reference: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListProductsResponse {
    pub items: Vec<ProductResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    params(
        ("reference" = Option<String>, Query, description = "Reference substring filter"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of products", body = ListProductsResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products<S: Store>(
    service: web::Data<ProductService<S>>,
    query: web::Query<ListProductsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = PageRequest::new(params.page, params.limit);
    let reference = blank_to_none(params.reference);

    let result =
        web::block(move || service.list_products(reference.as_deref(), page)).await??;

    let result = result.map(ProductResponse::from);
    Ok(HttpResponse::Ok().json(ListProductsResponse {
        items: result.items,
        total: result.total,
        page: result.page,
        limit: result.limit,
    }))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product<S: Store>(
    service: web::Data<ProductService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let product = web::block(move || service.get_product(product_id)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid request"),
    ),
    tag = "products"
)]
pub async fn create_product<S: Store>(
    service: web::Data<ProductService<S>>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let input = ProductInput::from(body.into_inner());
    let product = web::block(move || service.create_product(input)).await??;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// PUT /products/{id}
///
/// Overwrites every field, including the stock level.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product<S: Store>(
    service: web::Data<ProductService<S>>,
    path: web::Path<Uuid>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let input = ProductInput::from(body.into_inner());
    let product = web::block(move || service.update_product(product_id, input)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product is still referenced by an order"),
    ),
    tag = "products"
)]
pub async fn delete_product<S: Store>(
    service: web::Data<ProductService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    web::block(move || service.delete_product(product_id)).await??;
    Ok(HttpResponse::NoContent().finish())
}
