pub mod orders;
pub mod products;

use actix_web::web;
use utoipa::OpenApi;

use crate::domain::ports::Store;
use crate::errors::AppError;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order,
        orders::patch_order_status,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
    ),
    tags(
        (name = "orders", description = "Orders and their stock reconciliation"),
        (name = "products", description = "Product catalogue and stock levels"),
    )
)]
pub struct ApiDoc;

/// Registers the order and product routes for a store type.
///
/// The caller provides `web::Data<OrderService<S>>` and
/// `web::Data<ProductService<S>>` as app data.
pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/orders")
            .route("", web::get().to(orders::list_orders::<S>))
            .route("", web::post().to(orders::create_order::<S>))
            .route("/{id}", web::get().to(orders::get_order::<S>))
            .route("/{id}", web::put().to(orders::update_order::<S>))
            .route("/{id}", web::delete().to(orders::delete_order::<S>))
            .route("/{id}/status", web::patch().to(orders::patch_order_status::<S>)),
    )
    .service(
        web::scope("/products")
            .route("", web::get().to(products::list_products::<S>))
            .route("", web::post().to(products::create_product::<S>))
            .route("/{id}", web::get().to(products::get_product::<S>))
            .route("/{id}", web::put().to(products::update_product::<S>))
            .route("/{id}", web::delete().to(products::delete_product::<S>)),
    );
}
