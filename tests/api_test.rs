//! HTTP-level tests of the order and product routes, backed by the in-memory
//! store.

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use order_stock_service::application::{OrderService, ProductService};
use order_stock_service::handlers;
use order_stock_service::infrastructure::InMemoryStore;
use serde_json::{json, Value};

async fn app() -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    let store = InMemoryStore::new();
    test::init_service(
        App::new()
            .app_data(web::Data::new(OrderService::new(store.clone())))
            .app_data(web::Data::new(ProductService::new(store)))
            .configure(handlers::configure::<InMemoryStore>),
    )
    .await
}

async fn send<S>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("response is JSON")
    };
    (status, value)
}

async fn create_product<S>(app: &S, reference: &str, quantity: i32) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/products").set_json(json!({
            "name": format!("Product {reference}"),
            "reference": reference,
            "quantity": quantity,
            "image": "img.png"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().expect("product id").to_string()
}

async fn product_stock<S>(app: &S, id: &str) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        test::TestRequest::get().uri(&format!("/products/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["quantity"].as_i64().expect("quantity")
}

fn order_body(product_id: &str, quantity: i32, shipping_type: &str) -> Value {
    json!({
        "customer_details": {"name": "Eva", "email": "eva@example.com", "phone": "555-0199"},
        "shipping_details": {"type": shipping_type, "city": "Olinda"},
        "observations": "gift wrap",
        "items": [{"product_id": product_id, "quantity": quantity}]
    })
}

#[actix_web::test]
async fn create_order_consumes_stock_and_renders_items() {
    let app = app().await;
    let product = create_product(&app, "MUG", 5).await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&product, 3, "CARRIER")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "OPEN");
    assert_eq!(body["shipping_details"]["type"], "CARRIER");
    assert_eq!(body["shipping_details"]["city"], "Olinda");
    assert_eq!(body["items"][0]["quantity"], 3);
    assert_eq!(body["items"][0]["reference"], "MUG");
    assert_eq!(body["items"][0]["image"], "img.png");
    assert_eq!(product_stock(&app, &product).await, 2);
}

#[actix_web::test]
async fn insufficient_stock_is_a_400_naming_the_amounts() {
    let app = app().await;
    let product = create_product(&app, "VASE", 2).await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&product, 3, "CARRIER")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Product Product VASE has insufficient stock. Requested: 3, available: 2"
    );
    assert_eq!(product_stock(&app, &product).await, 2);
}

#[actix_web::test]
async fn store_pickup_orders_start_in_store_pickup() {
    let app = app().await;
    let product = create_product(&app, "CUP", 1).await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&product, 1, "STORE_PICKUP")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "STORE_PICKUP");
}

#[actix_web::test]
async fn missing_fields_and_bad_quantities_return_field_errors() {
    let app = app().await;
    let product = create_product(&app, "PLATE", 1).await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({ "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["customer_details", "shipping_details"]);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&product, 0, "CARRIER")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "items[0].quantity");
    assert_eq!(product_stock(&app, &product).await, 1);
}

#[actix_web::test]
async fn overlong_fields_are_field_errors_not_server_errors() {
    let app = app().await;
    let product = create_product(&app, "TRAY", 3).await;

    let mut body = order_body(&product, 1, "CARRIER");
    body["customer_details"]["name"] = json!("x".repeat(300));
    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/orders").set_json(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "customer_details.name");
    assert_eq!(product_stock(&app, &product).await, 3);

    let (_, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&product, 1, "CARRIER")),
    )
    .await;
    let order_id = created["id"].as_str().unwrap().to_string();
    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/orders/{order_id}"))
            .set_json(json!({"customer_details": {"phone": "5".repeat(51)}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "customer_details.phone");

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/products").set_json(json!({
            "name": "Tray",
            "reference": "R".repeat(256),
            "quantity": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "reference");
}

#[actix_web::test]
async fn unknown_product_is_a_404() {
    let app = app().await;

    let (status, _) = send(
        &app,
        test::TestRequest::post().uri("/orders").set_json(order_body(
            "67e55044-10b1-426f-9247-bb680e5fe0c8",
            1,
            "CARRIER",
        )),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn put_replaces_items_and_delete_releases_them() {
    let app = app().await;
    let first = create_product(&app, "A", 5).await;
    let second = create_product(&app, "B", 5).await;

    let (_, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&first, 2, "CARRIER")),
    )
    .await;
    let order_id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/orders/{order_id}"))
            .set_json(json!({
                "customer_details": {"name": ""},
                "observations": "",
                "items": [{"product_id": second, "quantity": 4}]
            })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["customer_details"]["name"], "Eva");
    assert_eq!(updated["observations"], "gift wrap");
    assert_eq!(updated["items"][0]["product_id"], second.as_str());
    assert_eq!(product_stock(&app, &first).await, 5);
    assert_eq!(product_stock(&app, &second).await, 1);

    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/orders/{order_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(product_stock(&app, &second).await, 5);

    let (status, _) = send(
        &app,
        test::TestRequest::get().uri(&format!("/orders/{order_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn patch_status_and_filter_by_it() {
    let app = app().await;
    let product = create_product(&app, "BOWL", 10).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let (_, created) = send(
            &app,
            test::TestRequest::post()
                .uri("/orders")
                .set_json(order_body(&product, 1, "CARRIER")),
        )
        .await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    let (status, patched) = send(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/orders/{}/status", ids[1]))
            .set_json(json!({"status": "COMPLETED"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["status"], "COMPLETED");
    assert_eq!(product_stock(&app, &product).await, 7);

    let (status, page) = send(
        &app,
        test::TestRequest::get().uri("/orders?status=COMPLETED"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], ids[1].as_str());

    let (_, page) = send(&app, test::TestRequest::get().uri("/orders?page=1&limit=2")).await;
    assert_eq!(page["total"], 3);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let (status, page) = send(
        &app,
        test::TestRequest::get().uri("/orders?page=9223372036854775807&limit=100"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert!(page["items"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn products_can_be_filtered_updated_and_deleted() {
    let app = app().await;
    let red = create_product(&app, "MUG-RED", 1).await;
    create_product(&app, "MUG-BLUE", 1).await;
    create_product(&app, "PLATE", 1).await;

    let (_, page) = send(&app, test::TestRequest::get().uri("/products?reference=MUG")).await;
    assert_eq!(page["total"], 2);

    let (status, updated) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/products/{red}"))
            .set_json(json!({"name": "Red mug", "reference": "MUG-RED", "quantity": 12})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 12);
    assert_eq!(updated["image"], Value::Null);

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/products/{red}"))
            .set_json(json!({"name": "Red mug", "reference": "MUG-RED", "quantity": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "quantity");

    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/products/{red}")),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/products/{red}")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_a_product_in_use_is_a_conflict() {
    let app = app().await;
    let product = create_product(&app, "JAR", 2).await;
    send(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(&product, 1, "EXCURSION")),
    )
    .await;

    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/products/{product}")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn malformed_json_is_a_400() {
    let app = app().await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
