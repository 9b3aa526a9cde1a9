use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{app, AppState};
use tower::ServiceExt;
use uuid::Uuid;

async fn test_app() -> Router {
    let pool = db::connect_in_memory().await.expect("in-memory pool");
    app(AppState { pool })
}

fn caller() -> Uuid {
    Uuid::new_v4()
}

fn request(method: Method, uri: &str, caller: Option<Uuid>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header("X-USER-ID", caller.to_string());
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, req).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

async fn create_banner(app: &Router, caller: Uuid, label: &str) -> Value {
    let (status, banner) = send_json(
        app,
        request(
            Method::POST,
            "/api/banners",
            Some(caller),
            Some(json!({ "label": label, "image": format!("{label}.jpg") })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    banner
}

async fn create_category(app: &Router, caller: Uuid, title: &str, banner_ids: Vec<&Value>) -> Value {
    let ids: Vec<&Value> = banner_ids.iter().map(|b| &b["id"]).collect();
    let (status, category) = send_json(
        app,
        request(
            Method::POST,
            "/api/categories",
            Some(caller),
            Some(json!({ "title": title, "description": "about", "bannerIds": ids })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    category
}

async fn create_product(app: &Router, caller: Uuid, title: &str, price: f64, category: &Value) -> Value {
    let (status, product) = send_json(
        app,
        request(
            Method::POST,
            "/api/products",
            Some(caller),
            Some(json!({
                "title": title,
                "price": price,
                "discount": 5.0,
                "isAvailable": true,
                "categoryIds": [category["id"]],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    product
}

async fn create_user(app: &Router, caller: Uuid, email: &str) -> Value {
    let (status, user) = send_json(
        app,
        request(
            Method::POST,
            "/api/users",
            Some(caller),
            Some(json!({ "name": "Sam", "email": email, "phone": null })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    user
}

fn id_of(entity: &Value) -> &str {
    entity["id"].as_str().unwrap()
}

#[tokio::test]
async fn test_mutation_without_identity_header_is_unauthorized() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/banners",
            None,
            Some(json!({ "label": "Sale", "image": "sale.jpg" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, b"Unauthorized");
}

#[tokio::test]
async fn test_list_endpoints_are_public() {
    let app = test_app().await;

    let (status, body) = send_json(&app, request(Method::GET, "/api/banners", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_banner_validation_messages() {
    let app = test_app().await;
    let caller = caller();

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/banners",
            Some(caller),
            Some(json!({ "label": " ", "image": "sale.jpg" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"Label is required");

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/banners",
            Some(caller),
            Some(json!({ "label": "Sale", "image": "" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"Image is required");
}

#[tokio::test]
async fn test_banner_round_trip_and_delete() {
    let app = test_app().await;
    let caller = caller();

    let banner = create_banner(&app, caller, "Sale").await;
    assert_eq!(banner["label"], "Sale");
    assert_eq!(banner["image"], "Sale.jpg");

    let uri = format!("/api/banners/{}", id_of(&banner));
    let (status, fetched) = send_json(&app, request(Method::GET, &uri, Some(caller), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, banner);

    let (status, updated) = send_json(
        &app,
        request(
            Method::PATCH,
            &uri,
            Some(caller),
            Some(json!({ "label": "Clearance", "image": "clearance.jpg" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["label"], "Clearance");

    let (status, _) = send(&app, request(Method::DELETE, &uri, Some(caller), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, request(Method::GET, &uri, Some(caller), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"banner not found");
}

#[tokio::test]
async fn test_category_keeps_banner_selection_order() {
    let app = test_app().await;
    let caller = caller();

    let first = create_banner(&app, caller, "First").await;
    let second = create_banner(&app, caller, "Second").await;

    let category = create_category(&app, caller, "Shoes", vec![&second, &first]).await;
    let labels: Vec<&str> = category["banners"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Second", "First"]);

    // PATCH replaces the whole selection.
    let uri = format!("/api/categories/{}", id_of(&category));
    let (status, updated) = send_json(
        &app,
        request(
            Method::PATCH,
            &uri,
            Some(caller),
            Some(json!({
                "title": "Shoes",
                "description": "about",
                "bannerIds": [first["id"]],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["banners"].as_array().unwrap().len(), 1);
    assert_eq!(updated["banners"][0]["label"], "First");
}

#[tokio::test]
async fn test_referenced_category_delete_conflicts_and_survives() {
    let app = test_app().await;
    let caller = caller();

    let banner = create_banner(&app, caller, "Sale").await;
    let category = create_category(&app, caller, "Shoes", vec![&banner]).await;
    create_product(&app, caller, "Trail Runner", 80.0, &category).await;

    let uri = format!("/api/categories/{}", id_of(&category));
    let (status, body) = send(&app, request(Method::DELETE, &uri, Some(caller), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        b"Make sure you removed all products using this category first."
    );

    // The row is untouched by the failed delete.
    let (status, _) = send(&app, request(Method::GET, &uri, Some(caller), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_product_list_filters_and_degrades_on_bad_params() {
    let app = test_app().await;
    let caller = caller();

    let banner = create_banner(&app, caller, "Sale").await;
    let shoes = create_category(&app, caller, "Shoes", vec![&banner]).await;
    let hats = create_category(&app, caller, "Hats", vec![&banner]).await;
    create_product(&app, caller, "Trail Runner", 80.0, &shoes).await;
    create_product(&app, caller, "Beanie", 15.0, &hats).await;

    // Category filter is a case-insensitive substring match.
    let (status, listed) =
        send_json(&app, request(Method::GET, "/api/products?category=SHOE", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Trail Runner"]);

    // Malformed page and unknown sort degrade to defaults, never 4xx.
    let (status, listed) = send_json(
        &app,
        request(
            Method::GET,
            "/api/products?page=abc&sort=alphabetical",
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_order_rows_are_formatted_for_display() {
    let app = test_app().await;
    let caller = caller();

    let banner = create_banner(&app, caller, "Sale").await;
    let category = create_category(&app, caller, "Shoes", vec![&banner]).await;
    let product = create_product(&app, caller, "Trail Runner", 25.0, &category).await;
    let user = create_user(&app, caller, "sam@example.com").await;

    let (status, order) = send_json(
        &app,
        request(
            Method::POST,
            "/api/orders",
            Some(caller),
            Some(json!({
                "userId": user["id"],
                "items": [{ "productId": product["id"], "count": 3 }],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // (25 - 5 discount) * 3
    assert_eq!(order["payable"], 60.0);
    assert_eq!(order["number"], 1);
    assert_eq!(order["items"].as_array().unwrap().len(), 1);

    let (status, rows) = send_json(&app, request(Method::GET, "/api/orders", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let row = &rows.as_array().unwrap()[0];
    assert_eq!(row["number"], "Order #1");
    assert_eq!(row["payable"], "$60");
    assert_eq!(row["isPaid"], false);
    // "Month Day(suffix), Year"
    let date = row["date"].as_str().unwrap();
    assert!(date.contains(", 20"), "unexpected date format: {date}");

    // Toggle the paid flag and filter on it.
    let uri = format!("/api/orders/{}", order["id"].as_str().unwrap());
    let (status, updated) = send_json(
        &app,
        request(Method::PATCH, &uri, Some(caller), Some(json!({ "isPaid": true }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isPaid"], true);

    let (status, rows) =
        send_json(&app, request(Method::GET, "/api/orders?isPaid=false", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_user_with_orders_cannot_be_deleted() {
    let app = test_app().await;
    let caller = caller();

    let banner = create_banner(&app, caller, "Sale").await;
    let category = create_category(&app, caller, "Shoes", vec![&banner]).await;
    let product = create_product(&app, caller, "Trail Runner", 25.0, &category).await;
    let user = create_user(&app, caller, "sam@example.com").await;

    let (status, _) = send_json(
        &app,
        request(
            Method::POST,
            "/api/orders",
            Some(caller),
            Some(json!({
                "userId": user["id"],
                "items": [{ "productId": product["id"], "count": 1 }],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/users/{}", id_of(&user));
    let (status, body) = send(&app, request(Method::DELETE, &uri, Some(caller), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, b"Make sure you removed all orders using this user first.");
}

#[tokio::test]
async fn test_addresses_are_scoped_to_the_caller() {
    let app = test_app().await;
    let owner = create_user(&app, caller(), "owner@example.com").await;
    let owner_id = Uuid::parse_str(id_of(&owner)).unwrap();
    let stranger = create_user(&app, caller(), "stranger@example.com").await;
    let stranger_id = Uuid::parse_str(id_of(&stranger)).unwrap();

    let (status, address) = send_json(
        &app,
        request(
            Method::POST,
            "/api/addresses",
            Some(owner_id),
            Some(json!({
                "address": "1 Main St",
                "city": "Springfield",
                "postalCode": "12345",
                "country": "US",
                "phone": null,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, listed) =
        send_json(&app, request(Method::GET, "/api/addresses", Some(owner_id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Another caller sees nothing and cannot touch the row.
    let (status, listed) =
        send_json(&app, request(Method::GET, "/api/addresses", Some(stranger_id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 0);

    let uri = format!("/api/addresses/{}", id_of(&address));
    let (status, _) = send(&app, request(Method::DELETE, &uri, Some(stranger_id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
