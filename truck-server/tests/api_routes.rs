use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{Days, NaiveDate};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::MenuItem;
use shared::util::today;
use tower::ServiceExt;
use truck_server::cart::Cart;
use truck_server::catalog::MemoryCatalog;
use truck_server::maps::MapService;
use truck_server::notifier::NoopNotifier;
use truck_server::{AppState, Config, create_router};

fn app() -> Router {
    let state = AppState::from_parts(
        Config::default(),
        Arc::new(MemoryCatalog::new()),
        Arc::new(NoopNotifier),
        MapService::unconfigured(),
        None,
    );
    create_router(state)
}

fn next_week() -> NaiveDate {
    today() + Days::new(7)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "truck-server");
    assert_eq!(body["maps_loaded"], Value::Null);
}

#[tokio::test]
async fn test_menu_filters() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/menu",
        Some(json!({
            "name": "Festival",
            "description": "Sweet fried dumpling",
            "price": "3.50",
            "category": "sides",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/menu?category=sides", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, "/api/menu?category=dessert", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, Method::GET, "/api/menu?category=pizza", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6003);
}

#[tokio::test]
async fn test_menu_rejects_non_positive_price() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/menu",
        Some(json!({
            "name": "Freebie",
            "price": "0",
            "category": "extras",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6002);
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "location_id": "loc-1",
            "date": "2024-06-01",
            "time_slot": "11:00 AM",
            "customer": {"name": "Ama", "email": "ama@example.com", "phone": "555-0100"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4002);
}

#[tokio::test]
async fn test_location_admin_and_order_placement() {
    let app = app();
    let (status, location) = send(
        &app,
        Method::POST,
        "/api/admin/locations",
        Some(json!({
            "name": "Uptown",
            "address": "100 Main St",
            "lat": 40.8,
            "lng": -73.9,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let location_id = location["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, Method::GET, "/api/admin/locations?q=main", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/schedules",
        Some(json!({
            "location_id": location_id,
            "date": next_week(),
            "start_time": "11:00:00",
            "end_time": "14:00:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, item) = send(
        &app,
        Method::POST,
        "/api/admin/menu",
        Some(json!({
            "name": "Jerk Chicken",
            "price": "10.00",
            "category": "signatures",
        })),
    )
    .await;
    let item: MenuItem = serde_json::from_value(item).unwrap();
    let mut cart = Cart::new();
    cart.add(&item);
    cart.add(&item);

    let (status, confirmation) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "location_id": location_id,
            "date": next_week(),
            "time_slot": "11:30 AM",
            "customer": {"name": "Ama", "email": "ama@example.com", "phone": "555-0100"},
            "cart": cart,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmation["location_name"], "Uptown");
    assert_eq!(confirmation["order"]["status"], "pending");
    assert_eq!(confirmation["items"].as_array().unwrap().len(), 1);

    let (status, orders) = send(&app, Method::GET, "/api/admin/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_location_without_coordinates_needs_maps() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/locations",
        Some(json!({"name": "Downtown", "address": "1 Market St"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7002);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/admin/orders/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
}

#[tokio::test]
async fn test_send_order_email_without_relay() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/functions/send-order-email",
        Some(json!({
            "order": {
                "id": "o-1",
                "customer_name": "Ama",
                "customer_email": "ama@example.com",
                "location_name": "Uptown",
                "pickup_time": "2024-06-01T15:00:00Z",
                "total_amount": 20.0,
                "items": [],
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to send confirmation email");
    assert!(body["details"].as_str().unwrap().contains("RESEND_API_KEY"));
}

#[tokio::test]
async fn test_send_order_email_rejects_impossible_lines() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/functions/send-order-email",
        Some(json!({
            "order": {
                "id": "o-1",
                "customer_name": "Ama",
                "customer_email": "ama@example.com",
                "location_name": "Uptown",
                "pickup_time": "2024-06-01T15:00:00Z",
                "total_amount": 20.0,
                "items": [
                    {"menuItem": {"name": "Jerk Chicken", "price": 1.0e20}, "quantity": 2147483647}
                ],
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to send confirmation email");
    assert!(body["details"].as_str().unwrap().contains("Jerk Chicken"));
}

/// Location, schedule and one stored menu item; returns (location id, item)
async fn seed_stop(app: &Router) -> (String, MenuItem) {
    let (_, location) = send(
        app,
        Method::POST,
        "/api/admin/locations",
        Some(json!({"name": "Uptown", "address": "100 Main St", "lat": 40.8, "lng": -73.9})),
    )
    .await;
    let location_id = location["id"].as_str().unwrap().to_string();
    send(
        app,
        Method::POST,
        "/api/admin/schedules",
        Some(json!({
            "location_id": location_id,
            "date": next_week(),
            "start_time": "11:00:00",
            "end_time": "14:00:00",
        })),
    )
    .await;
    let (_, item) = send(
        app,
        Method::POST,
        "/api/admin/menu",
        Some(json!({"name": "Jerk Chicken", "price": "10.00", "category": "signatures"})),
    )
    .await;
    (location_id, serde_json::from_value(item).unwrap())
}

fn order_body(location_id: &str, date: NaiveDate, slot: &str, cart: Value) -> Value {
    json!({
        "location_id": location_id,
        "date": date,
        "time_slot": slot,
        "customer": {"name": "Ama", "email": "ama@example.com", "phone": "555-0100"},
        "cart": cart,
    })
}

#[tokio::test]
async fn test_order_with_forged_cart_lines_is_rejected() {
    let app = app();
    let (location_id, item) = seed_stop(&app).await;
    let line = |id: &str, quantity: u64, unit_price: &str| {
        let mut menu_item = serde_json::to_value(&item).unwrap();
        menu_item["id"] = json!(id);
        json!([{"menu_item": menu_item, "quantity": quantity, "unit_price": unit_price}])
    };

    let cases = [
        (line(&item.id, 1, "-50.00"), StatusCode::BAD_REQUEST, 4008),
        (line(&item.id, 4_000_000_000, "10.00"), StatusCode::BAD_REQUEST, 4008),
        (
            line(&item.id, 2, "79228162514264337593543950335"),
            StatusCode::BAD_REQUEST,
            4008,
        ),
        (line("ghost", 1, "10.00"), StatusCode::NOT_FOUND, 6001),
    ];
    for (cart, status, code) in cases {
        let (got, body) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(order_body(&location_id, next_week(), "11:30 AM", cart)),
        )
        .await;
        assert_eq!(got, status, "{body}");
        assert_eq!(body["code"], code);
    }

    let (_, orders) = send(&app, Method::GET, "/api/admin/orders", None).await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn test_order_outside_schedule_is_rejected() {
    let app = app();
    let (location_id, item) = seed_stop(&app).await;
    let mut cart = Cart::new();
    cart.add(&item);
    let cart = serde_json::to_value(&cart).unwrap();

    let cases = [
        (next_week(), "3:00 AM"),
        (next_week() + Days::new(1), "11:30 AM"),
        (today() - Days::new(1), "11:30 AM"),
    ];
    for (date, slot) in cases {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(order_body(&location_id, date, slot, cart.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{date} {slot}");
        assert_eq!(body["code"], 4005);
    }

    let (_, orders) = send(&app, Method::GET, "/api/admin/orders", None).await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn test_catering_packages_and_quote() {
    let app = app();
    let (status, menu) = send(&app, Method::GET, "/api/catering/packages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(menu["packages"].as_array().unwrap().len(), 6);
    assert_eq!(menu["earliest_date"], json!(today() + Days::new(3)));
    assert_eq!(menu["min_guests"], 20);

    let (status, quote) = send(
        &app,
        Method::POST,
        "/api/catering/quote",
        Some(json!({
            "date": today() + Days::new(3),
            "guests": 40,
            "items": {"jollof-rice": 2, "plantains": 1, "rice": 0},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["lines"].as_array().unwrap().len(), 2);
    let total: rust_decimal::Decimal = serde_json::from_value(quote["total"].clone()).unwrap();
    assert_eq!(total, rust_decimal::Decimal::from(125));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/catering/quote",
        Some(json!({
            "date": today() + Days::new(1),
            "guests": 40,
            "items": {"rice": 1},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4201);
}
