//! Storefront and admin routers exercised without a database.
//!
//! Every request here is answered by validation, session checks or routing
//! before a query would run.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;

use atelier_integration_tests::{admin_app, storefront_app};

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_storefront_rejects_over_limit_brand_filter() {
    let ids: Vec<String> = (0..31).map(|i| format!("b{i}")).collect();
    let uri = format!("/products?brandIds={}&page=1", ids.join("%2C"));
    let response = storefront_app()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("brandIds"));
}

#[tokio::test]
async fn test_checkout_requires_an_address() {
    let request = serde_json::json!({
        "items": [{ "productId": "trench", "quantity": 1 }],
        "shipping": {
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "addressLine1": "  ",
            "city": "London",
            "postcode": "N1 9GU",
            "country": "GB"
        }
    });
    let response = storefront_app()
        .oneshot(post_json("/checkout", &request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "addressLine1 is required");
}

#[tokio::test]
async fn test_storefront_errors_carry_a_request_id() {
    let response = storefront_app()
        .oneshot(Request::get("/auth/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_admin_api_requires_a_session() {
    let app = admin_app();
    for (method, uri) in [
        ("GET", "/api/orders?status=Delivered"),
        ("POST", "/api/orders/o1/status"),
        ("POST", "/api/facets/colours/red/move"),
        ("PUT", "/api/settings/homepage"),
        ("POST", "/api/images/migrate"),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_admin_unknown_route_is_not_found() {
    let response = admin_app()
        .oneshot(Request::get("/api/warehouse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
