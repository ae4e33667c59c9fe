mod common;

use axum::{
    body::Body,
    http::{header, Method, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

use common::{
    admin_user, body_json, customer_user, raw_request, request, set_cookie_named, state_for,
    unreachable_url, MockBackend, Reply,
};

#[tokio::test]
async fn auth_required_routes_reject_missing_token_without_backend_calls() {
    let backend = MockBackend::start().await;
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let cases = [
        (Method::GET,    "/api/cart",                  None),
        (Method::POST,   "/api/cart",                  Some(json!({ "action": "add", "product_id": 1 }))),
        (Method::POST,   "/api/cart",                  Some(json!({ "action": "update", "item_id": 1, "quantity": 2 }))),
        (Method::POST,   "/api/cart",                  Some(json!({ "action": "remove", "item_id": 1 }))),
        (Method::POST,   "/api/cart",                  Some(json!({ "action": "clear" }))),
        (Method::DELETE, "/api/cart",                  None),
        (Method::POST,   "/api/cart/checkout",         None),
        (Method::GET,    "/api/wishlist",              None),
        (Method::POST,   "/api/wishlist/toggle/5",     None),
        (Method::GET,    "/api/user/profile",          None),
        (Method::PUT,    "/api/user/profile",          Some(json!({ "name": "New" }))),
        (Method::GET,    "/api/user/orders/stats",     None),
        (Method::PUT,    "/api/settings",              Some(json!({ "shop_name": "X" }))),
    ];

    for (method, uri, body) in cases {
        let response = app
            .clone()
            .oneshot(request(method.clone(), uri, None, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        let body = body_json(response).await;
        assert!(body["error"].is_string(), "{method} {uri}: {body}");
    }

    assert_eq!(backend.hit_count(), 0);
}

#[tokio::test]
async fn missing_token_wins_over_a_bad_body() {
    let backend = MockBackend::start().await;
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let cases = [
        (Method::POST, "/api/cart",          "text/plain",       "add one mug"),
        (Method::POST, "/api/cart",          "application/json", r#"{"action":"explode"}"#),
        (Method::POST, "/api/cart/checkout", "text/plain",       "now"),
        (Method::PUT,  "/api/user/profile",  "text/plain",       "name=New"),
        (Method::PUT,  "/api/settings",      "text/plain",       "shop_name=X"),
        (Method::POST, "/api/blogs/upload-image", "text/plain",  "not a form"),
    ];

    for (method, uri, content_type, body) in cases {
        let response = app
            .clone()
            .oneshot(raw_request(method.clone(), uri, None, content_type, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Authentication required" }),
            "{method} {uri}"
        );
    }
    assert_eq!(backend.hit_count(), 0);
}

#[tokio::test]
async fn malformed_bodies_are_json_errors() {
    let backend = MockBackend::start().await;
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .clone()
        .oneshot(raw_request(Method::PUT, "/api/user/profile", Some("token=abc"), "application/json", "{oops"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].as_str().unwrap().starts_with("Invalid JSON body"));

    let response = app
        .oneshot(raw_request(Method::POST, "/api/cart", Some("token=abc"), "text/plain", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Request body is required" }));

    assert_eq!(backend.hit_count(), 0);
}

#[tokio::test]
async fn non_multipart_upload_is_a_json_error() {
    let backend = MockBackend::start().await;
    backend.on(Method::GET, "/auth-check", Reply::ok(json!({ "authenticated": true, "user": admin_user() })));
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(raw_request(Method::POST, "/api/blogs/upload-image", Some("token=abc"), "text/plain", "raw"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
    assert!(backend.last_hit(Method::POST, "/admin/blogs/upload-image").is_none());
}

#[tokio::test]
async fn cart_is_returned_as_is() {
    let backend = MockBackend::start().await;
    let cart = json!({ "items": [{ "id": 9, "quantity": 2 }], "total": "19.98" });
    backend.on(Method::GET, "/cart", Reply::ok(cart.clone()));
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(request(Method::GET, "/api/cart", Some("token=abc"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, cart);
    let hit = backend.last_hit(Method::GET, "/cart").unwrap();
    assert_eq!(hit.header("authorization"), Some("Bearer abc"));
    assert_eq!(hit.header("x-xsrf-token"), None);
}

#[tokio::test]
async fn cart_actions_map_to_backend_verbs() {
    let backend = MockBackend::start().await;
    backend
        .on(Method::POST, "/cart", Reply::ok(json!({ "message": "added" })))
        .on(Method::PUT, "/cart/9", Reply::ok(json!({ "message": "updated" })))
        .on(Method::DELETE, "/cart/9", Reply::ok(json!({ "message": "removed" })))
        .on(Method::DELETE, "/cart", Reply::ok(json!({ "message": "cleared" })));
    let app = storefront_gateway::app(state_for(&backend.base_url));
    let cookie = Some("token=abc; XSRF-TOKEN=c1");

    let add = app
        .clone()
        .oneshot(request(Method::POST, "/api/cart", cookie, Some(json!({ "action": "add", "product_id": 4, "quantity": 1 }))))
        .await
        .unwrap();
    assert_eq!(body_json(add).await, json!({ "message": "added" }));
    let hit = backend.last_hit(Method::POST, "/cart").unwrap();
    assert_eq!(hit.json(), json!({ "product_id": 4, "quantity": 1 }));
    assert_eq!(hit.header("x-xsrf-token"), Some("c1"));

    let update = app
        .clone()
        .oneshot(request(Method::POST, "/api/cart", cookie, Some(json!({ "action": "update", "item_id": 9, "quantity": 3 }))))
        .await
        .unwrap();
    assert_eq!(body_json(update).await, json!({ "message": "updated" }));
    assert_eq!(backend.last_hit(Method::PUT, "/cart/9").unwrap().json()["quantity"], 3);

    let remove = app
        .clone()
        .oneshot(request(Method::POST, "/api/cart", cookie, Some(json!({ "action": "remove", "item_id": 9 }))))
        .await
        .unwrap();
    assert_eq!(body_json(remove).await, json!({ "message": "removed" }));

    let clear = app
        .oneshot(request(Method::DELETE, "/api/cart", cookie, None))
        .await
        .unwrap();
    assert_eq!(body_json(clear).await, json!({ "message": "cleared" }));
}

#[tokio::test]
async fn unknown_cart_action_is_rejected_locally() {
    let backend = MockBackend::start().await;
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(request(Method::POST, "/api/cart", Some("token=abc"), Some(json!({ "action": "explode" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.hit_count(), 0);
}

#[tokio::test]
async fn checkout_forwards_optional_body() {
    let backend = MockBackend::start().await;
    backend.on(Method::POST, "/cart/checkout", Reply::json(201, json!({ "order_id": 77 })));
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/cart/checkout",
            Some("token=abc"),
            Some(json!({ "payment_method": "cod" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "order_id": 77 }));
    let hit = backend.last_hit(Method::POST, "/cart/checkout").unwrap();
    assert_eq!(hit.json(), json!({ "payment_method": "cod" }));
}

#[tokio::test]
async fn upstream_errors_are_forwarded() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::PUT,
        "/user/profile",
        Reply::json(422, json!({ "message": "The email has already been taken." })),
    );
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(request(Method::PUT, "/api/user/profile", Some("token=abc"), Some(json!({ "email": "b@x.com" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await, json!({ "error": "The email has already been taken." }));
}

#[tokio::test]
async fn backend_rejection_clears_the_token() {
    let backend = MockBackend::start().await;
    backend.on(Method::GET, "/wishlist", Reply::json(401, json!({ "message": "Unauthenticated." })));
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(request(Method::GET, "/api/wishlist", Some("token=stale"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie_named(&response, "token").unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn transport_failures_become_generic_500s() {
    let app = storefront_gateway::app(state_for(&unreachable_url().await));

    let response = app
        .oneshot(request(Method::GET, "/api/user/orders/stats", Some("token=abc"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": storefront_gateway::errors::GENERIC_FAILURE })
    );
}

#[tokio::test]
async fn products_pass_query_and_gain_image_urls() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::GET,
        "/products",
        Reply::ok(json!({ "data": [{ "slug": "mug", "image": "products/mug.png" }], "meta": { "total": 1 } })),
    );
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(request(Method::GET, "/api/products?category=kitchen&page=2", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["image_url"], "https://cdn.test/storage/products/mug.png");
    assert_eq!(body["meta"]["total"], 1);

    let hit = backend.last_hit(Method::GET, "/products").unwrap();
    assert_eq!(hit.query.as_deref(), Some("category=kitchen&page=2"));
    assert_eq!(hit.header("authorization"), None);
}

#[tokio::test]
async fn missing_product_keeps_backend_status() {
    let backend = MockBackend::start().await;
    backend.on(Method::GET, "/products/ghost", Reply::json(404, json!({ "message": "Product not found" })));
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(request(Method::GET, "/api/products/ghost", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "error": "Product not found" }));
}

#[tokio::test]
async fn wishlist_toggle_targets_the_product() {
    let backend = MockBackend::start().await;
    backend.on(Method::POST, "/wishlist/toggle/5", Reply::ok(json!({ "in_wishlist": true })));
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(request(Method::POST, "/api/wishlist/toggle/5", Some("token=abc"), None))
        .await
        .unwrap();

    assert_eq!(body_json(response).await, json!({ "in_wishlist": true }));
}

#[tokio::test]
async fn settings_are_public_to_read() {
    let backend = MockBackend::start().await;
    backend.on(Method::GET, "/settings", Reply::ok(json!({ "shop_name": "Shop" })));
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(request(Method::GET, "/api/settings", None, None))
        .await
        .unwrap();

    assert_eq!(body_json(response).await, json!({ "shop_name": "Shop" }));
}

#[tokio::test]
async fn settings_update_requires_admin() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::GET,
        "/auth-check",
        Reply::ok(json!({ "authenticated": true, "user": customer_user() })),
    );
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(request(Method::PUT, "/api/settings", Some("token=abc"), Some(json!({ "shop_name": "X" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(backend.last_hit(Method::PUT, "/admin/settings").is_none());
}

fn multipart_request(cookie: Option<&str>) -> axum::extract::Request {
    let boundary = "X-TEST-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"image\"; filename=\"cover.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         PNGDATA\r\n\
         --{boundary}--\r\n"
    );
    let mut builder = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/blogs/upload-image")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"));
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn upload_image_is_relayed_for_admins() {
    let backend = MockBackend::start().await;
    backend
        .on(Method::GET, "/auth-check", Reply::ok(json!({ "authenticated": true, "user": admin_user() })))
        .on(Method::POST, "/admin/blogs/upload-image", Reply::ok(json!({ "url": "/storage/blogs/cover.png" })));
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app
        .oneshot(multipart_request(Some("token=abc; XSRF-TOKEN=c1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "url": "/storage/blogs/cover.png" }));

    let hit = backend.last_hit(Method::POST, "/admin/blogs/upload-image").unwrap();
    assert!(hit.header("content-type").unwrap().starts_with("multipart/form-data; boundary="));
    assert_eq!(hit.header("x-xsrf-token"), Some("c1"));
    let raw = String::from_utf8_lossy(&hit.body);
    assert!(raw.contains("filename=\"cover.png\""), "{raw}");
    assert!(raw.contains("PNGDATA"), "{raw}");
}

#[tokio::test]
async fn upload_image_refuses_non_admins() {
    let backend = MockBackend::start().await;
    backend.on(Method::GET, "/auth-check", Reply::ok(json!({ "authenticated": true, "user": customer_user() })));
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app.oneshot(multipart_request(Some("token=abc"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(backend.last_hit(Method::POST, "/admin/blogs/upload-image").is_none());
}

#[tokio::test]
async fn upload_image_requires_a_session() {
    let backend = MockBackend::start().await;
    let app = storefront_gateway::app(state_for(&backend.base_url));

    let response = app.oneshot(multipart_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(backend.hit_count(), 0);
}
