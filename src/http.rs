//! HTTP transport — the order resource over axum.
//!
//! Requires the `http` feature.
//!
//! ## Routes
//!
//! - `POST /orders` — place an order (authenticated user).
//! - `GET /orders/my-orders` — the caller's orders, newest first.
//! - `GET /orders/:order_id` — one order; scoped to the owner unless the
//!   caller is an admin.
//! - `GET /orders/admin/all` — every order (admin).
//! - `PATCH /orders/:order_id/status` — write a new status tag (admin).
//! - `GET /health` — health check with the registered subcategory tags.
//!
//! Identity arrives as headers (see [`crate::session`]); a missing user id
//! is a 401, as is a non-admin caller on the admin surface.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use storefront_orders::{http, CatalogRegistry, InMemoryStore, OrderService};
//!
//! let service = Arc::new(OrderService::new(
//!     InMemoryStore::new(),
//!     Arc::new(CatalogRegistry::new()),
//! ));
//!
//! // Get the router to compose with other axum routes
//! let app = http::router(service.clone());
//!
//! // Or serve directly
//! http::serve(service, "0.0.0.0:3000").await?;
//! ```

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::error;

use crate::orders::{OrderError, OrderService, PlaceOrder, UpdateOrderStatus};
use crate::session::Session;
use crate::store::Store;

/// Build an axum `Router` serving the order resource.
pub fn router<S: Store + 'static>(service: Arc<OrderService<S>>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/orders", post(place_order_handler))
        .route("/orders/my-orders", get(my_orders_handler))
        .route("/orders/admin/all", get(admin_all_handler))
        .route("/orders/:order_id", get(get_order_handler))
        .route("/orders/:order_id/status", patch(update_status_handler))
        .with_state(service)
}

/// Serve the order resource over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve<S: Store + 'static>(
    service: Arc<OrderService<S>>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// `GET /health` — returns `{ "ok": true, "subcategories": [...] }`.
async fn health_handler<S: Store + 'static>(
    State(service): State<Arc<OrderService<S>>>,
) -> impl IntoResponse {
    let mut subcategories = service.catalog().subcategories();
    subcategories.sort_unstable();
    Json(json!({ "ok": true, "subcategories": subcategories }))
}

/// `POST /orders` — place an order for the authenticated user.
async fn place_order_handler<S: Store + 'static>(
    State(service): State<Arc<OrderService<S>>>,
    headers: HeaderMap,
    Json(input): Json<PlaceOrder>,
) -> Response {
    let session = session_from_headers(&headers);
    let Some(user_id) = session.user_id() else {
        return unauthorized("missing user id");
    };

    match service.place_order(user_id, input) {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /orders/my-orders` — the caller's orders, newest first.
async fn my_orders_handler<S: Store + 'static>(
    State(service): State<Arc<OrderService<S>>>,
    headers: HeaderMap,
) -> Response {
    let session = session_from_headers(&headers);
    let Some(user_id) = session.user_id() else {
        return unauthorized("missing user id");
    };

    match service.orders_for_user(user_id) {
        Ok(orders) => Json(orders).into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /orders/:order_id` — one order, scoped to the owner for regular
/// callers, unscoped for admins.
async fn get_order_handler<S: Store + 'static>(
    State(service): State<Arc<OrderService<S>>>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let session = session_from_headers(&headers);
    let Some(user_id) = session.user_id() else {
        return unauthorized("missing user id");
    };

    let result = if session.is_admin() {
        service.order_unscoped(&order_id)
    } else {
        service.order_for_user(&order_id, user_id)
    };

    match result {
        Ok(order) => Json(order).into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /orders/admin/all` — every order for every user.
async fn admin_all_handler<S: Store + 'static>(
    State(service): State<Arc<OrderService<S>>>,
    headers: HeaderMap,
) -> Response {
    let session = session_from_headers(&headers);
    if !session.is_admin() {
        return unauthorized("admin role required");
    }

    match service.all_orders() {
        Ok(orders) => Json(orders).into_response(),
        Err(e) => error_response(e),
    }
}

/// `PATCH /orders/:order_id/status` — write a new status tag.
async fn update_status_handler<S: Store + 'static>(
    State(service): State<Arc<OrderService<S>>>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpdateOrderStatus>,
) -> Response {
    let session = session_from_headers(&headers);
    if !session.is_admin() {
        return unauthorized("admin role required");
    }

    match service.update_status(&order_id, &body.order_status) {
        Ok(order) => Json(order).into_response(),
        Err(e) => error_response(e),
    }
}

/// Extract session variables from HTTP headers.
///
/// All headers are lowercased and included as session variables.
fn session_from_headers(headers: &HeaderMap) -> Session {
    let mut vars = std::collections::HashMap::new();
    for (name, value) in headers.iter() {
        if let Ok(v) = value.to_str() {
            vars.insert(name.as_str().to_string(), v.to_string());
        }
    }
    Session::from_map(vars)
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": format!("unauthorized: {message}") })),
    )
        .into_response()
}

fn error_response(e: OrderError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    // Server-side failures reach the client as a fixed message; the
    // diagnostic chain lands in the log only.
    if status.is_server_error() {
        error!(
            error = %e,
            source = ?std::error::Error::source(&e),
            "request failed"
        );
    }
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}
