//! Endpoint path table, matching the backend's OpenAPI surface.

pub fn create_order() -> &'static str {
    "/orders"
}

pub fn order_detail(order_id: i64) -> String {
    format!("/orders/{order_id}")
}

pub fn confirm(order_id: i64) -> String {
    format!("/orders/{order_id}/confirm")
}

pub fn prepare(order_id: i64) -> String {
    format!("/orders/{order_id}/prepare")
}

pub fn ready(order_id: i64) -> String {
    format!("/orders/{order_id}/ready")
}

pub fn verify(order_id: i64) -> String {
    format!("/orders/{order_id}/verify")
}

pub fn complete(order_id: i64) -> String {
    format!("/orders/{order_id}/complete")
}

pub fn cancel(order_id: i64) -> String {
    format!("/orders/{order_id}/cancel")
}

pub fn user_orders() -> &'static str {
    "/users/orders"
}

pub fn store_orders() -> &'static str {
    "/stores/orders"
}

pub fn session_refresh() -> &'static str {
    "/users/refresh"
}

pub fn order_watch(order_id: i64) -> String {
    format!("/orders/{order_id}/watch")
}

pub fn store_watch() -> &'static str {
    "/stores/orders/watch"
}
