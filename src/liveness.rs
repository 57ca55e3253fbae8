//! Passive responder so an external uptime monitor keeps the process alive.

use axum::{Router, routing::get};

pub fn router() -> Router {
    Router::new().route("/", get(|| async { "Webhook is active" }))
}
