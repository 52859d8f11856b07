/// HTTP handlers module
/// JSON REST endpoints. Every response uses the `{success, data | error}`
/// envelope; failures come from `AppError`'s `ResponseError` impl.

pub mod admin;
pub mod auth;
pub mod contacts;
pub mod favorites;
pub mod phones;
pub mod reports;
pub mod requests;
pub mod session;
pub mod skills;
pub mod students;

pub use session::{AdminUser, AuthUser, SESSION_COOKIE};

use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::json;

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::OK, data)
}

pub fn created<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::CREATED, data)
}

/// Success envelope with no payload, for deletes
pub fn done() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "data": null }))
}

fn respond<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "success": true, "data": data }))
}

/// Health check endpoint
/// GET /health
pub async fn health() -> HttpResponse {
    ok(json!({ "status": "ok" }))
}
