use actix_web::{web, HttpResponse};

use super::{created, done, ok, AuthUser};
use crate::db::models::AddPhoneRequest;
use crate::db::DbPool;
use crate::error::Result;
use crate::services::PhoneService;

/// GET /users/me/phones
pub async fn list_phones(pool: web::Data<DbPool>, auth: AuthUser) -> Result<HttpResponse> {
    Ok(ok(PhoneService::list(&pool, &auth.user).await?))
}

/// POST /users/me/phones
pub async fn add_phone(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    req: web::Json<AddPhoneRequest>,
) -> Result<HttpResponse> {
    Ok(created(PhoneService::add(&pool, &auth.user, &req.number).await?))
}

/// DELETE /users/me/phones/{id}
pub async fn remove_phone(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    phone_id: web::Path<i64>,
) -> Result<HttpResponse> {
    PhoneService::remove(&pool, &auth.user, *phone_id).await?;
    Ok(done())
}
