use actix_web::{web, HttpResponse};

use super::{created, done, ok, AuthUser};
use crate::db::models::CreateFavoriteRequest;
use crate::db::DbPool;
use crate::error::Result;
use crate::services::FavoriteService;

/// GET /favorites
pub async fn list_favorites(pool: web::Data<DbPool>, auth: AuthUser) -> Result<HttpResponse> {
    Ok(ok(FavoriteService::list(&pool, &auth.user).await?))
}

/// POST /favorites
pub async fn add_favorite(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    req: web::Json<CreateFavoriteRequest>,
) -> Result<HttpResponse> {
    Ok(created(FavoriteService::add(&pool, &auth.user, req.student_id).await?))
}

/// DELETE /favorites/{student_id}
pub async fn remove_favorite(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    student_id: web::Path<i64>,
) -> Result<HttpResponse> {
    FavoriteService::remove(&pool, &auth.user, *student_id).await?;
    Ok(done())
}
