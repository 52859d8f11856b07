use actix_web::{web, HttpResponse};

use super::{created, done, ok, AdminUser, AuthUser};
use crate::db::models::{CategoryQuery, SkillPayload};
use crate::db::DbPool;
use crate::error::Result;
use crate::services::SkillService;

/// GET /skills
pub async fn list_skills(
    pool: web::Data<DbPool>,
    query: web::Query<CategoryQuery>,
) -> Result<HttpResponse> {
    Ok(ok(SkillService::list(&pool, query.category.as_deref()).await?))
}

/// POST /skills
pub async fn create_skill(
    pool: web::Data<DbPool>,
    _auth: AuthUser,
    req: web::Json<SkillPayload>,
) -> Result<HttpResponse> {
    Ok(created(SkillService::create(&pool, &req).await?))
}

/// PUT /skills/{id}
pub async fn update_skill(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    skill_id: web::Path<i64>,
    req: web::Json<SkillPayload>,
) -> Result<HttpResponse> {
    Ok(ok(SkillService::update(&pool, *skill_id, &req).await?))
}

/// DELETE /skills/{id}
pub async fn delete_skill(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    skill_id: web::Path<i64>,
) -> Result<HttpResponse> {
    SkillService::delete(&pool, *skill_id).await?;
    Ok(done())
}
