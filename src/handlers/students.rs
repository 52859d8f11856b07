use actix_web::{web, HttpResponse};

use super::{ok, AuthUser};
use crate::db::models::{BrowseQuery, UpdateProfileRequest, UpdateSkillsRequest};
use crate::db::DbPool;
use crate::error::Result;
use crate::services::StudentService;

/// GET /students
pub async fn browse(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    query: web::Query<BrowseQuery>,
) -> Result<HttpResponse> {
    Ok(ok(StudentService::browse(&pool, &auth.user, &query).await?))
}

/// GET /students/{id}
pub async fn get_student(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    student_id: web::Path<i64>,
) -> Result<HttpResponse> {
    Ok(ok(StudentService::profile(&pool, &auth.user, *student_id).await?))
}

/// GET /students/me
pub async fn my_profile(pool: web::Data<DbPool>, auth: AuthUser) -> Result<HttpResponse> {
    Ok(ok(StudentService::my_profile(&pool, &auth.user).await?))
}

/// PUT /students/me
pub async fn update_profile(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    Ok(ok(StudentService::update_profile(&pool, &auth.user, &req).await?))
}

/// PUT /students/me/skills
pub async fn update_skills(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    req: web::Json<UpdateSkillsRequest>,
) -> Result<HttpResponse> {
    Ok(ok(StudentService::update_skills(&pool, &auth.user, &req).await?))
}
