/// Admin dashboard endpoints. Every handler takes an `AdminUser`, so
/// anonymous callers get 401 and students 403 before any work is done.
use actix_web::{web, HttpResponse};

use super::{done, ok, AdminUser};
use crate::db::models::{StatusQuery, UpdateReportRequest, UpdateRoleRequest};
use crate::db::DbPool;
use crate::error::Result;
use crate::services::{AdminService, ContactService, ReportService, RequestService};

/// GET /admin/stats
pub async fn stats(pool: web::Data<DbPool>, _admin: AdminUser) -> Result<HttpResponse> {
    Ok(ok(AdminService::stats(&pool).await?))
}

/// GET /admin/users
pub async fn list_users(pool: web::Data<DbPool>, _admin: AdminUser) -> Result<HttpResponse> {
    Ok(ok(AdminService::list_users(&pool).await?))
}

/// DELETE /admin/users/{id}
pub async fn delete_user(
    pool: web::Data<DbPool>,
    AdminUser(admin): AdminUser,
    user_id: web::Path<i64>,
) -> Result<HttpResponse> {
    AdminService::delete_user(&pool, &admin, *user_id).await?;
    Ok(done())
}

/// PUT /admin/users/{id}/role
pub async fn set_role(
    pool: web::Data<DbPool>,
    AdminUser(admin): AdminUser,
    user_id: web::Path<i64>,
    req: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse> {
    Ok(ok(AdminService::set_role(&pool, &admin, *user_id, &req.role).await?))
}

/// GET /admin/requests?status=
pub async fn list_requests(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse> {
    Ok(ok(RequestService::list_all(&pool, query.status.as_deref()).await?))
}

/// DELETE /admin/requests/{id}
pub async fn delete_request(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    request_id: web::Path<i64>,
) -> Result<HttpResponse> {
    RequestService::delete(&pool, *request_id).await?;
    Ok(done())
}

/// GET /admin/reports?status=
pub async fn list_reports(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse> {
    Ok(ok(ReportService::list(&pool, query.status.as_deref()).await?))
}

/// PUT /admin/reports/{id}
pub async fn update_report(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    report_id: web::Path<i64>,
    req: web::Json<UpdateReportRequest>,
) -> Result<HttpResponse> {
    Ok(ok(ReportService::update(&pool, *report_id, &req).await?))
}

/// DELETE /admin/reports/{id}
pub async fn delete_report(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    report_id: web::Path<i64>,
) -> Result<HttpResponse> {
    ReportService::delete(&pool, *report_id).await?;
    Ok(done())
}

/// GET /admin/contacts
pub async fn list_contacts(pool: web::Data<DbPool>, _admin: AdminUser) -> Result<HttpResponse> {
    Ok(ok(ContactService::list(&pool).await?))
}

/// DELETE /admin/contacts/{id}
pub async fn delete_contact(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    contact_id: web::Path<i64>,
) -> Result<HttpResponse> {
    ContactService::delete(&pool, *contact_id).await?;
    Ok(done())
}
