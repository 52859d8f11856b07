/// Swap request endpoints for students.
use actix_web::{web, HttpResponse};

use super::{created, done, ok, AuthUser};
use crate::db::models::{CreateSwapRequest, RequestListQuery, UpdateRequestStatus};
use crate::db::DbPool;
use crate::error::Result;
use crate::services::RequestService;

/// POST /requests
pub async fn create_request(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    req: web::Json<CreateSwapRequest>,
) -> Result<HttpResponse> {
    Ok(created(RequestService::create(&pool, &auth.user, &req).await?))
}

/// GET /requests?box=incoming|outgoing|all&status=
pub async fn list_requests(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    query: web::Query<RequestListQuery>,
) -> Result<HttpResponse> {
    Ok(ok(RequestService::list(&pool, &auth.user, &query).await?))
}

/// GET /requests/{id}
pub async fn get_request(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    request_id: web::Path<i64>,
) -> Result<HttpResponse> {
    Ok(ok(RequestService::get(&pool, &auth.user, *request_id).await?))
}

/// PUT /requests/{id}/status
pub async fn update_status(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    request_id: web::Path<i64>,
    req: web::Json<UpdateRequestStatus>,
) -> Result<HttpResponse> {
    let detail = RequestService::update_status(&pool, &auth.user, *request_id, &req.status).await?;
    Ok(ok(detail))
}

/// Cancel a pending request (sender only)
/// DELETE /requests/{id}
pub async fn cancel_request(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    request_id: web::Path<i64>,
) -> Result<HttpResponse> {
    RequestService::cancel(&pool, &auth.user, *request_id).await?;
    Ok(done())
}
