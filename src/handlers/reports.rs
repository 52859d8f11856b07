use actix_web::{web, HttpResponse};

use super::{created, AuthUser};
use crate::db::models::CreateReportRequest;
use crate::db::DbPool;
use crate::error::Result;
use crate::services::ReportService;

/// File a report against another student
/// POST /reports
pub async fn create_report(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    req: web::Json<CreateReportRequest>,
) -> Result<HttpResponse> {
    Ok(created(ReportService::create(&pool, &auth.user, &req).await?))
}
