use actix_web::{web, HttpResponse};

use super::created;
use crate::db::models::CreateContactRequest;
use crate::db::DbPool;
use crate::error::Result;
use crate::services::ContactService;

/// Public contact form, no session needed
/// POST /contacts
pub async fn submit_contact(
    pool: web::Data<DbPool>,
    req: web::Json<CreateContactRequest>,
) -> Result<HttpResponse> {
    Ok(created(ContactService::submit(&pool, &req).await?))
}
