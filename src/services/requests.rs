/// Swap request creation, listing and the status machine.
///
/// ```text
/// PENDING --accept (receiver)--> ACCEPTED --complete (either)--> COMPLETED
/// PENDING --reject (receiver)--> REJECTED
/// ```
use super::students::{require_student, visible_student};
use super::validation;
use crate::db::models::{
    CreateSwapRequest, RequestDetail, RequestListQuery, RequestStatus, Role, SwapRequest, User,
};
use crate::db::requests::{Mailbox, NewSwapRequest, RequestInsert};
use crate::db::{DbPool, RequestStore, StudentStore};
use crate::error::{AppError, FieldErrors, Result};

const MESSAGE_MAX: usize = 500;

pub struct RequestService;

impl RequestService {
    pub async fn create(pool: &DbPool, caller: &User, req: &CreateSwapRequest) -> Result<RequestDetail> {
        let sender = require_student(pool, caller).await?;

        if req.receiver_id == sender.id {
            return Err(FieldErrors::single(
                "receiver_id",
                "you cannot send a swap request to yourself",
            ));
        }
        visible_student(pool, caller, req.receiver_id, "Receiver").await?;

        let mut errors = FieldErrors::new();
        if !StudentStore::offers_skill(pool, req.receiver_id, req.requested_skill_id).await? {
            errors.add("requested_skill_id", "the receiver does not offer this skill");
        }
        if !StudentStore::offers_skill(pool, sender.id, req.offered_skill_id).await? {
            errors.add("offered_skill_id", "you do not offer this skill");
        }
        let message = validation::optional_text(&mut errors, "message", req.message.as_deref(), MESSAGE_MAX);
        errors.into_result()?;

        let new = NewSwapRequest {
            sender_id: sender.id,
            receiver_id: req.receiver_id,
            requested_skill_id: req.requested_skill_id,
            offered_skill_id: req.offered_skill_id,
            message: message.as_deref(),
        };
        let created = match RequestStore::create(pool, &new).await? {
            RequestInsert::Created(request) => request,
            RequestInsert::Duplicate => {
                return Err(AppError::Conflict(
                    "An identical swap request is already open".to_string(),
                ))
            }
        };
        log::info!(
            "Student {} sent swap request {} to student {}",
            sender.id,
            created.id,
            created.receiver_id
        );

        detail(pool, created.id).await
    }

    pub async fn list(pool: &DbPool, caller: &User, query: &RequestListQuery) -> Result<Vec<RequestDetail>> {
        let student = require_student(pool, caller).await?;

        let mut errors = FieldErrors::new();
        let mailbox = match query.mailbox.as_deref() {
            Some(mailbox) => validation::parse_enum::<Mailbox>(&mut errors, "box", mailbox).unwrap_or_default(),
            None => Mailbox::All,
        };
        let status = parse_status(&mut errors, query.status.as_deref());
        errors.into_result()?;

        Ok(RequestStore::list_for_student(pool, student.id, mailbox, status).await?)
    }

    /// A single request, visible to its participants and to admins.
    pub async fn get(pool: &DbPool, caller: &User, request_id: i64) -> Result<RequestDetail> {
        let found = detail(pool, request_id).await?;
        if caller.role == Role::Admin {
            return Ok(found);
        }
        let student = require_student(pool, caller).await?;
        if !found.request.involves(student.id) {
            return Err(AppError::not_found("Request"));
        }
        Ok(found)
    }

    /// Move a request to `status`, enforcing who may make which transition.
    pub async fn update_status(
        pool: &DbPool,
        caller: &User,
        request_id: i64,
        status: &str,
    ) -> Result<RequestDetail> {
        let student = require_student(pool, caller).await?;

        let target: RequestStatus = status
            .parse()
            .map_err(|message: String| FieldErrors::single("status", message))?;

        let request = RequestStore::get(pool, request_id)
            .await?
            .filter(|r| r.involves(student.id))
            .ok_or_else(|| AppError::not_found("Request"))?;

        authorize_transition(&request, student.id, target)?;

        let moved = match target {
            RequestStatus::Completed => RequestStore::complete(pool, request_id).await?,
            _ => RequestStore::transition(pool, request_id, request.status, target).await?,
        };
        if moved.is_none() {
            return Err(illegal_transition(request.status, target));
        }

        log::info!(
            "Swap request {} moved {} -> {} by student {}",
            request_id,
            request.status,
            target,
            student.id
        );
        detail(pool, request_id).await
    }

    /// Withdraw a pending request. Only its sender may do this.
    pub async fn cancel(pool: &DbPool, caller: &User, request_id: i64) -> Result<()> {
        let student = require_student(pool, caller).await?;
        let request = RequestStore::get(pool, request_id)
            .await?
            .filter(|r| r.involves(student.id))
            .ok_or_else(|| AppError::not_found("Request"))?;

        if request.sender_id != student.id {
            return Err(AppError::Forbidden(
                "Only the sender can cancel a swap request".to_string(),
            ));
        }
        if !RequestStore::delete_pending(pool, request_id).await? {
            return Err(AppError::Conflict(
                "Only pending swap requests can be cancelled".to_string(),
            ));
        }
        log::info!("Student {} cancelled swap request {}", student.id, request_id);
        Ok(())
    }

    pub async fn list_all(pool: &DbPool, status: Option<&str>) -> Result<Vec<RequestDetail>> {
        let mut errors = FieldErrors::new();
        let status = parse_status(&mut errors, status);
        errors.into_result()?;
        Ok(RequestStore::list_all(pool, status).await?)
    }

    pub async fn delete(pool: &DbPool, request_id: i64) -> Result<()> {
        if !RequestStore::delete(pool, request_id).await? {
            return Err(AppError::not_found("Request"));
        }
        log::info!("Deleted swap request {}", request_id);
        Ok(())
    }
}

async fn detail(pool: &DbPool, request_id: i64) -> Result<RequestDetail> {
    RequestStore::detail(pool, request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Request"))
}

fn parse_status(errors: &mut FieldErrors, status: Option<&str>) -> Option<RequestStatus> {
    status
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| validation::parse_enum(errors, "status", s))
}

fn authorize_transition(request: &SwapRequest, student_id: i64, target: RequestStatus) -> Result<()> {
    match target {
        RequestStatus::Accepted | RequestStatus::Rejected if request.receiver_id != student_id => {
            log::warn!(
                "Student {} tried to answer swap request {} they did not receive",
                student_id,
                request.id
            );
            Err(AppError::Forbidden(
                "Only the receiver can accept or reject a swap request".to_string(),
            ))
        }
        _ if !request.status.can_transition_to(target) => {
            Err(illegal_transition(request.status, target))
        }
        _ => Ok(()),
    }
}

fn illegal_transition(from: RequestStatus, to: RequestStatus) -> AppError {
    AppError::Conflict(format!("Cannot move a swap request from {} to {}", from, to))
}
