/// Swap request storage and status transitions.
///
/// Transitions are conditional updates (`WHERE status = <expected>`) so a
/// request can only move once from any given status, however many callers race.
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::str::FromStr;

use super::models::{RequestDetail, RequestStatus, SwapRequest};
use super::{now, DbPool};

const DETAIL_SELECT: &str = "SELECT r.id, r.sender_id, r.receiver_id, r.requested_skill_id, r.offered_skill_id,
            r.message, r.status, r.created_at, r.updated_at,
            us.name, ur.name, kr.name, ko.name
     FROM requests r
     JOIN students ss ON ss.id = r.sender_id JOIN users us ON us.id = ss.user_id
     JOIN students sr ON sr.id = r.receiver_id JOIN users ur ON ur.id = sr.user_id
     JOIN skills kr ON kr.id = r.requested_skill_id
     JOIN skills ko ON ko.id = r.offered_skill_id";

fn request_from_row(row: &Row) -> SqliteResult<SwapRequest> {
    Ok(SwapRequest {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        requested_skill_id: row.get(3)?,
        offered_skill_id: row.get(4)?,
        message: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn detail_from_row(row: &Row) -> SqliteResult<RequestDetail> {
    Ok(RequestDetail {
        request: request_from_row(row)?,
        sender_name: row.get(9)?,
        receiver_name: row.get(10)?,
        requested_skill_name: row.get(11)?,
        offered_skill_name: row.get(12)?,
    })
}

/// Which of a student's requests to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mailbox {
    Incoming,
    Outgoing,
    #[default]
    All,
}

impl FromStr for Mailbox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "incoming" => Ok(Mailbox::Incoming),
            "outgoing" => Ok(Mailbox::Outgoing),
            "all" => Ok(Mailbox::All),
            other => Err(format!("'{}' is not one of incoming, outgoing, all", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSwapRequest<'a> {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub requested_skill_id: i64,
    pub offered_skill_id: i64,
    pub message: Option<&'a str>,
}

/// Outcome of inserting a swap request
#[derive(Debug, PartialEq)]
pub enum RequestInsert {
    Created(SwapRequest),
    /// An identical request is already pending or accepted
    Duplicate,
}

pub struct RequestStore;

impl RequestStore {
    pub async fn create(pool: &DbPool, new: &NewSwapRequest<'_>) -> SqliteResult<RequestInsert> {
        let conn = pool.lock().await;

        let duplicate: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM requests
               WHERE sender_id = ?1 AND receiver_id = ?2
                 AND requested_skill_id = ?3 AND offered_skill_id = ?4
                 AND status IN ('PENDING', 'ACCEPTED'))",
            params![
                new.sender_id,
                new.receiver_id,
                new.requested_skill_id,
                new.offered_skill_id
            ],
            |row| row.get(0),
        )?;
        if duplicate {
            return Ok(RequestInsert::Duplicate);
        }

        let created_at = now();
        conn.execute(
            "INSERT INTO requests (sender_id, receiver_id, requested_skill_id, offered_skill_id, message, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                new.sender_id,
                new.receiver_id,
                new.requested_skill_id,
                new.offered_skill_id,
                new.message,
                RequestStatus::Pending,
                &created_at,
            ],
        )?;

        Ok(RequestInsert::Created(SwapRequest {
            id: conn.last_insert_rowid(),
            sender_id: new.sender_id,
            receiver_id: new.receiver_id,
            requested_skill_id: new.requested_skill_id,
            offered_skill_id: new.offered_skill_id,
            message: new.message.map(str::to_string),
            status: RequestStatus::Pending,
            created_at: created_at.clone(),
            updated_at: created_at,
        }))
    }

    pub async fn get(pool: &DbPool, request_id: i64) -> SqliteResult<Option<SwapRequest>> {
        let conn = pool.lock().await;
        select_request(&conn, request_id).optional()
    }

    pub async fn detail(pool: &DbPool, request_id: i64) -> SqliteResult<Option<RequestDetail>> {
        let conn = pool.lock().await;
        let sql = format!("{} WHERE r.id = ?1", DETAIL_SELECT);
        conn.query_row(&sql, params![request_id], detail_from_row)
            .optional()
    }

    /// A student's requests, newest first
    pub async fn list_for_student(
        pool: &DbPool,
        student_id: i64,
        mailbox: Mailbox,
        status: Option<RequestStatus>,
    ) -> SqliteResult<Vec<RequestDetail>> {
        let conn = pool.lock().await;
        let participant = match mailbox {
            Mailbox::Incoming => "r.receiver_id = ?1",
            Mailbox::Outgoing => "r.sender_id = ?1",
            Mailbox::All => "(r.sender_id = ?1 OR r.receiver_id = ?1)",
        };
        let sql = format!(
            "{} WHERE {} AND (?2 IS NULL OR r.status = ?2) ORDER BY r.created_at DESC, r.id DESC",
            DETAIL_SELECT, participant
        );
        let mut stmt = conn.prepare(&sql)?;
        let details = stmt
            .query_map(params![student_id, status], detail_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(details)
    }

    /// Every request, newest first
    pub async fn list_all(
        pool: &DbPool,
        status: Option<RequestStatus>,
    ) -> SqliteResult<Vec<RequestDetail>> {
        let conn = pool.lock().await;
        let sql = format!(
            "{} WHERE (?1 IS NULL OR r.status = ?1) ORDER BY r.created_at DESC, r.id DESC",
            DETAIL_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let details = stmt
            .query_map(params![status], detail_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(details)
    }

    /// Move a request from `from` to `to`. Returns `None` when the request
    /// is no longer in `from` (or does not exist).
    pub async fn transition(
        pool: &DbPool,
        request_id: i64,
        from: RequestStatus,
        to: RequestStatus,
    ) -> SqliteResult<Option<SwapRequest>> {
        let conn = pool.lock().await;
        let affected = conn.execute(
            "UPDATE requests SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
            params![to, now(), request_id, from],
        )?;
        if affected == 0 {
            return Ok(None);
        }
        select_request(&conn, request_id).map(Some)
    }

    /// Mark an accepted request completed and credit both participants.
    ///
    /// The status change and both counter increments commit together; a
    /// request that is not ACCEPTED is left untouched and `None` is returned.
    pub async fn complete(pool: &DbPool, request_id: i64) -> SqliteResult<Option<SwapRequest>> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let affected = tx.execute(
            "UPDATE requests SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
            params![
                RequestStatus::Completed,
                now(),
                request_id,
                RequestStatus::Accepted
            ],
        )?;
        if affected == 0 {
            return Ok(None);
        }

        let request = select_request(&tx, request_id)?;
        tx.execute(
            "UPDATE students SET skills_completed = skills_completed + 1 WHERE id IN (?1, ?2)",
            params![request.sender_id, request.receiver_id],
        )?;
        tx.commit()?;

        Ok(Some(request))
    }

    /// Delete a request only while it is still pending
    pub async fn delete_pending(pool: &DbPool, request_id: i64) -> SqliteResult<bool> {
        let conn = pool.lock().await;
        let affected = conn.execute(
            "DELETE FROM requests WHERE id = ?1 AND status = ?2",
            params![request_id, RequestStatus::Pending],
        )?;
        Ok(affected > 0)
    }

    pub async fn delete(pool: &DbPool, request_id: i64) -> SqliteResult<bool> {
        let conn = pool.lock().await;
        let affected = conn.execute("DELETE FROM requests WHERE id = ?1", params![request_id])?;
        Ok(affected > 0)
    }
}

fn select_request(conn: &Connection, request_id: i64) -> SqliteResult<SwapRequest> {
    conn.query_row(
        "SELECT id, sender_id, receiver_id, requested_skill_id, offered_skill_id,
                message, status, created_at, updated_at
         FROM requests WHERE id = ?1",
        params![request_id],
        request_from_row,
    )
}
