/// Moderation reports filed by one student against another.
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

use super::models::{Report, ReportStatus};
use super::{now, DbPool};

const REPORT_COLUMNS: &str =
    "id, reporter_id, reported_id, reason, status, admin_notes, created_at, resolved_at";

fn report_from_row(row: &Row) -> SqliteResult<Report> {
    Ok(Report {
        id: row.get(0)?,
        reporter_id: row.get(1)?,
        reported_id: row.get(2)?,
        reason: row.get(3)?,
        status: row.get(4)?,
        admin_notes: row.get(5)?,
        created_at: row.get(6)?,
        resolved_at: row.get(7)?,
    })
}

pub struct ReportStore;

impl ReportStore {
    pub async fn create(
        pool: &DbPool,
        reporter_id: i64,
        reported_id: i64,
        reason: &str,
    ) -> SqliteResult<Report> {
        let conn = pool.lock().await;
        conn.execute(
            "INSERT INTO reports (reporter_id, reported_id, reason, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![reporter_id, reported_id, reason, ReportStatus::Open, now()],
        )?;
        select_report(&conn, conn.last_insert_rowid())
    }

    pub async fn list(pool: &DbPool, status: Option<ReportStatus>) -> SqliteResult<Vec<Report>> {
        let conn = pool.lock().await;
        let sql = format!(
            "SELECT {} FROM reports WHERE (?1 IS NULL OR status = ?1) ORDER BY created_at DESC, id DESC",
            REPORT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let reports = stmt
            .query_map(params![status], report_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reports)
    }

    /// Set a report's status and notes. Closing it stamps `resolved_at`;
    /// reopening clears it.
    pub async fn update(
        pool: &DbPool,
        report_id: i64,
        status: ReportStatus,
        admin_notes: Option<&str>,
    ) -> SqliteResult<Option<Report>> {
        let conn = pool.lock().await;
        let resolved_at = match status {
            ReportStatus::Open => None,
            ReportStatus::Resolved | ReportStatus::Dismissed => Some(now()),
        };
        let affected = conn.execute(
            "UPDATE reports SET status = ?1, admin_notes = COALESCE(?2, admin_notes), resolved_at = ?3
             WHERE id = ?4",
            params![status, admin_notes, resolved_at, report_id],
        )?;
        if affected == 0 {
            return Ok(None);
        }
        select_report(&conn, report_id).optional()
    }

    pub async fn delete(pool: &DbPool, report_id: i64) -> SqliteResult<bool> {
        let conn = pool.lock().await;
        let affected = conn.execute("DELETE FROM reports WHERE id = ?1", params![report_id])?;
        Ok(affected > 0)
    }
}

fn select_report(conn: &Connection, report_id: i64) -> SqliteResult<Report> {
    let sql = format!("SELECT {} FROM reports WHERE id = ?1", REPORT_COLUMNS);
    conn.query_row(&sql, params![report_id], report_from_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::models::ExperienceLevel;
    use crate::db::users::{NewAccount, UserStore};

    async fn two_students(pool: &DbPool) -> (i64, i64) {
        let phones = vec!["5550001111".to_string()];
        let mut ids = Vec::new();
        for email in ["reporter@example.com", "reported@example.com"] {
            let account = NewAccount {
                email,
                name: "Someone",
                password_hash: "hash",
                phone_numbers: &phones,
            };
            let (_, student) = UserStore::create_student(pool, &account, ExperienceLevel::Beginner, None)
                .await
                .expect("Failed to create student");
            ids.push(student.id);
        }
        (ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_report_lifecycle() {
        let pool = create_test_pool();
        let (reporter, reported) = two_students(&pool).await;

        let report = ReportStore::create(&pool, reporter, reported, "Did not show up twice")
            .await
            .expect("Create failed");
        assert_eq!(report.status, ReportStatus::Open);
        assert!(report.resolved_at.is_none());

        let resolved = ReportStore::update(&pool, report.id, ReportStatus::Resolved, Some("Warned"))
            .await
            .expect("Update failed")
            .expect("Report missing");
        assert_eq!(resolved.admin_notes.as_deref(), Some("Warned"));
        assert!(resolved.resolved_at.is_some());

        // Reopening without notes keeps the previous notes
        let reopened = ReportStore::update(&pool, report.id, ReportStatus::Open, None)
            .await
            .expect("Update failed")
            .expect("Report missing");
        assert_eq!(reopened.admin_notes.as_deref(), Some("Warned"));
        assert!(reopened.resolved_at.is_none());

        let open = ReportStore::list(&pool, Some(ReportStatus::Open)).await.expect("List failed");
        assert_eq!(open.len(), 1);
        let dismissed = ReportStore::list(&pool, Some(ReportStatus::Dismissed))
            .await
            .expect("List failed");
        assert!(dismissed.is_empty());

        assert!(ReportStore::delete(&pool, report.id).await.expect("Delete failed"));
        assert!(ReportStore::list(&pool, None).await.expect("List failed").is_empty());
    }

    #[tokio::test]
    async fn test_self_report_rejected_by_schema() {
        let pool = create_test_pool();
        let (reporter, _) = two_students(&pool).await;
        let result = ReportStore::create(&pool, reporter, reporter, "Reporting myself").await;
        assert!(result.is_err());
    }
}
