/// Abuse reports filed by students and moderated by admins.
use super::students::require_student;
use super::validation;
use crate::db::models::{CreateReportRequest, Report, ReportStatus, UpdateReportRequest, User};
use crate::db::{DbPool, ReportStore, StudentStore};
use crate::error::{AppError, FieldErrors, Result};

const REASON_MIN: usize = 10;
const REASON_MAX: usize = 500;
const NOTES_MAX: usize = 1000;

pub struct ReportService;

impl ReportService {
    pub async fn create(pool: &DbPool, caller: &User, req: &CreateReportRequest) -> Result<Report> {
        let reporter = require_student(pool, caller).await?;

        let mut errors = FieldErrors::new();
        let reason = validation::required_text(&mut errors, "reason", &req.reason, REASON_MIN, REASON_MAX);
        if req.reported_id == reporter.id {
            errors.add("reported_id", "you cannot report yourself");
        }
        errors.into_result()?;

        if StudentStore::get(pool, req.reported_id).await?.is_none() {
            return Err(AppError::not_found("Student"));
        }

        let report = ReportStore::create(pool, reporter.id, req.reported_id, &reason).await?;
        log::info!(
            "Student {} reported student {} (report {})",
            reporter.id,
            req.reported_id,
            report.id
        );
        Ok(report)
    }

    pub async fn list(pool: &DbPool, status: Option<&str>) -> Result<Vec<Report>> {
        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(status) => Some(
                status
                    .parse::<ReportStatus>()
                    .map_err(|message| FieldErrors::single("status", message))?,
            ),
            None => None,
        };
        Ok(ReportStore::list(pool, status).await?)
    }

    pub async fn update(pool: &DbPool, report_id: i64, req: &UpdateReportRequest) -> Result<Report> {
        let mut errors = FieldErrors::new();
        let status = validation::parse_enum::<ReportStatus>(&mut errors, "status", &req.status);
        let notes = validation::optional_text(&mut errors, "admin_notes", req.admin_notes.as_deref(), NOTES_MAX);
        errors.into_result()?;
        let Some(status) = status else {
            return Err(FieldErrors::single("status", "is required"));
        };

        let report = ReportStore::update(pool, report_id, status, notes.as_deref())
            .await?
            .ok_or_else(|| AppError::not_found("Report"))?;
        log::info!("Report {} set to {}", report.id, report.status);
        Ok(report)
    }

    pub async fn delete(pool: &DbPool, report_id: i64) -> Result<()> {
        if !ReportStore::delete(pool, report_id).await? {
            return Err(AppError::not_found("Report"));
        }
        log::info!("Deleted report {}", report_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::services::require_student;
    use crate::services::testing::register;

    #[tokio::test]
    async fn test_report_lifecycle() {
        let pool = create_test_pool();
        let alice = register(&pool, "alice@example.com", "Alice").await;
        let bob = register(&pool, "bob@example.com", "Bob").await;
        let alice_id = require_student(&pool, &alice).await.expect("Student missing").id;
        let bob_id = require_student(&pool, &bob).await.expect("Student missing").id;

        let self_report = CreateReportRequest {
            reported_id: alice_id,
            reason: "Reporting myself for testing".to_string(),
        };
        assert!(matches!(
            ReportService::create(&pool, &alice, &self_report).await,
            Err(AppError::Validation(_))
        ));

        let short = CreateReportRequest {
            reported_id: bob_id,
            reason: "rude".to_string(),
        };
        assert!(matches!(
            ReportService::create(&pool, &alice, &short).await,
            Err(AppError::Validation(_))
        ));

        let report = ReportService::create(
            &pool,
            &alice,
            &CreateReportRequest {
                reported_id: bob_id,
                reason: "Did not show up to three sessions".to_string(),
            },
        )
        .await
        .expect("Report failed");
        assert_eq!(report.status, ReportStatus::Open);

        let resolved = ReportService::update(
            &pool,
            report.id,
            &UpdateReportRequest {
                status: "resolved".to_string(),
                admin_notes: Some("Warned the user".to_string()),
            },
        )
        .await
        .expect("Update failed");
        assert_eq!(resolved.status, ReportStatus::Resolved);
        assert!(resolved.resolved_at.is_some());

        assert!(ReportService::list(&pool, Some("OPEN")).await.expect("List failed").is_empty());
        assert!(matches!(
            ReportService::list(&pool, Some("closed")).await,
            Err(AppError::Validation(_))
        ));

        ReportService::delete(&pool, report.id).await.expect("Delete failed");
        assert!(matches!(
            ReportService::delete(&pool, report.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_report_unknown_student() {
        let pool = create_test_pool();
        let alice = register(&pool, "alice@example.com", "Alice").await;
        let result = ReportService::create(
            &pool,
            &alice,
            &CreateReportRequest {
                reported_id: 999,
                reason: "Spamming everyone with requests".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
