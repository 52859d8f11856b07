/// One-way favorites between students.
use super::students::{require_student, visible_student};
use crate::db::models::{Favorite, StudentSummary, User};
use crate::db::{DbPool, FavoriteStore, StudentStore};
use crate::error::{AppError, FieldErrors, Result};

pub struct FavoriteService;

impl FavoriteService {
    /// The caller's favorites, most recent first. Students who have since
    /// gone private are left out.
    pub async fn list(pool: &DbPool, caller: &User) -> Result<Vec<StudentSummary>> {
        let student = require_student(pool, caller).await?;
        let ids = FavoriteStore::list_ids(pool, student.id).await?;
        Ok(StudentStore::summaries(pool, &ids).await?)
    }

    pub async fn add(pool: &DbPool, caller: &User, favorite_student_id: i64) -> Result<Favorite> {
        let student = require_student(pool, caller).await?;
        if favorite_student_id == student.id {
            return Err(FieldErrors::single(
                "student_id",
                "you cannot favorite yourself",
            ));
        }
        visible_student(pool, caller, favorite_student_id, "Student").await?;

        let favorite = FavoriteStore::add(pool, student.id, favorite_student_id)
            .await
            .map_err(|err| match AppError::from(err) {
                AppError::Conflict(_) => AppError::Conflict("Student is already a favorite".to_string()),
                other => other,
            })?;
        log::info!("Student {} favorited student {}", student.id, favorite_student_id);
        Ok(favorite)
    }

    pub async fn remove(pool: &DbPool, caller: &User, favorite_student_id: i64) -> Result<()> {
        let student = require_student(pool, caller).await?;
        if !FavoriteStore::remove(pool, student.id, favorite_student_id).await? {
            return Err(AppError::not_found("Favorite"));
        }
        Ok(())
    }
}
