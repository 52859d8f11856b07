/// One-directional bookmarks between students.
use rusqlite::{params, Result as SqliteResult};

use super::models::Favorite;
use super::{now, DbPool};

pub struct FavoriteStore;

impl FavoriteStore {
    pub async fn add(
        pool: &DbPool,
        student_id: i64,
        favorite_student_id: i64,
    ) -> SqliteResult<Favorite> {
        let conn = pool.lock().await;
        let created_at = now();
        conn.execute(
            "INSERT INTO favorites (student_id, favorite_student_id, created_at) VALUES (?1, ?2, ?3)",
            params![student_id, favorite_student_id, &created_at],
        )?;
        Ok(Favorite {
            id: conn.last_insert_rowid(),
            student_id,
            favorite_student_id,
            created_at,
        })
    }

    /// Favorite student IDs, most recently added first
    pub async fn list_ids(pool: &DbPool, student_id: i64) -> SqliteResult<Vec<i64>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT favorite_student_id FROM favorites WHERE student_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let ids = stmt
            .query_map(params![student_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub async fn remove(
        pool: &DbPool,
        student_id: i64,
        favorite_student_id: i64,
    ) -> SqliteResult<bool> {
        let conn = pool.lock().await;
        let affected = conn.execute(
            "DELETE FROM favorites WHERE student_id = ?1 AND favorite_student_id = ?2",
            params![student_id, favorite_student_id],
        )?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::models::ExperienceLevel;
    use crate::db::users::{NewAccount, UserStore};

    async fn students(pool: &DbPool, count: usize) -> Vec<i64> {
        let phones = vec!["5550001111".to_string()];
        let mut ids = Vec::new();
        for i in 0..count {
            let email = format!("student{}@example.com", i);
            let account = NewAccount {
                email: &email,
                name: "Student",
                password_hash: "hash",
                phone_numbers: &phones,
            };
            let (_, student) = UserStore::create_student(pool, &account, ExperienceLevel::Beginner, None)
                .await
                .expect("Failed to create student");
            ids.push(student.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let pool = create_test_pool();
        let ids = students(&pool, 3).await;

        FavoriteStore::add(&pool, ids[0], ids[1]).await.expect("Add failed");
        FavoriteStore::add(&pool, ids[0], ids[2]).await.expect("Add failed");

        let favorites = FavoriteStore::list_ids(&pool, ids[0]).await.expect("List failed");
        assert_eq!(favorites, vec![ids[2], ids[1]]);
        assert!(FavoriteStore::list_ids(&pool, ids[1]).await.expect("List failed").is_empty());

        assert!(FavoriteStore::remove(&pool, ids[0], ids[1]).await.expect("Remove failed"));
        assert!(!FavoriteStore::remove(&pool, ids[0], ids[1]).await.expect("Remove failed"));
    }

    #[tokio::test]
    async fn test_duplicate_and_self_favorite_rejected() {
        let pool = create_test_pool();
        let ids = students(&pool, 2).await;

        FavoriteStore::add(&pool, ids[0], ids[1]).await.expect("Add failed");
        let duplicate = FavoriteStore::add(&pool, ids[0], ids[1]).await;
        assert!(duplicate.unwrap_err().to_string().contains("UNIQUE"));

        assert!(FavoriteStore::add(&pool, ids[0], ids[0]).await.is_err());
    }
}
