/// Skill catalogue storage. Names are unique ignoring case.
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

use super::models::Skill;
use super::{now, DbPool};

pub(crate) fn skill_from_row(row: &Row) -> SqliteResult<Skill> {
    Ok(Skill {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Look a skill up by name ignoring case, inserting it when absent.
pub(crate) fn get_or_create_skill(conn: &Connection, name: &str) -> SqliteResult<Skill> {
    let existing = conn
        .query_row(
            "SELECT id, name, category, created_at FROM skills WHERE name = ?1 COLLATE NOCASE",
            params![name],
            skill_from_row,
        )
        .optional()?;
    if let Some(skill) = existing {
        return Ok(skill);
    }

    let created_at = now();
    conn.execute(
        "INSERT INTO skills (name, category, created_at) VALUES (?1, NULL, ?2)",
        params![name, &created_at],
    )?;
    Ok(Skill {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        category: None,
        created_at,
    })
}

/// Outcome of deleting a skill
#[derive(Debug, PartialEq)]
pub enum SkillDeletion {
    Deleted,
    NotFound,
    /// Referenced by this many accepted swap requests
    InUse(i64),
}

pub struct SkillStore;

impl SkillStore {
    pub async fn list(pool: &DbPool, category: Option<&str>) -> SqliteResult<Vec<Skill>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, category, created_at FROM skills
             WHERE ?1 IS NULL OR category = ?1 COLLATE NOCASE
             ORDER BY name COLLATE NOCASE",
        )?;
        let skills = stmt
            .query_map(params![category], skill_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(skills)
    }

    pub async fn get(pool: &DbPool, skill_id: i64) -> SqliteResult<Option<Skill>> {
        let conn = pool.lock().await;
        conn.query_row(
            "SELECT id, name, category, created_at FROM skills WHERE id = ?1",
            params![skill_id],
            skill_from_row,
        )
        .optional()
    }

    pub async fn create(pool: &DbPool, name: &str, category: Option<&str>) -> SqliteResult<Skill> {
        let conn = pool.lock().await;
        let created_at = now();
        conn.execute(
            "INSERT INTO skills (name, category, created_at) VALUES (?1, ?2, ?3)",
            params![name, category, &created_at],
        )?;
        Ok(Skill {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            category: category.map(str::to_string),
            created_at,
        })
    }

    pub async fn update(
        pool: &DbPool,
        skill_id: i64,
        name: &str,
        category: Option<&str>,
    ) -> SqliteResult<Option<Skill>> {
        let conn = pool.lock().await;
        let affected = conn.execute(
            "UPDATE skills SET name = ?1, category = ?2 WHERE id = ?3",
            params![name, category, skill_id],
        )?;
        if affected == 0 {
            return Ok(None);
        }
        conn.query_row(
            "SELECT id, name, category, created_at FROM skills WHERE id = ?1",
            params![skill_id],
            skill_from_row,
        )
        .optional()
    }

    /// Delete a skill unless an accepted swap request still references it.
    ///
    /// Offered/wanted rows and all other requests naming the skill are removed
    /// with it.
    pub async fn delete(pool: &DbPool, skill_id: i64) -> SqliteResult<SkillDeletion> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM skills WHERE id = ?1)",
            params![skill_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Ok(SkillDeletion::NotFound);
        }

        let accepted: i64 = tx.query_row(
            "SELECT COUNT(*) FROM requests
             WHERE status = 'ACCEPTED' AND (requested_skill_id = ?1 OR offered_skill_id = ?1)",
            params![skill_id],
            |row| row.get(0),
        )?;
        if accepted > 0 {
            return Ok(SkillDeletion::InUse(accepted));
        }

        tx.execute("DELETE FROM skills WHERE id = ?1", params![skill_id])?;
        tx.commit()?;
        Ok(SkillDeletion::Deleted)
    }
}
