/// Messages submitted through the public contact form.
use rusqlite::{params, Result as SqliteResult};

use super::models::Contact;
use super::{now, DbPool};

pub struct ContactStore;

impl ContactStore {
    pub async fn create(
        pool: &DbPool,
        name: &str,
        email: &str,
        message: &str,
    ) -> SqliteResult<Contact> {
        let conn = pool.lock().await;
        let created_at = now();
        conn.execute(
            "INSERT INTO contacts (name, email, message, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, email, message, &created_at],
        )?;
        Ok(Contact {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            created_at,
        })
    }

    pub async fn list(pool: &DbPool) -> SqliteResult<Vec<Contact>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, email, message, created_at FROM contacts ORDER BY created_at DESC, id DESC",
        )?;
        let contacts = stmt
            .query_map([], |row| {
                Ok(Contact {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    message: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    pub async fn delete(pool: &DbPool, contact_id: i64) -> SqliteResult<bool> {
        let conn = pool.lock().await;
        let affected = conn.execute("DELETE FROM contacts WHERE id = ?1", params![contact_id])?;
        Ok(affected > 0)
    }
}
