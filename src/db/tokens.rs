/// Session token storage: short-lived access sessions and rotating refresh tokens.
///
/// Only SHA-256 digests of tokens are stored. Expiry columns hold Unix seconds.
use rusqlite::{params, OptionalExtension, Result as SqliteResult};

use super::models::{RefreshToken, Session};
use super::{now, DbPool};

/// Outcome of presenting a refresh token for rotation
#[derive(Debug, PartialEq)]
pub enum RefreshRotation {
    /// The presented token was revoked and `token` issued in its place
    Rotated { user_id: i64, token: RefreshToken },
    Unknown,
    Expired { user_id: i64 },
    /// The presented token had already been rotated or revoked; every token
    /// of the user has now been revoked
    Reused { user_id: i64 },
}

pub struct TokenStore;

impl TokenStore {
    pub async fn create_session(
        pool: &DbPool,
        user_id: i64,
        token_hash: &str,
        expires_at: i64,
    ) -> SqliteResult<Session> {
        let conn = pool.lock().await;
        let created_at = now();
        conn.execute(
            "INSERT INTO sessions (user_id, token_hash, expires_at, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, token_hash, expires_at, &created_at],
        )?;
        Ok(Session {
            id: conn.last_insert_rowid(),
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            created_at,
        })
    }

    /// Owner of a live session, if the digest matches one that has not expired
    pub async fn session_user(
        pool: &DbPool,
        token_hash: &str,
        now_ts: i64,
    ) -> SqliteResult<Option<i64>> {
        let conn = pool.lock().await;
        conn.query_row(
            "SELECT user_id FROM sessions WHERE token_hash = ?1 AND expires_at > ?2",
            params![token_hash, now_ts],
            |row| row.get(0),
        )
        .optional()
    }

    pub async fn delete_session(pool: &DbPool, token_hash: &str) -> SqliteResult<bool> {
        let conn = pool.lock().await;
        let affected = conn.execute(
            "DELETE FROM sessions WHERE token_hash = ?1",
            params![token_hash],
        )?;
        Ok(affected > 0)
    }

    pub async fn create_refresh_token(
        pool: &DbPool,
        user_id: i64,
        token_hash: &str,
        expires_at: i64,
    ) -> SqliteResult<RefreshToken> {
        let conn = pool.lock().await;
        insert_refresh_token(&conn, user_id, token_hash, expires_at)
    }

    /// Exchange a refresh token for a new one.
    pub async fn rotate_refresh_token(
        pool: &DbPool,
        presented_hash: &str,
        replacement_hash: &str,
        replacement_expires_at: i64,
        now_ts: i64,
    ) -> SqliteResult<RefreshRotation> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let found: Option<(i64, i64, i64, bool)> = tx
            .query_row(
                "SELECT id, user_id, expires_at, revoked FROM refresh_tokens WHERE token_hash = ?1",
                params![presented_hash],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((token_id, user_id, expires_at, revoked)) = found else {
            return Ok(RefreshRotation::Unknown);
        };

        if revoked {
            tx.execute(
                "UPDATE refresh_tokens SET revoked = 1 WHERE user_id = ?1",
                params![user_id],
            )?;
            tx.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])?;
            tx.commit()?;
            return Ok(RefreshRotation::Reused { user_id });
        }

        tx.execute(
            "UPDATE refresh_tokens SET revoked = 1 WHERE id = ?1",
            params![token_id],
        )?;

        if expires_at <= now_ts {
            tx.commit()?;
            return Ok(RefreshRotation::Expired { user_id });
        }

        let token = insert_refresh_token(&tx, user_id, replacement_hash, replacement_expires_at)?;
        tx.commit()?;
        Ok(RefreshRotation::Rotated { user_id, token })
    }

    pub async fn revoke_refresh_token(pool: &DbPool, token_hash: &str) -> SqliteResult<bool> {
        let conn = pool.lock().await;
        let affected = conn.execute(
            "UPDATE refresh_tokens SET revoked = 1 WHERE token_hash = ?1 AND revoked = 0",
            params![token_hash],
        )?;
        Ok(affected > 0)
    }

    /// Drop expired sessions and refresh tokens; returns how many rows went.
    pub async fn purge_expired(pool: &DbPool, now_ts: i64) -> SqliteResult<usize> {
        let conn = pool.lock().await;
        let sessions = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now_ts])?;
        let refresh = conn.execute(
            "DELETE FROM refresh_tokens WHERE expires_at <= ?1",
            params![now_ts],
        )?;
        Ok(sessions + refresh)
    }
}

fn insert_refresh_token(
    conn: &rusqlite::Connection,
    user_id: i64,
    token_hash: &str,
    expires_at: i64,
) -> SqliteResult<RefreshToken> {
    let created_at = now();
    conn.execute(
        "INSERT INTO refresh_tokens (user_id, token_hash, expires_at, revoked, created_at)
         VALUES (?1, ?2, ?3, 0, ?4)",
        params![user_id, token_hash, expires_at, &created_at],
    )?;
    Ok(RefreshToken {
        id: conn.last_insert_rowid(),
        user_id,
        token_hash: token_hash.to_string(),
        expires_at,
        revoked: false,
        created_at,
    })
}
