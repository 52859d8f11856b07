/// User account storage: users, their role rows (students/admins) and phone numbers.
///
/// Account creation writes the user, its role row and its phone numbers in a
/// single transaction, so a failed phone insert never leaves a half-registered user.
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

use super::models::{Credentials, ExperienceLevel, PhoneNumber, Role, Student, User};
use super::{now, DbPool};

/// Maximum number of phone numbers a single user may hold
pub const MAX_PHONE_NUMBERS: i64 = 3;

const USER_COLUMNS: &str =
    "id, email, name, role, bio, location, avatar_url, created_at, updated_at";

pub(crate) fn user_from_row(row: &Row) -> SqliteResult<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        bio: row.get(4)?,
        location: row.get(5)?,
        avatar_url: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn phone_from_row(row: &Row) -> SqliteResult<PhoneNumber> {
    Ok(PhoneNumber {
        id: row.get(0)?,
        user_id: row.get(1)?,
        number: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Fields required to create an account
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub phone_numbers: &'a [String],
}

/// Outcome of adding a phone number
#[derive(Debug, PartialEq)]
pub enum PhoneInsert {
    Added(PhoneNumber),
    LimitReached,
}

/// Outcome of removing a phone number
#[derive(Debug, PartialEq)]
pub enum PhoneRemoval {
    Removed,
    NotFound,
    LastNumber,
}

pub struct UserStore;

impl UserStore {
    /// Create a student account: user row, student row and phone numbers.
    pub async fn create_student(
        pool: &DbPool,
        account: &NewAccount<'_>,
        experience_level: ExperienceLevel,
        availability: Option<&str>,
    ) -> SqliteResult<(User, Student)> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;
        let created_at = now();

        let user_id = insert_user(&tx, account, Role::Student, &created_at)?;
        tx.execute(
            "INSERT INTO students (user_id, availability, experience_level, is_public, skills_completed, created_at)
             VALUES (?1, ?2, ?3, 1, 0, ?4)",
            params![user_id, availability, experience_level, &created_at],
        )?;
        let student_id = tx.last_insert_rowid();

        let user = select_user(&tx, user_id)?;
        tx.commit()?;

        let student = Student {
            id: student_id,
            user_id,
            availability: availability.map(str::to_string),
            experience_level,
            is_public: true,
            skills_completed: 0,
            created_at,
        };
        Ok((user, student))
    }

    /// Create an admin account: user row with role ADMIN, admin row and phone numbers.
    pub async fn create_admin(pool: &DbPool, account: &NewAccount<'_>) -> SqliteResult<User> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;
        let created_at = now();

        let user_id = insert_user(&tx, account, Role::Admin, &created_at)?;
        tx.execute(
            "INSERT INTO admins (user_id, created_at) VALUES (?1, ?2)",
            params![user_id, &created_at],
        )?;

        let user = select_user(&tx, user_id)?;
        tx.commit()?;
        Ok(user)
    }

    /// Get user by ID
    pub async fn get_user(pool: &DbPool, user_id: i64) -> SqliteResult<Option<User>> {
        let conn = pool.lock().await;
        select_user(&conn, user_id).optional()
    }

    /// Get user by email (stored lowercase)
    pub async fn get_user_by_email(pool: &DbPool, email: &str) -> SqliteResult<Option<User>> {
        let conn = pool.lock().await;
        let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
        conn.query_row(&sql, params![email.to_lowercase()], user_from_row)
            .optional()
    }

    pub async fn get_credentials(pool: &DbPool, email: &str) -> SqliteResult<Option<Credentials>> {
        let conn = pool.lock().await;
        conn.query_row(
            "SELECT id, password_hash FROM users WHERE email = ?1",
            params![email.to_lowercase()],
            |row| {
                Ok(Credentials {
                    user_id: row.get(0)?,
                    password_hash: row.get(1)?,
                })
            },
        )
        .optional()
    }

    pub async fn list_users(pool: &DbPool) -> SqliteResult<Vec<User>> {
        let conn = pool.lock().await;
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Delete a user; every dependent row goes with it through cascading keys.
    pub async fn delete_user(pool: &DbPool, user_id: i64) -> SqliteResult<bool> {
        let conn = pool.lock().await;
        let affected = conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
        Ok(affected > 0)
    }

    /// Change a user's role and keep the admins/students rows in step.
    ///
    /// Demoting an admin gives them a student profile if they lack one.
    pub async fn set_role(pool: &DbPool, user_id: i64, role: Role) -> SqliteResult<Option<User>> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;
        let timestamp = now();

        let affected = tx.execute(
            "UPDATE users SET role = ?1, updated_at = ?2 WHERE id = ?3",
            params![role, &timestamp, user_id],
        )?;
        if affected == 0 {
            return Ok(None);
        }

        match role {
            Role::Admin => {
                tx.execute(
                    "INSERT OR IGNORE INTO admins (user_id, created_at) VALUES (?1, ?2)",
                    params![user_id, &timestamp],
                )?;
            }
            Role::Student => {
                tx.execute("DELETE FROM admins WHERE user_id = ?1", params![user_id])?;
                tx.execute(
                    "INSERT OR IGNORE INTO students (user_id, experience_level, is_public, skills_completed, created_at)
                     VALUES (?1, ?2, 1, 0, ?3)",
                    params![user_id, ExperienceLevel::default(), &timestamp],
                )?;
            }
        }

        let user = select_user(&tx, user_id)?;
        tx.commit()?;
        Ok(Some(user))
    }

    pub async fn list_phone_numbers(pool: &DbPool, user_id: i64) -> SqliteResult<Vec<PhoneNumber>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, number, created_at FROM phone_numbers WHERE user_id = ?1 ORDER BY id",
        )?;
        let phones = stmt
            .query_map(params![user_id], phone_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(phones)
    }

    /// Add a phone number unless the user already holds the maximum.
    pub async fn add_phone_number(
        pool: &DbPool,
        user_id: i64,
        number: &str,
    ) -> SqliteResult<PhoneInsert> {
        let conn = pool.lock().await;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM phone_numbers WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        if count >= MAX_PHONE_NUMBERS {
            return Ok(PhoneInsert::LimitReached);
        }

        let created_at = now();
        conn.execute(
            "INSERT INTO phone_numbers (user_id, number, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, number, &created_at],
        )?;

        Ok(PhoneInsert::Added(PhoneNumber {
            id: conn.last_insert_rowid(),
            user_id,
            number: number.to_string(),
            created_at,
        }))
    }

    /// Remove a phone number unless it is the user's last one.
    pub async fn remove_phone_number(
        pool: &DbPool,
        user_id: i64,
        phone_id: i64,
    ) -> SqliteResult<PhoneRemoval> {
        let conn = pool.lock().await;

        let exists: Option<i64> = conn
            .query_row(
                "SELECT id FROM phone_numbers WHERE id = ?1 AND user_id = ?2",
                params![phone_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Ok(PhoneRemoval::NotFound);
        }

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM phone_numbers WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        if count <= 1 {
            return Ok(PhoneRemoval::LastNumber);
        }

        conn.execute("DELETE FROM phone_numbers WHERE id = ?1", params![phone_id])?;
        Ok(PhoneRemoval::Removed)
    }
}

fn insert_user(
    conn: &Connection,
    account: &NewAccount<'_>,
    role: Role,
    created_at: &str,
) -> SqliteResult<i64> {
    conn.execute(
        "INSERT INTO users (email, name, password_hash, role, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            account.email.to_lowercase(),
            account.name,
            account.password_hash,
            role,
            created_at,
        ],
    )?;
    let user_id = conn.last_insert_rowid();

    for number in account.phone_numbers {
        conn.execute(
            "INSERT INTO phone_numbers (user_id, number, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, number, created_at],
        )?;
    }

    Ok(user_id)
}

fn select_user(conn: &Connection, user_id: i64) -> SqliteResult<User> {
    let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
    conn.query_row(&sql, params![user_id], user_from_row)
}
