/// Database layer for persistent storage.
/// One store per aggregate: users (with students, admins and phone numbers),
/// skills, swap requests, reports, favorites, contacts and session tokens.

pub mod contacts;
pub mod favorites;
pub mod init;
pub mod models;
pub mod reports;
pub mod requests;
pub mod skills;
pub mod students;
pub mod tokens;
pub mod users;

pub use contacts::ContactStore;
pub use favorites::FavoriteStore;
pub use reports::ReportStore;
pub use requests::RequestStore;
pub use skills::SkillStore;
pub use students::StudentStore;
pub use tokens::TokenStore;
pub use users::UserStore;

use chrono::Utc;
use models::{DashboardStats, RequestCounts};
use rusqlite::{Connection, Result as SqliteResult};
use std::sync::Arc;
use tokio::sync::Mutex;

pub type DbPool = Arc<Mutex<Connection>>;

/// Create a connection pool (simplified for single-threaded SQLite)
pub fn create_pool(db_path: &str) -> SqliteResult<DbPool> {
    let conn = Connection::open(db_path)?;
    init::initialize_database(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Create an in-memory database for testing
pub fn create_test_pool() -> DbPool {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory DB");
    init::initialize_database(&conn).expect("Failed to initialize DB");
    Arc::new(Mutex::new(conn))
}

/// Current time as stored in every timestamp column
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Cross-table queries for the admin dashboard
pub struct Database;

impl Database {
    pub async fn dashboard_stats(pool: &DbPool) -> SqliteResult<DashboardStats> {
        let conn = pool.lock().await;
        let count = |sql: &str| -> SqliteResult<i64> { conn.query_row(sql, [], |row| row.get(0)) };

        let mut requests = RequestCounts::default();
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM requests GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, models::RequestStatus>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (status, n) = row?;
            match status {
                models::RequestStatus::Pending => requests.pending = n,
                models::RequestStatus::Accepted => requests.accepted = n,
                models::RequestStatus::Rejected => requests.rejected = n,
                models::RequestStatus::Completed => requests.completed = n,
            }
        }

        Ok(DashboardStats {
            users: count("SELECT COUNT(*) FROM users")?,
            students: count("SELECT COUNT(*) FROM students")?,
            admins: count("SELECT COUNT(*) FROM admins")?,
            skills: count("SELECT COUNT(*) FROM skills")?,
            contacts: count("SELECT COUNT(*) FROM contacts")?,
            open_reports: count("SELECT COUNT(*) FROM reports WHERE status = 'OPEN'")?,
            requests,
        })
    }
}
