/// Database schema initialization.
/// Sets up SQLite WAL mode, enforces foreign keys and creates tables on startup.
use rusqlite::{Connection, Result as SqliteResult};

/// Initialize database connection with WAL mode and schema
pub fn initialize_database(conn: &Connection) -> SqliteResult<()> {
    // Enable WAL mode (for file-based DB only, ignore error for in-memory)
    let _ = conn.execute_batch("PRAGMA journal_mode = WAL");
    let _ = conn.execute_batch("PRAGMA synchronous = NORMAL");
    conn.execute_batch("PRAGMA foreign_keys = ON")?;

    create_schema(conn)?;

    Ok(())
}

/// Create all database tables
fn create_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'STUDENT',
            bio TEXT,
            location TEXT,
            avatar_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY,
            user_id INTEGER UNIQUE NOT NULL,
            availability TEXT,
            experience_level TEXT NOT NULL DEFAULT 'BEGINNER',
            is_public INTEGER NOT NULL DEFAULT 1,
            skills_completed INTEGER NOT NULL DEFAULT 0 CHECK (skills_completed >= 0),
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS admins (
            id INTEGER PRIMARY KEY,
            user_id INTEGER UNIQUE NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS skills (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            category TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS skills_offered (
            student_id INTEGER NOT NULL,
            skill_id INTEGER NOT NULL,
            PRIMARY KEY (student_id, skill_id),
            FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE,
            FOREIGN KEY(skill_id) REFERENCES skills(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS skills_wanted (
            student_id INTEGER NOT NULL,
            skill_id INTEGER NOT NULL,
            PRIMARY KEY (student_id, skill_id),
            FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE,
            FOREIGN KEY(skill_id) REFERENCES skills(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS requests (
            id INTEGER PRIMARY KEY,
            sender_id INTEGER NOT NULL,
            receiver_id INTEGER NOT NULL,
            requested_skill_id INTEGER NOT NULL,
            offered_skill_id INTEGER NOT NULL,
            message TEXT,
            status TEXT NOT NULL DEFAULT 'PENDING',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (sender_id <> receiver_id),
            FOREIGN KEY(sender_id) REFERENCES students(id) ON DELETE CASCADE,
            FOREIGN KEY(receiver_id) REFERENCES students(id) ON DELETE CASCADE,
            FOREIGN KEY(requested_skill_id) REFERENCES skills(id) ON DELETE CASCADE,
            FOREIGN KEY(offered_skill_id) REFERENCES skills(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS reports (
            id INTEGER PRIMARY KEY,
            reporter_id INTEGER NOT NULL,
            reported_id INTEGER NOT NULL,
            reason TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'OPEN',
            admin_notes TEXT,
            created_at TEXT NOT NULL,
            resolved_at TEXT,
            CHECK (reporter_id <> reported_id),
            FOREIGN KEY(reporter_id) REFERENCES students(id) ON DELETE CASCADE,
            FOREIGN KEY(reported_id) REFERENCES students(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS favorites (
            id INTEGER PRIMARY KEY,
            student_id INTEGER NOT NULL,
            favorite_student_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(student_id, favorite_student_id),
            CHECK (student_id <> favorite_student_id),
            FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE,
            FOREIGN KEY(favorite_student_id) REFERENCES students(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS phone_numbers (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            number TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, number),
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS refresh_tokens (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            token_hash TEXT UNIQUE NOT NULL,
            expires_at INTEGER NOT NULL,
            revoked INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            token_hash TEXT UNIQUE NOT NULL,
            expires_at INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_requests_sender ON requests(sender_id, status);
        CREATE INDEX IF NOT EXISTS idx_requests_receiver ON requests(receiver_id, status);
        CREATE INDEX IF NOT EXISTS idx_requests_skills ON requests(requested_skill_id, offered_skill_id);
        CREATE INDEX IF NOT EXISTS idx_reports_status ON reports(status);
        CREATE INDEX IF NOT EXISTS idx_phone_numbers_user ON phone_numbers(user_id);
        CREATE INDEX IF NOT EXISTS idx_refresh_tokens_user ON refresh_tokens(user_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_initialize_in_memory_database() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("Failed to initialize DB");

        let tables: Vec<String> = conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            )
            .expect("Query failed")
            .query_map([], |row| row.get(0))
            .expect("Mapping failed")
            .collect::<Result<Vec<_>, _>>()
            .expect("Collection failed");

        for table in [
            "users",
            "students",
            "admins",
            "skills",
            "skills_offered",
            "skills_wanted",
            "requests",
            "reports",
            "favorites",
            "contacts",
            "phone_numbers",
            "refresh_tokens",
            "sessions",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("First init failed");
        initialize_database(&conn).expect("Second init failed");
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("Failed to initialize DB");

        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .expect("Query failed");
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_skill_names_unique_ignoring_case() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("Failed to initialize DB");

        conn.execute(
            "INSERT INTO skills (name, created_at) VALUES ('Rust', '2025-01-01T00:00:00Z')",
            [],
        )
        .expect("First insert failed");
        let result = conn.execute(
            "INSERT INTO skills (name, created_at) VALUES ('rust', '2025-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }
}
