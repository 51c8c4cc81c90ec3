use crate::core::error::AppResult;
use crate::core::types::Subject;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Result;
use strum::IntoEnumIterator;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a pool of up to 10 connections with foreign keys enabled,
/// bootstraps the schema, and seeds the fixed subject set.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let conn = pool.get()?;
    init_schema(&conn)?;
    seed_subjects(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Creates the schema when missing. Single-valued content types store an
/// empty-string lecture number so the uniqueness constraint covers both
/// shapes of the hierarchy with one index.
fn init_schema(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS subjects (
            code       TEXT PRIMARY KEY,
            label      TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS chapters (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_code TEXT NOT NULL REFERENCES subjects(code),
            name         TEXT NOT NULL,
            created_at   TEXT NOT NULL,
            UNIQUE(subject_code, name)
        );
        CREATE TABLE IF NOT EXISTS contents (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            chapter_id   INTEGER NOT NULL REFERENCES chapters(id) ON DELETE CASCADE,
            content_type TEXT NOT NULL,
            lecture_no   TEXT NOT NULL DEFAULT '',
            file_id      TEXT,
            file_path    TEXT,
            created_at   TEXT NOT NULL,
            UNIQUE(chapter_id, content_type, lecture_no)
        );
        CREATE TABLE IF NOT EXISTS users (
            telegram_id   INTEGER PRIMARY KEY,
            username      TEXT,
            first_name    TEXT,
            warnings      INTEGER NOT NULL DEFAULT 0,
            is_blocked    INTEGER NOT NULL DEFAULT 0,
            blocked_until TEXT,
            created_at    TEXT NOT NULL,
            last_active   TEXT NOT NULL
        );",
    )
}

/// Seeds the fixed subject rows; already-present subjects are left alone
fn seed_subjects(conn: &rusqlite::Connection) -> Result<()> {
    for subject in Subject::iter() {
        conn.execute(
            "INSERT OR IGNORE INTO subjects (code, label) VALUES (?1, ?2)",
            rusqlite::params![subject.code(), subject.label()],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_pool_seeds_subjects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        let conn = get_connection(&pool).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM subjects", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count as usize, Subject::iter().count());

        // Idempotent: a second pool over the same file must not duplicate
        drop(conn);
        let pool2 = create_pool(path.to_str().unwrap()).unwrap();
        let conn2 = get_connection(&pool2).unwrap();
        let count2: i64 = conn2
            .query_row("SELECT COUNT(*) FROM subjects", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, count2);
    }
}
