//! Registered-user registry with warning/block bookkeeping
//!
//! Every user who has ever opened the bot gets a row here; the set doubles
//! as the broadcast fan-out target. Non-admin users who keep sending
//! free-form text accrue warnings and are blocked for 24 hours at the
//! limit; expired blocks lift lazily on the next contact.

use crate::core::config::moderation::{block_duration, MAX_WARNINGS};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

/// A registered user row
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub warnings: i64,
    pub is_blocked: bool,
    pub blocked_until: Option<String>,
    pub created_at: String,
    pub last_active: String,
}

impl RegisteredUser {
    /// Whether the block is still in force right now
    pub fn currently_blocked(&self) -> bool {
        if !self.is_blocked {
            return false;
        }
        match &self.blocked_until {
            Some(until) => match DateTime::parse_from_rfc3339(until) {
                Ok(t) => t.with_timezone(&Utc) > Utc::now(),
                Err(_) => true,
            },
            None => true,
        }
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<RegisteredUser> {
    Ok(RegisteredUser {
        telegram_id: row.get(0)?,
        username: row.get(1)?,
        first_name: row.get(2)?,
        warnings: row.get(3)?,
        is_blocked: row.get::<_, i64>(4)? != 0,
        blocked_until: row.get(5)?,
        created_at: row.get(6)?,
        last_active: row.get(7)?,
    })
}

const USER_COLUMNS: &str =
    "telegram_id, username, first_name, warnings, is_blocked, blocked_until, created_at, last_active";

/// Fetches a user by ID
pub fn get_user(conn: &Connection, telegram_id: i64) -> Result<Option<RegisteredUser>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?1"),
        params![telegram_id],
        row_to_user,
    )
    .optional()
}

/// Registers the user on first contact, refreshes profile fields and
/// `last_active` on every later one, and lifts an expired block.
pub fn ensure_user(
    conn: &Connection,
    telegram_id: i64,
    username: Option<&str>,
    first_name: Option<&str>,
) -> Result<RegisteredUser> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users (telegram_id, username, first_name, created_at, last_active)
         VALUES (?1, ?2, ?3, ?4, ?4)
         ON CONFLICT(telegram_id) DO UPDATE SET
             username = COALESCE(excluded.username, username),
             first_name = COALESCE(excluded.first_name, first_name),
             last_active = excluded.last_active",
        params![telegram_id, username, first_name, now],
    )?;

    let mut user = match get_user(conn, telegram_id)? {
        Some(user) => user,
        None => {
            return Err(rusqlite::Error::QueryReturnedNoRows);
        }
    };

    if user.is_blocked && !user.currently_blocked() {
        unblock_user(conn, telegram_id)?;
        user.is_blocked = false;
        user.warnings = 0;
        user.blocked_until = None;
        log::info!("Block expired for user {}, lifted", telegram_id);
    }

    Ok(user)
}

/// Adds a warning; at `MAX_WARNINGS` the user is blocked for the block
/// duration. Returns the new warning count.
pub fn add_warning(conn: &Connection, telegram_id: i64) -> Result<i64> {
    conn.execute(
        "UPDATE users SET warnings = warnings + 1 WHERE telegram_id = ?1",
        params![telegram_id],
    )?;
    let warnings: i64 = conn.query_row(
        "SELECT warnings FROM users WHERE telegram_id = ?1",
        params![telegram_id],
        |row| row.get(0),
    )?;
    if warnings >= MAX_WARNINGS {
        block_user(conn, telegram_id)?;
    }
    Ok(warnings)
}

/// Blocks a user until the block duration elapses
pub fn block_user(conn: &Connection, telegram_id: i64) -> Result<()> {
    let until = Utc::now()
        + ChronoDuration::from_std(block_duration()).unwrap_or_else(|_| ChronoDuration::hours(24));
    conn.execute(
        "UPDATE users SET is_blocked = 1, blocked_until = ?2 WHERE telegram_id = ?1",
        params![telegram_id, until.to_rfc3339()],
    )?;
    log::info!("Blocked user {} until {}", telegram_id, until.to_rfc3339());
    Ok(())
}

/// Clears a user's block and warnings
pub fn unblock_user(conn: &Connection, telegram_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET is_blocked = 0, warnings = 0, blocked_until = NULL WHERE telegram_id = ?1",
        params![telegram_id],
    )?;
    Ok(())
}

/// Removes a user entirely - the fan-out eviction path for recipients who
/// are permanently unreachable
pub fn remove_user(conn: &Connection, telegram_id: i64) -> Result<()> {
    conn.execute("DELETE FROM users WHERE telegram_id = ?1", params![telegram_id])?;
    log::info!("Removed user {} from registry", telegram_id);
    Ok(())
}

/// All registered user IDs (broadcast targets)
pub fn all_user_ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT telegram_id FROM users ORDER BY telegram_id")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.collect()
}

/// All registered users, newest first (admin user-management screen)
pub fn all_users(conn: &Connection) -> Result<Vec<RegisteredUser>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"))?;
    let rows = stmt.query_map([], row_to_user)?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (
                telegram_id INTEGER PRIMARY KEY,
                username TEXT,
                first_name TEXT,
                warnings INTEGER NOT NULL DEFAULT 0,
                is_blocked INTEGER NOT NULL DEFAULT 0,
                blocked_until TEXT,
                created_at TEXT NOT NULL,
                last_active TEXT NOT NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_ensure_user_registers_once() {
        let conn = test_conn();
        ensure_user(&conn, 100, Some("alice"), Some("Alice")).unwrap();
        ensure_user(&conn, 100, None, None).unwrap();

        let users = all_users(&conn).unwrap();
        assert_eq!(users.len(), 1);
        // Profile fields survive a contact that carries none
        assert_eq!(users[0].username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_warnings_block_at_limit() {
        let conn = test_conn();
        ensure_user(&conn, 100, None, None).unwrap();

        for _ in 0..MAX_WARNINGS - 1 {
            add_warning(&conn, 100).unwrap();
        }
        assert!(!get_user(&conn, 100).unwrap().unwrap().currently_blocked());

        add_warning(&conn, 100).unwrap();
        assert!(get_user(&conn, 100).unwrap().unwrap().currently_blocked());
    }

    #[test]
    fn test_expired_block_lifts_on_contact() {
        let conn = test_conn();
        ensure_user(&conn, 100, None, None).unwrap();
        // Block that expired an hour ago
        let past = (Utc::now() - ChronoDuration::hours(1)).to_rfc3339();
        conn.execute(
            "UPDATE users SET is_blocked = 1, warnings = 5, blocked_until = ?1 WHERE telegram_id = 100",
            params![past],
        )
        .unwrap();

        let user = ensure_user(&conn, 100, None, None).unwrap();
        assert!(!user.currently_blocked());
        assert_eq!(user.warnings, 0);
    }

    #[test]
    fn test_remove_user_shrinks_fanout_set() {
        let conn = test_conn();
        ensure_user(&conn, 1, None, None).unwrap();
        ensure_user(&conn, 2, None, None).unwrap();
        remove_user(&conn, 1).unwrap();
        assert_eq!(all_user_ids(&conn).unwrap(), vec![2]);
    }
}
