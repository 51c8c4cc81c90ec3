use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: studyrack.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "studyrack.sqlite".to_string()));

/// Directory for locally stored content files (the path arm of a file
/// reference). The transport's file-store collaborator decides whether it is
/// actually used.
/// Read from STORAGE_DIR environment variable
/// Default: storage
pub static STORAGE_DIR: Lazy<String> = Lazy::new(|| env::var("STORAGE_DIR").unwrap_or_else(|_| "storage".to_string()));

/// Directory for catalog snapshot exports
/// Read from BACKUP_DIR environment variable
/// Default: backups
pub static BACKUP_DIR: Lazy<String> = Lazy::new(|| env::var("BACKUP_DIR").unwrap_or_else(|_| "backups".to_string()));

/// Moderation configuration for the user registry
pub mod moderation {
    use super::Duration;

    /// Warnings before a non-admin user is blocked
    pub const MAX_WARNINGS: i64 = 5;

    /// How long a warning-triggered block lasts (24 hours)
    pub const BLOCK_DURATION_SECS: u64 = 24 * 60 * 60;

    /// Block duration
    pub fn block_duration() -> Duration {
        Duration::from_secs(BLOCK_DURATION_SECS)
    }
}

/// Admin identity configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Admin user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });

    /// Primary admin user ID for direct notifications
    /// Read from ADMIN_USER_ID or fallback to first ADMIN_IDS entry
    /// Defaults to 0 if not set (no admin access)
    pub static ADMIN_USER_ID: Lazy<i64> = Lazy::new(|| {
        env::var("ADMIN_USER_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .or_else(|| ADMIN_IDS.first().copied())
            .unwrap_or(0)
    });

    /// Check if a user ID belongs to the configured admin set
    pub fn is_admin(user_id: i64) -> bool {
        if !ADMIN_IDS.is_empty() {
            return ADMIN_IDS.contains(&user_id);
        }
        if *ADMIN_USER_ID != 0 {
            return *ADMIN_USER_ID == user_id;
        }
        false
    }

}
