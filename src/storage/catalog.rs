//! Catalog hierarchy: subject → chapter → content-type → file reference
//!
//! All operations are plain functions over a connection. Multi-statement
//! mutations run inside a transaction so readers never observe a partially
//! written path; chapters emptied by a deletion are pruned so listings stay
//! accurate.

use crate::core::error::AppResult;
use crate::core::token;
use crate::core::types::{ContentType, FileReference, Subject};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::cmp::Ordering;

/// A chapter row
#[derive(Debug, Clone)]
pub struct Chapter {
    pub id: i64,
    pub subject: Subject,
    pub name: String,
    pub created_at: String,
}

impl Chapter {
    /// The delimiter-safe token this chapter travels under inside action
    /// references
    pub fn token(&self) -> String {
        token::encode(&self.name)
    }
}

/// What a chapter currently holds - the deletion-proposal summary and the
/// wizard's existing-content status line
#[derive(Debug, Clone, Default)]
pub struct ContentSummary {
    pub lecture_numbers: Vec<String>,
    pub has_notes: bool,
    pub has_dpp: bool,
}

/// Numeric-aware ordering for lecture numbers: fully numeric tokens first,
/// by value; everything else after, lexically. `["10","2","3A","1"]` sorts
/// to `["1","2","10","3A"]`.
pub fn compare_lecture_numbers(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>().ok(), b.parse::<f64>().ok()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Lists a subject's chapters in creation order
pub fn list_chapters(conn: &Connection, subject: Subject) -> Result<Vec<Chapter>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, created_at FROM chapters WHERE subject_code = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![subject.code()], |row| {
        Ok(Chapter {
            id: row.get(0)?,
            subject,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    })?;
    rows.collect()
}

/// Finds a chapter by exact display name
pub fn find_chapter(conn: &Connection, subject: Subject, name: &str) -> Result<Option<Chapter>> {
    conn.query_row(
        "SELECT id, name, created_at FROM chapters WHERE subject_code = ?1 AND name = ?2",
        params![subject.code(), name],
        |row| {
            Ok(Chapter {
                id: row.get(0)?,
                subject,
                name: row.get(1)?,
                created_at: row.get(2)?,
            })
        },
    )
    .optional()
}

/// Resolves a chapter token back to its chapter.
///
/// Preference order: exact decode round-trip, then deterministic
/// re-encode equality (covers the truncated slug arm), then plain slug
/// equality, then case/whitespace-normalized equality against the decoded
/// candidate. `Ok(None)` means chapter-not-found - never an error.
pub fn resolve_chapter(conn: &Connection, subject: Subject, chapter_token: &str) -> Result<Option<Chapter>> {
    let decoded = token::decode(chapter_token);

    if let Some(name) = &decoded {
        if let Some(chapter) = find_chapter(conn, subject, name)? {
            return Ok(Some(chapter));
        }
    }

    let chapters = list_chapters(conn, subject)?;

    if let Some(chapter) = chapters.iter().find(|c| token::encode(&c.name) == chapter_token) {
        return Ok(Some(chapter.clone()));
    }

    if let Some(chapter) = chapters.iter().find(|c| token::slug(&c.name) == chapter_token) {
        return Ok(Some(chapter.clone()));
    }

    if let Some(name) = &decoded {
        let wanted = token::normalize(name);
        if let Some(chapter) = chapters.iter().find(|c| token::normalize(&c.name) == wanted) {
            return Ok(Some(chapter.clone()));
        }
    }

    Ok(None)
}

/// Returns the existing chapter a new name would collide with: exact,
/// case/whitespace-insensitive, or slug-equal. Slug collisions are blocked
/// here, at creation time, so the lossy token arm can never resolve to the
/// wrong chapter later.
pub fn name_conflicts(conn: &Connection, subject: Subject, name: &str) -> Result<Option<Chapter>> {
    let wanted_norm = token::normalize(name);
    let wanted_slug = token::slug(name);
    let chapters = list_chapters(conn, subject)?;
    Ok(chapters.into_iter().find(|c| {
        c.name == name || token::normalize(&c.name) == wanted_norm || token::slug(&c.name) == wanted_slug
    }))
}

/// The stored lecture-number key: single-valued types collapse to one slot
fn lecture_key(content_type: ContentType, lecture_no: Option<&str>) -> String {
    if content_type.is_multi_valued() {
        lecture_no.unwrap_or_default().to_string()
    } else {
        String::new()
    }
}

/// Fetches the file reference stored at a content path
pub fn get_content(
    conn: &Connection,
    chapter_id: i64,
    content_type: ContentType,
    lecture_no: Option<&str>,
) -> Result<Option<FileReference>> {
    conn.query_row(
        "SELECT file_id, file_path FROM contents
         WHERE chapter_id = ?1 AND content_type = ?2 AND lecture_no = ?3",
        params![chapter_id, content_type.code(), lecture_key(content_type, lecture_no)],
        |row| {
            Ok(FileReference {
                file_id: row.get(0)?,
                path: row.get(1)?,
            })
        },
    )
    .optional()
}

/// Stores a file reference at a content path, creating the chapter row on
/// demand. Re-uploading the same path overwrites the previous reference -
/// there are never duplicate entries.
pub fn put_content(
    conn: &Connection,
    subject: Subject,
    chapter_name: &str,
    content_type: ContentType,
    lecture_no: Option<&str>,
    reference: &FileReference,
) -> AppResult<Chapter> {
    let now = Utc::now().to_rfc3339();
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT OR IGNORE INTO chapters (subject_code, name, created_at) VALUES (?1, ?2, ?3)",
        params![subject.code(), chapter_name, now],
    )?;
    let chapter_id: i64 = tx.query_row(
        "SELECT id FROM chapters WHERE subject_code = ?1 AND name = ?2",
        params![subject.code(), chapter_name],
        |row| row.get(0),
    )?;

    tx.execute(
        "INSERT INTO contents (chapter_id, content_type, lecture_no, file_id, file_path, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(chapter_id, content_type, lecture_no)
         DO UPDATE SET file_id = excluded.file_id, file_path = excluded.file_path, created_at = excluded.created_at",
        params![
            chapter_id,
            content_type.code(),
            lecture_key(content_type, lecture_no),
            reference.file_id,
            reference.path,
            now
        ],
    )?;
    tx.commit()?;

    log::info!(
        "Stored {} for {}/{} (lecture_no: {:?})",
        content_type.code(),
        subject.code(),
        chapter_name,
        lecture_no
    );

    Ok(Chapter {
        id: chapter_id,
        subject,
        name: chapter_name.to_string(),
        created_at: now,
    })
}

/// Deletes a chapter and everything under it
pub fn delete_chapter(conn: &Connection, chapter_id: i64) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM contents WHERE chapter_id = ?1", params![chapter_id])?;
    tx.execute("DELETE FROM chapters WHERE id = ?1", params![chapter_id])?;
    tx.commit()?;
    log::info!("Deleted chapter {} with all content", chapter_id);
    Ok(())
}

/// Deletes one content entry; returns how many rows were removed (0 or 1).
/// A chapter left with nothing under it is pruned.
pub fn delete_content(
    conn: &Connection,
    chapter_id: i64,
    content_type: ContentType,
    lecture_no: Option<&str>,
) -> AppResult<usize> {
    let tx = conn.unchecked_transaction()?;
    let removed = tx.execute(
        "DELETE FROM contents WHERE chapter_id = ?1 AND content_type = ?2 AND lecture_no = ?3",
        params![chapter_id, content_type.code(), lecture_key(content_type, lecture_no)],
    )?;
    prune_chapter_if_empty(&tx, chapter_id)?;
    tx.commit()?;
    Ok(removed)
}

/// Deletes every lecture entry under a chapter; returns how many were
/// removed. Prunes the chapter when nothing else remains.
pub fn delete_all_lectures(conn: &Connection, chapter_id: i64) -> AppResult<usize> {
    let tx = conn.unchecked_transaction()?;
    let removed = tx.execute(
        "DELETE FROM contents WHERE chapter_id = ?1 AND content_type = ?2",
        params![chapter_id, ContentType::Lecture.code()],
    )?;
    prune_chapter_if_empty(&tx, chapter_id)?;
    tx.commit()?;
    Ok(removed)
}

fn prune_chapter_if_empty(conn: &Connection, chapter_id: i64) -> Result<()> {
    let remaining: i64 = conn.query_row(
        "SELECT COUNT(*) FROM contents WHERE chapter_id = ?1",
        params![chapter_id],
        |row| row.get(0),
    )?;
    if remaining == 0 {
        conn.execute("DELETE FROM chapters WHERE id = ?1", params![chapter_id])?;
        log::info!("Pruned empty chapter {}", chapter_id);
    }
    Ok(())
}

/// Lists a chapter's lecture numbers in numeric-aware order
pub fn list_lecture_numbers(conn: &Connection, chapter_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT lecture_no FROM contents WHERE chapter_id = ?1 AND content_type = ?2",
    )?;
    let rows = stmt.query_map(params![chapter_id, ContentType::Lecture.code()], |row| {
        row.get::<_, String>(0)
    })?;
    let mut numbers: Vec<String> = rows.collect::<Result<_>>()?;
    numbers.sort_by(|a, b| compare_lecture_numbers(a, b));
    Ok(numbers)
}

/// Summarizes what a chapter currently holds
pub fn content_summary(conn: &Connection, chapter_id: i64) -> Result<ContentSummary> {
    let lecture_numbers = list_lecture_numbers(conn, chapter_id)?;
    let has_notes = get_content(conn, chapter_id, ContentType::Notes, None)?.is_some();
    let has_dpp = get_content(conn, chapter_id, ContentType::Dpp, None)?.is_some();
    Ok(ContentSummary {
        lecture_numbers,
        has_notes,
        has_dpp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE subjects (code TEXT PRIMARY KEY, label TEXT NOT NULL);
             CREATE TABLE chapters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject_code TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(subject_code, name));
             CREATE TABLE contents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chapter_id INTEGER NOT NULL,
                content_type TEXT NOT NULL,
                lecture_no TEXT NOT NULL DEFAULT '',
                file_id TEXT,
                file_path TEXT,
                created_at TEXT NOT NULL,
                UNIQUE(chapter_id, content_type, lecture_no));",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_lecture_number_ordering() {
        let mut numbers = vec!["10", "2", "3A", "1"];
        numbers.sort_by(|a, b| compare_lecture_numbers(a, b));
        assert_eq!(numbers, vec!["1", "2", "10", "3A"]);

        let mut numbers = vec!["2.1", "2", "10", "1", "4A", "B"];
        numbers.sort_by(|a, b| compare_lecture_numbers(a, b));
        assert_eq!(numbers, vec!["1", "2", "2.1", "10", "4A", "B"]);
    }

    #[test]
    fn test_put_content_is_idempotent() {
        let conn = test_conn();
        let first = FileReference::from_file_id("old");
        let second = FileReference::from_file_id("new");

        put_content(&conn, Subject::Physics, "Motion", ContentType::Notes, None, &first).unwrap();
        let chapter = put_content(&conn, Subject::Physics, "Motion", ContentType::Notes, None, &second).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM contents", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let stored = get_content(&conn, chapter.id, ContentType::Notes, None).unwrap();
        assert_eq!(stored, Some(second));
    }

    #[test]
    fn test_resolve_chapter_via_token_round_trip() {
        let conn = test_conn();
        let name = "Laws of Motion";
        let chapter = put_content(
            &conn,
            Subject::Physics,
            name,
            ContentType::Notes,
            None,
            &FileReference::from_file_id("f"),
        )
        .unwrap();

        let resolved = resolve_chapter(&conn, Subject::Physics, &chapter.token()).unwrap();
        assert_eq!(resolved.map(|c| c.name), Some(name.to_string()));
    }

    #[test]
    fn test_resolve_chapter_via_slug_fallback() {
        let conn = test_conn();
        let name = "A Very Long Chapter Name About Electromagnetic Induction";
        let chapter = put_content(
            &conn,
            Subject::Physics,
            name,
            ContentType::Notes,
            None,
            &FileReference::from_file_id("f"),
        )
        .unwrap();

        // The token for a long name is the lossy slug arm
        let tok = chapter.token();
        assert!(token::decode(&tok).is_none());
        let resolved = resolve_chapter(&conn, Subject::Physics, &tok).unwrap();
        assert_eq!(resolved.map(|c| c.name), Some(name.to_string()));
    }

    #[test]
    fn test_resolve_chapter_not_found() {
        let conn = test_conn();
        assert!(resolve_chapter(&conn, Subject::Physics, "bm9wZQ").unwrap().is_none());
        assert!(resolve_chapter(&conn, Subject::Physics, "???").unwrap().is_none());
    }

    #[test]
    fn test_name_conflicts_detects_slug_collision() {
        let conn = test_conn();
        put_content(
            &conn,
            Subject::Maths,
            "Unit 3: Algebra",
            ContentType::Notes,
            None,
            &FileReference::from_file_id("f"),
        )
        .unwrap();

        assert!(name_conflicts(&conn, Subject::Maths, "Unit 3: Algebra").unwrap().is_some());
        assert!(name_conflicts(&conn, Subject::Maths, "unit 3  algebra").unwrap().is_some());
        assert!(name_conflicts(&conn, Subject::Maths, "Unit-3 Algebra!").unwrap().is_some());
        assert!(name_conflicts(&conn, Subject::Maths, "Unit 4: Algebra").unwrap().is_none());
        // Other subjects are a separate namespace
        assert!(name_conflicts(&conn, Subject::Physics, "Unit 3: Algebra").unwrap().is_none());
    }

    #[test]
    fn test_delete_chapter_cascades() {
        let conn = test_conn();
        let chapter = put_content(
            &conn,
            Subject::Physics,
            "Motion",
            ContentType::Lecture,
            Some("1"),
            &FileReference::from_file_id("f1"),
        )
        .unwrap();
        put_content(
            &conn,
            Subject::Physics,
            "Motion",
            ContentType::Notes,
            None,
            &FileReference::from_file_id("f2"),
        )
        .unwrap();

        delete_chapter(&conn, chapter.id).unwrap();

        let tok = token::encode("Motion");
        assert!(resolve_chapter(&conn, Subject::Physics, &tok).unwrap().is_none());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM contents", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_lecture_lifecycle_with_pruning() {
        let conn = test_conn();
        let chapter = put_content(
            &conn,
            Subject::Physics,
            "Motion",
            ContentType::Lecture,
            Some("1"),
            &FileReference::from_file_id("f1"),
        )
        .unwrap();
        put_content(
            &conn,
            Subject::Physics,
            "Motion",
            ContentType::Lecture,
            Some("2"),
            &FileReference::from_file_id("f2"),
        )
        .unwrap();

        assert_eq!(list_lecture_numbers(&conn, chapter.id).unwrap(), vec!["1", "2"]);

        delete_content(&conn, chapter.id, ContentType::Lecture, Some("1")).unwrap();
        assert_eq!(list_lecture_numbers(&conn, chapter.id).unwrap(), vec!["2"]);

        // Removing the last lecture leaves nothing - the chapter is pruned
        delete_content(&conn, chapter.id, ContentType::Lecture, Some("2")).unwrap();
        assert!(find_chapter(&conn, Subject::Physics, "Motion").unwrap().is_none());
    }

    #[test]
    fn test_pruning_spares_chapter_with_other_content() {
        let conn = test_conn();
        let chapter = put_content(
            &conn,
            Subject::Physics,
            "Motion",
            ContentType::Lecture,
            Some("1"),
            &FileReference::from_file_id("f1"),
        )
        .unwrap();
        put_content(
            &conn,
            Subject::Physics,
            "Motion",
            ContentType::Notes,
            None,
            &FileReference::from_file_id("f2"),
        )
        .unwrap();

        delete_all_lectures(&conn, chapter.id).unwrap();
        let summary = content_summary(&conn, chapter.id).unwrap();
        assert!(summary.lecture_numbers.is_empty());
        assert!(summary.has_notes);
        assert!(find_chapter(&conn, Subject::Physics, "Motion").unwrap().is_some());
    }
}
