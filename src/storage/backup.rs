//! Catalog snapshot export
//!
//! Serializes the whole hierarchy to a timestamped JSON file in the nested
//! layout `subject code → chapter name → content type`, where `lecture`
//! nests lecture-number → file reference and `notes`/`dpp` map directly to
//! one reference. A flat-file deployment can be reconstructed from a
//! snapshot.

use crate::core::error::AppResult;
use crate::core::types::{ContentType, FileReference, Subject};
use crate::storage::catalog;
use chrono::Utc;
use fs_err as fs;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

/// One chapter's slice of a snapshot
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ChapterSnapshot {
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub lecture: BTreeMap<String, FileReference>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<FileReference>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dpp: Option<FileReference>,
}

/// subject code → chapter name → chapter snapshot
pub type CatalogSnapshot = BTreeMap<String, BTreeMap<String, ChapterSnapshot>>;

/// Builds the snapshot of everything currently in the catalog
pub fn build_snapshot(conn: &Connection) -> AppResult<CatalogSnapshot> {
    let mut snapshot = CatalogSnapshot::new();
    for subject in Subject::iter() {
        let mut chapters = BTreeMap::new();
        for chapter in catalog::list_chapters(conn, subject)? {
            let mut entry = ChapterSnapshot::default();
            for no in catalog::list_lecture_numbers(conn, chapter.id)? {
                if let Some(reference) = catalog::get_content(conn, chapter.id, ContentType::Lecture, Some(&no))? {
                    entry.lecture.insert(no, reference);
                }
            }
            entry.notes = catalog::get_content(conn, chapter.id, ContentType::Notes, None)?;
            entry.dpp = catalog::get_content(conn, chapter.id, ContentType::Dpp, None)?;
            chapters.insert(chapter.name, entry);
        }
        if !chapters.is_empty() {
            snapshot.insert(subject.code().to_string(), chapters);
        }
    }
    Ok(snapshot)
}

/// Writes a timestamped snapshot file into `dir` and returns its path
pub fn export_snapshot(conn: &Connection, dir: &Path) -> AppResult<PathBuf> {
    let snapshot = build_snapshot(conn)?;
    let json = serde_json::to_string_pretty(&snapshot)?;

    fs::create_dir_all(dir)?;
    let filename = format!("catalog-{}.json", Utc::now().format("%Y%m%d-%H%M%S"));
    let path = dir.join(filename);
    fs::write(&path, json)?;

    log::info!("Exported catalog snapshot to {}", path.display());
    Ok(path)
}
