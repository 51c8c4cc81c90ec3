//! Two-phase deletion workflow
//!
//! Every destructive operation goes propose → confirm (or cancel). Both
//! phases re-resolve the target through the catalog immediately before
//! acting - the token inside the button is an address, not a liveness
//! proof, and content may have changed while the propose screen sat open.

use crate::core::error::AppResult;
use crate::core::types::ContentType;
use crate::menu::action::DeleteTarget;
use crate::menu::screen::{Button, Screen};
use crate::storage::catalog::{self, Chapter, ContentSummary};
use rusqlite::Connection;

fn summary_line(summary: &ContentSummary) -> String {
    let mut parts = Vec::new();
    if !summary.lecture_numbers.is_empty() {
        parts.push(format!(
            "🎥 {} lecture(s): {}",
            summary.lecture_numbers.len(),
            summary.lecture_numbers.join(", ")
        ));
    }
    if summary.has_notes {
        parts.push("📝 notes".to_string());
    }
    if summary.has_dpp {
        parts.push("📊 DPP".to_string());
    }
    if parts.is_empty() {
        "nothing stored yet".to_string()
    } else {
        parts.join("\n")
    }
}

fn back_row(chapter: &Chapter) -> Vec<Button> {
    vec![Button::new(
        "🔙 Back",
        format!("del:menu:{}:{}", chapter.subject.code(), chapter.token()),
    )]
}

/// Recovery screen for a target that vanished between screens
fn stale_screen(subject: crate::core::types::Subject) -> Screen {
    let mut screen = Screen::new("🤷 That chapter is already gone.");
    screen.push_row(vec![Button::new("🔙 Chapters", format!("adm:msubj:{}", subject.code()))]);
    screen
}

/// Entry point for the per-chapter management menu; resolves the token
/// first and degrades to the stale screen when the chapter vanished
pub fn menu_screen(conn: &Connection, subject: crate::core::types::Subject, chapter_token: &str) -> AppResult<Screen> {
    match catalog::resolve_chapter(conn, subject, chapter_token)? {
        Some(chapter) => chapter_manage_screen(conn, &chapter),
        None => Ok(stale_screen(subject)),
    }
}

/// Entry point for the single-lecture picker
pub fn pick_screen(conn: &Connection, subject: crate::core::types::Subject, chapter_token: &str) -> AppResult<Screen> {
    match catalog::resolve_chapter(conn, subject, chapter_token)? {
        Some(chapter) => lecture_pick_screen(conn, &chapter),
        None => Ok(stale_screen(subject)),
    }
}

/// The per-chapter management screen: every deletion granularity, with the
/// current contents shown so the admin sees what is at stake
pub fn chapter_manage_screen(conn: &Connection, chapter: &Chapter) -> AppResult<Screen> {
    let summary = catalog::content_summary(conn, chapter.id)?;
    let subject = chapter.subject;
    let tok = chapter.token();

    let mut screen = Screen::new(format!(
        "🗂 {} / {}\n\nCurrently stored:\n{}\n\nSelect an action:",
        subject.label(),
        chapter.name,
        summary_line(&summary)
    ));
    screen.push_row(vec![Button::new(
        "🗑 Delete whole chapter",
        DeleteTarget::Chapter {
            subject,
            chapter_token: tok.clone(),
        }
        .propose_token(),
    )]);
    if !summary.lecture_numbers.is_empty() {
        screen.push_row(vec![Button::new(
            "🗑 Delete all lectures",
            DeleteTarget::AllLectures {
                subject,
                chapter_token: tok.clone(),
            }
            .propose_token(),
        )]);
        screen.push_row(vec![Button::new(
            "🗑 Delete one lecture…",
            format!("del:pick:{}:{}", subject.code(), tok),
        )]);
    }
    if summary.has_notes {
        screen.push_row(vec![Button::new(
            "🗑 Delete notes",
            DeleteTarget::Notes {
                subject,
                chapter_token: tok.clone(),
            }
            .propose_token(),
        )]);
    }
    if summary.has_dpp {
        screen.push_row(vec![Button::new(
            "🗑 Delete DPP",
            DeleteTarget::Dpp {
                subject,
                chapter_token: tok.clone(),
            }
            .propose_token(),
        )]);
    }
    screen.push_row(vec![Button::new(
        "🔙 Back",
        format!("adm:msubj:{}", subject.code()),
    )]);
    Ok(screen)
}

/// Picker for deleting one specific lecture number
pub fn lecture_pick_screen(conn: &Connection, chapter: &Chapter) -> AppResult<Screen> {
    let numbers = catalog::list_lecture_numbers(conn, chapter.id)?;
    if numbers.is_empty() {
        let mut screen = Screen::new(format!("\"{}\" has no lectures to delete.", chapter.name));
        screen.push_row(back_row(chapter));
        return Ok(screen);
    }

    let mut screen = Screen::new(format!("🗑 {}\n\nWhich lecture should be removed?", chapter.name));
    for chunk in numbers.chunks(4) {
        screen.push_row(
            chunk
                .iter()
                .map(|no| {
                    Button::new(
                        format!("#{no}"),
                        DeleteTarget::Lecture {
                            subject: chapter.subject,
                            chapter_token: chapter.token(),
                            lecture_no: no.clone(),
                        }
                        .propose_token(),
                    )
                })
                .collect(),
        );
    }
    screen.push_row(back_row(chapter));
    Ok(screen)
}

/// Phase one: re-resolve the target and show exactly what a confirmation
/// would remove
pub fn propose_screen(conn: &Connection, target: &DeleteTarget) -> AppResult<Screen> {
    let Some(chapter) = catalog::resolve_chapter(conn, target.subject(), target.chapter_token())? else {
        return Ok(stale_screen(target.subject()));
    };
    let summary = catalog::content_summary(conn, chapter.id)?;

    let body = match target {
        DeleteTarget::Chapter { .. } => Some(format!(
            "⚠️ Delete the whole chapter \"{}\" ({})?\n\nThis permanently removes:\n{}",
            chapter.name,
            chapter.subject.label(),
            summary_line(&summary)
        )),
        DeleteTarget::AllLectures { .. } => {
            if summary.lecture_numbers.is_empty() {
                None
            } else {
                Some(format!(
                    "⚠️ Delete all {} lecture(s) of \"{}\"?\n\nLecture numbers: {}",
                    summary.lecture_numbers.len(),
                    chapter.name,
                    summary.lecture_numbers.join(", ")
                ))
            }
        }
        DeleteTarget::Lecture { lecture_no, .. } => {
            if summary.lecture_numbers.iter().any(|no| no == lecture_no) {
                Some(format!("⚠️ Delete 🎥 Lecture #{} of \"{}\"?", lecture_no, chapter.name))
            } else {
                None
            }
        }
        DeleteTarget::Notes { .. } => summary
            .has_notes
            .then(|| format!("⚠️ Delete 📝 notes of \"{}\"?", chapter.name)),
        DeleteTarget::Dpp { .. } => summary
            .has_dpp
            .then(|| format!("⚠️ Delete 📊 DPP of \"{}\"?", chapter.name)),
    };

    let Some(body) = body else {
        let mut screen = Screen::new("Nothing to delete there anymore.");
        screen.push_row(back_row(&chapter));
        return Ok(screen);
    };

    let mut screen = Screen::new(body);
    screen.push_row(vec![
        Button::new("✅ Yes, delete", target.confirm_token()),
        Button::new(
            "❌ Cancel",
            format!("del:cancel:{}:{}", chapter.subject.code(), chapter.token()),
        ),
    ]);
    Ok(screen)
}

/// Phase two: re-resolve again immediately before mutating, execute, and
/// report what was removed
pub fn execute_screen(conn: &Connection, target: &DeleteTarget) -> AppResult<Screen> {
    let Some(chapter) = catalog::resolve_chapter(conn, target.subject(), target.chapter_token())? else {
        return Ok(stale_screen(target.subject()));
    };

    let report = match target {
        DeleteTarget::Chapter { .. } => {
            let summary = catalog::content_summary(conn, chapter.id)?;
            catalog::delete_chapter(conn, chapter.id)?;
            format!(
                "✅ Chapter \"{}\" deleted.\n\nRemoved:\n{}",
                chapter.name,
                summary_line(&summary)
            )
        }
        DeleteTarget::AllLectures { .. } => {
            let removed = catalog::delete_all_lectures(conn, chapter.id)?;
            format!("✅ Removed {} lecture(s) from \"{}\".", removed, chapter.name)
        }
        DeleteTarget::Lecture { lecture_no, .. } => {
            let removed = catalog::delete_content(conn, chapter.id, ContentType::Lecture, Some(lecture_no))?;
            if removed == 0 {
                format!("Lecture #{} of \"{}\" was already gone.", lecture_no, chapter.name)
            } else {
                format!("✅ Lecture #{} removed from \"{}\".", lecture_no, chapter.name)
            }
        }
        DeleteTarget::Notes { .. } => {
            let removed = catalog::delete_content(conn, chapter.id, ContentType::Notes, None)?;
            if removed == 0 {
                format!("\"{}\" had no notes anymore.", chapter.name)
            } else {
                format!("✅ Notes removed from \"{}\".", chapter.name)
            }
        }
        DeleteTarget::Dpp { .. } => {
            let removed = catalog::delete_content(conn, chapter.id, ContentType::Dpp, None)?;
            if removed == 0 {
                format!("\"{}\" had no DPP anymore.", chapter.name)
            } else {
                format!("✅ DPP removed from \"{}\".", chapter.name)
            }
        }
    };

    let mut screen = Screen::new(report);
    screen.push_row(vec![
        Button::new("🔙 Chapters", format!("adm:msubj:{}", chapter.subject.code())),
        Button::new("⚙️ Admin Panel", "adm:panel"),
    ]);
    Ok(screen)
}
