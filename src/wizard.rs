//! Admin ingestion wizard
//!
//! Multi-step state machine that walks the admin from subject to uploaded
//! file: subject → chapter (existing selection or free-text name) →
//! content type → lecture number (lectures only) → file → persisted.
//! Validation failures re-prompt the same step without discarding anything
//! already collected; "exit admin mode" clears the session from any step
//! with no store side effects. Every entry point re-verifies the caller
//! against the configured admin set.

use crate::core::error::AppResult;
use crate::core::types::{ContentType, NewContentEvent, Subject, UploadedFile};
use crate::core::validation::{self, ValidationError};
use crate::files::{self, FileStore};
use crate::menu::action::Action;
use crate::menu::screen::{Button, Screen};
use crate::notify::{self, Delivery};
use crate::session::{SessionStore, WizardStep};
use crate::storage::catalog;
use crate::storage::db::{self, DbPool};
use rusqlite::Connection;
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Denial screen for non-admin callers. Rendered before any session or
/// store access.
pub fn denied_screen() -> Screen {
    Screen::new("⛔ You are not authorized to perform this action.")
}

fn exit_row() -> Vec<Button> {
    vec![Button::new("🚪 Exit Admin Mode", "adm:exit")]
}

fn expired_screen() -> Screen {
    let mut screen = Screen::new("Your admin session expired. Start again from the panel.");
    screen.push_row(vec![Button::new("⚙️ Admin Panel", "adm:panel")]);
    screen
}

fn subject_step_screen() -> Screen {
    let mut screen = Screen::new("➕ Add Content\n\nSelect a subject:");
    for subject in Subject::iter() {
        screen.push_row(vec![Button::new(
            subject.label(),
            format!("adm:subj:{}", subject.code()),
        )]);
    }
    screen.push_row(exit_row());
    screen
}

fn chapter_step_screen(conn: &Connection, subject: Subject, note: Option<&str>) -> AppResult<Screen> {
    let chapters = catalog::list_chapters(conn, subject)?;
    let mut text = format!(
        "➕ Add Content — {}\n\nSelect an existing chapter or create a new one:",
        subject.label()
    );
    if let Some(note) = note {
        text = format!("{note}\n\n{text}");
    }

    let mut screen = Screen::new(text);
    for chapter in &chapters {
        screen.push_row(vec![Button::new(
            chapter.name.clone(),
            format!("adm:chap:{}:{}", subject.code(), chapter.token()),
        )]);
    }
    screen.push_row(vec![Button::new("➕ New chapter", "adm:newchap")]);
    screen.push_row(vec![Button::new("🔙 Back", "adm:add")]);
    screen.push_row(exit_row());
    Ok(screen)
}

/// Content-type step, with the chapter's existing contents surfaced so the
/// admin can see what an upload would overwrite
fn content_type_step_screen(conn: &Connection, subject: Subject, chapter_name: &str) -> AppResult<Screen> {
    let summary = match catalog::find_chapter(conn, subject, chapter_name)? {
        Some(chapter) => catalog::content_summary(conn, chapter.id)?,
        None => Default::default(),
    };

    let mut screen = Screen::new(format!(
        "➕ {} / {}\n\nWhat are you uploading?",
        subject.label(),
        chapter_name
    ));
    for ct in ContentType::iter() {
        let status = match ct {
            ContentType::Lecture => {
                if summary.lecture_numbers.is_empty() {
                    "—".to_string()
                } else {
                    format!("({})", summary.lecture_numbers.len())
                }
            }
            ContentType::Notes => if summary.has_notes { "✓" } else { "—" }.to_string(),
            ContentType::Dpp => if summary.has_dpp { "✓" } else { "—" }.to_string(),
        };
        screen.push_row(vec![Button::new(
            format!("{} {}", ct.label(), status),
            format!("adm:type:{}", ct.code()),
        )]);
    }
    screen.push_row(exit_row());
    Ok(screen)
}

fn lecture_number_prompt(suggestion: &str, note: Option<&str>) -> Screen {
    let mut text = format!(
        "🔢 Enter the lecture number.\n\nDigits with an optional decimal part and an optional trailing letter (3, 2.1, 4A). Suggested next: {suggestion}"
    );
    if let Some(note) = note {
        text = format!("{note}\n\n{text}");
    }
    let mut screen = Screen::new(text);
    screen.push_row(exit_row());
    screen
}

fn file_prompt(content_type: ContentType, lecture_no: Option<&str>, note: Option<&str>) -> Screen {
    let what = match (content_type, lecture_no) {
        (ContentType::Lecture, Some(no)) => format!("the video for 🎥 Lecture #{no}"),
        (ContentType::Lecture, None) => "the lecture video".to_string(),
        (ContentType::Notes, _) => "the 📝 notes PDF".to_string(),
        (ContentType::Dpp, _) => "the 📊 DPP PDF".to_string(),
    };
    let mut text = format!("📤 Now send {what}.");
    if let Some(note) = note {
        text = format!("{note}\n\n{text}");
    }
    let mut screen = Screen::new(text);
    screen.push_row(exit_row());
    screen
}

fn is_admin(admins: &[i64], caller: i64) -> bool {
    admins.contains(&caller)
}

/// Opens the wizard: fresh session, subject step
pub fn start(sessions: &SessionStore, admins: &[i64], caller: i64) -> Screen {
    if !is_admin(admins, caller) {
        return denied_screen();
    }
    sessions.begin(caller);
    subject_step_screen()
}

/// Clears the session unconditionally, from any step
pub fn exit(sessions: &SessionStore, admins: &[i64], caller: i64) -> Screen {
    if !is_admin(admins, caller) {
        return denied_screen();
    }
    sessions.clear(caller);
    let mut screen = Screen::new("🚪 Exited admin mode.");
    screen.push_row(vec![Button::new("🏠 Menu", "home")]);
    screen
}

/// Handles the wizard's button selections
pub fn handle_action(
    conn: &Connection,
    sessions: &SessionStore,
    admins: &[i64],
    caller: i64,
    action: &Action,
) -> AppResult<Screen> {
    if !is_admin(admins, caller) {
        return Ok(denied_screen());
    }

    match action {
        Action::AdminAddContent => Ok(start(sessions, admins, caller)),

        Action::AdminSelectSubject(subject) => {
            let mut session = sessions.get(caller).unwrap_or_else(|| sessions.begin(caller));
            session.subject = Some(*subject);
            session.chapter = None;
            session.step = WizardStep::AwaitingChapter;
            sessions.set(caller, session);
            chapter_step_screen(conn, *subject, None)
        }

        Action::AdminSelectChapter { subject, chapter_token } => {
            let Some(mut session) = sessions.get(caller) else {
                return Ok(expired_screen());
            };
            match catalog::resolve_chapter(conn, *subject, chapter_token)? {
                Some(chapter) => {
                    session.subject = Some(*subject);
                    session.chapter = Some(chapter.name.clone());
                    session.step = WizardStep::AwaitingContentType;
                    sessions.set(caller, session);
                    content_type_step_screen(conn, *subject, &chapter.name)
                }
                None => chapter_step_screen(conn, *subject, Some("🤷 That chapter no longer exists.")),
            }
        }

        Action::AdminNewChapter => {
            let Some(session) = sessions.get(caller) else {
                return Ok(expired_screen());
            };
            if session.subject.is_none() {
                return Ok(expired_screen());
            }
            let mut screen = Screen::new("✏️ Enter the name of the new chapter:");
            screen.push_row(exit_row());
            Ok(screen)
        }

        Action::AdminSelectContentType(content_type) => {
            let Some(mut session) = sessions.get(caller) else {
                return Ok(expired_screen());
            };
            let (Some(subject), Some(chapter)) = (session.subject, session.chapter.clone()) else {
                return Ok(expired_screen());
            };
            session.content_type = Some(*content_type);
            if content_type.is_multi_valued() {
                session.step = WizardStep::AwaitingLectureNumber;
                sessions.set(caller, session);
                let existing = match catalog::find_chapter(conn, subject, &chapter)? {
                    Some(row) => catalog::list_lecture_numbers(conn, row.id)?,
                    None => Vec::new(),
                };
                let suggestion = validation::suggest_next_lecture_number(&existing);
                Ok(lecture_number_prompt(&suggestion, None))
            } else {
                session.lecture_no = None;
                session.step = WizardStep::AwaitingFile;
                sessions.set(caller, session);
                Ok(file_prompt(*content_type, None, None))
            }
        }

        _ => Ok(expired_screen()),
    }
}

/// Handles free-text input: the new-chapter name and the lecture number
pub fn handle_text(
    conn: &Connection,
    sessions: &SessionStore,
    admins: &[i64],
    caller: i64,
    text: &str,
) -> AppResult<Screen> {
    if !is_admin(admins, caller) {
        return Ok(denied_screen());
    }
    let Some(mut session) = sessions.get(caller) else {
        return Ok(expired_screen());
    };

    match session.step {
        WizardStep::AwaitingChapter => {
            let Some(subject) = session.subject else {
                return Ok(expired_screen());
            };
            let name = match validation::validate_chapter_name(text) {
                Ok(name) => name,
                Err(e) => {
                    let note = format!("❌ {e}");
                    return chapter_step_screen(conn, subject, Some(&note));
                }
            };
            if let Some(existing) = catalog::name_conflicts(conn, subject, &name)? {
                let note = format!(
                    "❌ \"{}\" collides with the existing chapter \"{}\". Pick a different name.",
                    name, existing.name
                );
                return chapter_step_screen(conn, subject, Some(&note));
            }
            session.chapter = Some(name.clone());
            session.step = WizardStep::AwaitingContentType;
            sessions.set(caller, session);
            content_type_step_screen(conn, subject, &name)
        }

        WizardStep::AwaitingLectureNumber => match validation::validate_lecture_number(text) {
            Ok(no) => {
                session.lecture_no = Some(no.clone());
                session.step = WizardStep::AwaitingFile;
                let content_type = session.content_type;
                sessions.set(caller, session);
                Ok(file_prompt(
                    content_type.unwrap_or(ContentType::Lecture),
                    Some(&no),
                    None,
                ))
            }
            Err(e @ ValidationError::BadLectureNumber(_)) => {
                let existing = match (session.subject, &session.chapter) {
                    (Some(subject), Some(chapter)) => match catalog::find_chapter(conn, subject, chapter)? {
                        Some(row) => catalog::list_lecture_numbers(conn, row.id)?,
                        None => Vec::new(),
                    },
                    _ => Vec::new(),
                };
                let suggestion = validation::suggest_next_lecture_number(&existing);
                let note = format!("❌ {e}");
                Ok(lecture_number_prompt(&suggestion, Some(&note)))
            }
            Err(e) => Ok(lecture_number_prompt("1", Some(&format!("❌ {e}")))),
        },

        WizardStep::AwaitingFile => {
            let content_type = session.content_type.unwrap_or(ContentType::Lecture);
            Ok(file_prompt(
                content_type,
                session.lecture_no.as_deref(),
                Some("That was text - I need a file."),
            ))
        }

        WizardStep::AwaitingSubject | WizardStep::AwaitingContentType => {
            Ok(expired_note_for_buttons())
        }
    }
}

fn expired_note_for_buttons() -> Screen {
    let mut screen = Screen::new("Please use the buttons for this step.");
    screen.push_row(vec![Button::new("⚙️ Admin Panel", "adm:panel")]);
    screen
}

/// Handles the uploaded file: validates its kind against the expected
/// content type, persists, fires the broadcast without blocking, and
/// resets the session for the next upload into the same chapter.
pub async fn handle_upload(
    pool: &Arc<DbPool>,
    sessions: &SessionStore,
    delivery: &Arc<dyn Delivery>,
    file_store: Option<&Arc<dyn FileStore>>,
    admins: &[i64],
    caller: i64,
    upload: UploadedFile,
) -> AppResult<Screen> {
    if !is_admin(admins, caller) {
        return Ok(denied_screen());
    }
    let Some(mut session) = sessions.get(caller) else {
        return Ok(expired_screen());
    };
    if session.step != WizardStep::AwaitingFile {
        let mut screen = Screen::new("I wasn't expecting a file right now. Use the buttons to continue.");
        screen.push_row(vec![Button::new("⚙️ Admin Panel", "adm:panel")]);
        return Ok(screen);
    }
    let (Some(subject), Some(chapter), Some(content_type)) =
        (session.subject, session.chapter.clone(), session.content_type)
    else {
        sessions.clear(caller);
        return Ok(expired_screen());
    };

    // Kind check: lecture ⇒ video, notes/dpp ⇒ PDF document. A mismatch
    // re-prompts and keeps the collected state.
    if upload.kind != content_type.expected_kind() {
        let note = format!("❌ Wrong file kind for {}.", content_type.label());
        return Ok(file_prompt(content_type, session.lecture_no.as_deref(), Some(&note)));
    }
    if content_type.expected_kind() == crate::core::types::UploadKind::Document && !upload.looks_like_pdf() {
        return Ok(file_prompt(
            content_type,
            session.lecture_no.as_deref(),
            Some("❌ Please send a PDF file."),
        ));
    }

    // Populate the path fallback arm when the host wired up a file store.
    // Best-effort: the platform handle alone is still a valid reference.
    let mut reference = upload.reference.clone();
    if let Some(store) = file_store {
        if reference.path.is_none() {
            match files::archive_upload(
                store.as_ref(),
                &upload,
                subject,
                &chapter,
                content_type,
                session.lecture_no.as_deref(),
            )
            .await
            {
                Ok(archived) => reference.path = archived.path,
                Err(e) => log::warn!("Failed to archive upload locally: {}", e),
            }
        }
    }

    let lecture_no = session.lecture_no.clone();
    let conn = db::get_connection(pool)?;
    catalog::put_content(
        &conn,
        subject,
        &chapter,
        content_type,
        lecture_no.as_deref(),
        &reference,
    )?;

    // Fan-out runs detached: a slow or failing broadcast must never roll
    // back or delay the persisted upload.
    let event = NewContentEvent {
        subject,
        chapter: chapter.clone(),
        content_type,
        lecture_no: lecture_no.clone(),
    };
    let pool_bg = Arc::clone(pool);
    let delivery_bg = Arc::clone(delivery);
    tokio::spawn(async move {
        let delivered = notify::broadcast(delivery_bg.as_ref(), &pool_bg, &event).await;
        let summary = format!("📣 Notified {delivered} user(s) about the new upload.");
        if let Err(e) = delivery_bg.deliver(caller, &summary).await {
            log::warn!("Failed to send broadcast summary to admin {}: {}", caller, e);
        }
    });

    session.reset_for_next_upload();
    sessions.set(caller, session);

    let what = match &lecture_no {
        Some(no) => format!("{} #{}", content_type.label(), no),
        None => content_type.label().to_string(),
    };
    let mut screen = content_type_step_screen(&conn, subject, &chapter)?;
    screen.text = format!("✅ {} added to \"{}\"!\n\n{}", what, chapter, screen.text);
    Ok(screen)
}
