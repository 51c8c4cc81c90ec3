//! Navigation engine
//!
//! A pure read path over the catalog: each function renders one screen of
//! the browse hierarchy. Back buttons carry the full parent context in
//! their own token, so every transition is reconstructible without any
//! client-side session. Nothing here mutates the store and nothing here is
//! fatal: missing chapters and absent content render recovery screens.

use crate::core::error::AppResult;
use crate::core::types::{ContentType, Subject};
use crate::menu::screen::{Attachment, Button, Screen};
use crate::storage::catalog::{self, Chapter};
use indoc::indoc;
use rusqlite::Connection;
use strum::IntoEnumIterator;

/// Entry screen: the subject list. Admins additionally see the panel
/// button.
pub fn subject_list_screen(is_admin: bool) -> Screen {
    let mut screen = Screen::new(indoc! {"
        📚 Study Library

        Video lectures, notes and daily practice problems, organized by
        subject and chapter. Pick a subject to start browsing.
    "});
    for subject in Subject::iter() {
        screen.push_row(vec![Button::new(subject.label(), format!("subj:{}", subject.code()))]);
    }
    screen.push_row(vec![Button::new("ℹ️ Help", "help")]);
    if is_admin {
        screen.push_row(vec![Button::new("⚙️ Admin Panel", "adm:panel")]);
    }
    screen
}

/// How to use the bot
pub fn help_screen() -> Screen {
    let mut screen = Screen::new(indoc! {"
        ℹ️ How this works

        1. Pick a subject
        2. Pick a chapter
        3. Choose a content type:
           🎥 Lecture - video explanations
           📝 Notes - detailed PDF notes
           📊 DPP - daily practice problems
        4. For lectures, pick the lecture number

        Please use the buttons - free-form messages are ignored and
        repeated ones can get you blocked for a day.
    "});
    screen.push_row(vec![Button::new("🔙 Back", "back:subjects")]);
    screen
}

/// A subject's chapter list, or the explicit "nothing here yet" leaf when
/// the subject has no chapters
pub fn chapter_list_screen(conn: &Connection, subject: Subject) -> AppResult<Screen> {
    let chapters = catalog::list_chapters(conn, subject)?;
    if chapters.is_empty() {
        let mut screen = Screen::new(format!(
            "{}\n\n📭 No chapters are available yet. Please check back later.",
            subject.label()
        ));
        screen.push_row(vec![Button::new("🔙 Back", "back:subjects")]);
        return Ok(screen);
    }

    let mut screen = Screen::new(format!("{}\n\nSelect a chapter:", subject.label()));
    for chapter in &chapters {
        screen.push_row(vec![Button::new(
            chapter.name.clone(),
            format!("chap:{}:{}", subject.code(), chapter.token()),
        )]);
    }
    screen.push_row(vec![Button::new("🔙 Back", "back:subjects")]);
    Ok(screen)
}

fn content_type_row(chapter: &Chapter) -> Vec<Button> {
    ContentType::iter()
        .map(|ct| {
            Button::new(
                ct.label(),
                format!("type:{}:{}:{}", chapter.subject.code(), chapter.token(), ct.code()),
            )
        })
        .collect()
}

/// A chapter's content-type choices
pub fn content_type_screen(chapter: &Chapter) -> Screen {
    let mut screen = Screen::new(format!("📖 {}\n\nChoose a content type:", chapter.name));
    for button in content_type_row(chapter) {
        screen.push_row(vec![button]);
    }
    screen.push_row(vec![Button::new(
        "🔙 Back",
        format!("back:chapters:{}", chapter.subject.code()),
    )]);
    screen
}

/// A chapter's lecture numbers, or the not-available screen when no
/// lecture was uploaded yet
pub fn lecture_list_screen(conn: &Connection, chapter: &Chapter) -> AppResult<Screen> {
    let numbers = catalog::list_lecture_numbers(conn, chapter.id)?;
    if numbers.is_empty() {
        return Ok(not_available_screen(chapter, ContentType::Lecture));
    }

    let mut screen = Screen::new(format!("📖 {}\n\nPick a lecture:", chapter.name));
    for chunk in numbers.chunks(4) {
        screen.push_row(
            chunk
                .iter()
                .map(|no| {
                    Button::new(
                        format!("🎥 #{no}"),
                        format!("lec:{}:{}:{}", chapter.subject.code(), chapter.token(), no),
                    )
                })
                .collect(),
        );
    }
    screen.push_row(vec![Button::new(
        "🔙 Back",
        format!("back:types:{}:{}", chapter.subject.code(), chapter.token()),
    )]);
    Ok(screen)
}

/// Delivers the file stored at a content path, or the not-available screen
/// when nothing is stored there. A delivery always comes with follow-up
/// navigation - the user is never left without buttons.
pub fn deliver_screen(
    conn: &Connection,
    chapter: &Chapter,
    content_type: ContentType,
    lecture_no: Option<&str>,
) -> AppResult<Screen> {
    let Some(reference) = catalog::get_content(conn, chapter.id, content_type, lecture_no)? else {
        return Ok(not_available_screen(chapter, content_type));
    };

    let caption = match lecture_no {
        Some(no) => format!("{} #{} — {}", content_type.label(), no, chapter.name),
        None => format!("{} — {}", content_type.label(), chapter.name),
    };
    let mut screen = Screen::new("Here you go! Anything else from this chapter?");
    screen.attachment = Some(Attachment {
        reference,
        kind: content_type.expected_kind(),
        caption,
    });
    screen.push_row(content_type_row(chapter));
    screen.push_row(vec![
        Button::new("🔙 Chapters", format!("back:chapters:{}", chapter.subject.code())),
        Button::new("🏠 Subjects", "back:subjects"),
    ]);
    Ok(screen)
}

/// "Not available" recovery screen: re-offers the sibling content-type
/// choices instead of dead-ending
pub fn not_available_screen(chapter: &Chapter, content_type: ContentType) -> Screen {
    let mut screen = Screen::new(format!(
        "😕 No {} uploaded for \"{}\" yet.\n\nTry another content type:",
        content_type.label(),
        chapter.name
    ));
    screen.push_row(content_type_row(chapter));
    screen.push_row(vec![Button::new(
        "🔙 Back",
        format!("back:chapters:{}", chapter.subject.code()),
    )]);
    screen
}

/// Terminal-per-request recovery screen for malformed or stale tokens.
/// Re-enters the hierarchy at the subject list - never a trap state.
pub fn not_found_screen() -> Screen {
    let mut screen = Screen::new("🤷 That item isn't available anymore.\n\nPick a subject:");
    for subject in Subject::iter() {
        screen.push_row(vec![Button::new(subject.label(), format!("subj:{}", subject.code()))]);
    }
    screen
}
