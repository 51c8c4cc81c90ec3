//! Catalog store behavior over a real SQLite file

mod common;

use common::TestContext;
use pretty_assertions::assert_eq;
use studyrack::core::token;
use studyrack::core::types::{ContentType, FileReference, Subject};
use studyrack::storage::catalog;

#[tokio::test]
async fn chapter_tokens_resolve_back_to_their_chapter() {
    let ctx = TestContext::new();
    let conn = ctx.conn();

    let names = [
        "Motion",
        "Laws of Motion",
        "Unit-3: Algebra",
        "किरण प्रकाशिकी",
        "A Very Long Chapter Name About Electromagnetic Induction",
    ];
    for name in names {
        catalog::put_content(
            &conn,
            Subject::Physics,
            name,
            ContentType::Notes,
            None,
            &FileReference::from_file_id("f"),
        )
        .unwrap();
    }

    for name in names {
        let tok = token::encode(name);
        let resolved = catalog::resolve_chapter(&conn, Subject::Physics, &tok).unwrap();
        assert_eq!(resolved.map(|c| c.name), Some(name.to_string()), "failed for {}", name);
    }
}

#[tokio::test]
async fn upload_twice_keeps_exactly_one_entry() {
    let ctx = TestContext::new();
    let conn = ctx.conn();

    for file_id in ["v1", "v2"] {
        catalog::put_content(
            &conn,
            Subject::Maths,
            "Algebra",
            ContentType::Lecture,
            Some("1"),
            &FileReference::from_file_id(file_id),
        )
        .unwrap();
    }

    let chapter = catalog::find_chapter(&conn, Subject::Maths, "Algebra").unwrap().unwrap();
    assert_eq!(catalog::list_lecture_numbers(&conn, chapter.id).unwrap(), vec!["1"]);
    assert_eq!(
        catalog::get_content(&conn, chapter.id, ContentType::Lecture, Some("1")).unwrap(),
        Some(FileReference::from_file_id("v2"))
    );
}

#[tokio::test]
async fn lecture_lifecycle_matches_the_expected_scenario() {
    // Upload lectures 1 and 2 to physics/Motion, list, delete 1, then 2;
    // the chapter survives while notes exist and goes away with them.
    let ctx = TestContext::new();
    let conn = ctx.conn();

    catalog::put_content(
        &conn,
        Subject::Physics,
        "Motion",
        ContentType::Lecture,
        Some("1"),
        &FileReference::from_file_id("v1"),
    )
    .unwrap();
    catalog::put_content(
        &conn,
        Subject::Physics,
        "Motion",
        ContentType::Lecture,
        Some("2"),
        &FileReference::from_file_id("v2"),
    )
    .unwrap();
    catalog::put_content(
        &conn,
        Subject::Physics,
        "Motion",
        ContentType::Notes,
        None,
        &FileReference::from_file_id("n1"),
    )
    .unwrap();

    let chapter = catalog::find_chapter(&conn, Subject::Physics, "Motion").unwrap().unwrap();
    assert_eq!(catalog::list_lecture_numbers(&conn, chapter.id).unwrap(), vec!["1", "2"]);

    catalog::delete_content(&conn, chapter.id, ContentType::Lecture, Some("1")).unwrap();
    assert_eq!(catalog::list_lecture_numbers(&conn, chapter.id).unwrap(), vec!["2"]);

    catalog::delete_content(&conn, chapter.id, ContentType::Lecture, Some("2")).unwrap();
    // Notes remain, so the chapter does too
    assert!(catalog::find_chapter(&conn, Subject::Physics, "Motion").unwrap().is_some());
    let summary = catalog::content_summary(&conn, chapter.id).unwrap();
    assert!(summary.lecture_numbers.is_empty());
    assert!(summary.has_notes);

    catalog::delete_content(&conn, chapter.id, ContentType::Notes, None).unwrap();
    // Nothing left - the chapter is pruned
    assert!(catalog::find_chapter(&conn, Subject::Physics, "Motion").unwrap().is_none());
}

#[tokio::test]
async fn lecture_numbers_come_back_in_numeric_aware_order() {
    let ctx = TestContext::new();
    let conn = ctx.conn();

    for no in ["10", "2", "3A", "1"] {
        catalog::put_content(
            &conn,
            Subject::Physics,
            "Motion",
            ContentType::Lecture,
            Some(no),
            &FileReference::from_file_id("v"),
        )
        .unwrap();
    }

    let chapter = catalog::find_chapter(&conn, Subject::Physics, "Motion").unwrap().unwrap();
    assert_eq!(
        catalog::list_lecture_numbers(&conn, chapter.id).unwrap(),
        vec!["1", "2", "10", "3A"]
    );
}

#[tokio::test]
async fn deleting_a_chapter_cascades_and_unresolves_its_token() {
    let ctx = TestContext::new();
    let conn = ctx.conn();

    let chapter = catalog::put_content(
        &conn,
        Subject::Chemistry,
        "Atomic Structure",
        ContentType::Lecture,
        Some("1"),
        &FileReference::from_file_id("v1"),
    )
    .unwrap();
    catalog::put_content(
        &conn,
        Subject::Chemistry,
        "Atomic Structure",
        ContentType::Dpp,
        None,
        &FileReference::from_file_id("d1"),
    )
    .unwrap();

    let tok = chapter.token();
    catalog::delete_chapter(&conn, chapter.id).unwrap();

    assert!(catalog::resolve_chapter(&conn, Subject::Chemistry, &tok).unwrap().is_none());
    assert!(catalog::list_chapters(&conn, Subject::Chemistry).unwrap().is_empty());
}
