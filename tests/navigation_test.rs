//! Navigation engine behavior through the router

mod common;

use common::{pdf_upload, video_upload, walk_wizard_to_type, TestContext, ADMIN_ID};
use pretty_assertions::assert_eq;
use studyrack::core::token;
use studyrack::core::types::UploadKind;

const USER: i64 = 42;

#[tokio::test]
async fn start_shows_the_subject_list_without_admin_button() {
    let ctx = TestContext::new();
    let screen = ctx.select(USER, "home").await;

    let tokens = screen.tokens().iter().map(|t| t.to_string()).collect::<Vec<_>>();
    assert!(tokens.contains(&"subj:physics".to_string()));
    assert!(tokens.contains(&"subj:biology".to_string()));
    assert!(!tokens.contains(&"adm:panel".to_string()));

    let screen = ctx.select(ADMIN_ID, "home").await;
    assert!(screen.tokens().contains(&"adm:panel"));
}

#[tokio::test]
async fn empty_subject_renders_the_no_content_leaf_not_an_empty_list() {
    let ctx = TestContext::new();
    let screen = ctx.select(USER, "subj:english").await;

    assert!(screen.text.contains("No chapters are available yet"));
    // The only selectable action is the way back - no empty chapter list
    assert_eq!(screen.tokens(), vec!["back:subjects"]);
}

#[tokio::test]
async fn browse_walks_down_to_a_delivered_lecture() {
    let ctx = TestContext::new();
    walk_wizard_to_type(&ctx, "adm:subj:physics", "Motion", "adm:type:lecture").await;
    ctx.text(ADMIN_ID, "1").await;
    ctx.upload(ADMIN_ID, video_upload("vid-1")).await;

    let chapters = ctx.select(USER, "subj:physics").await;
    let tok = token::encode("Motion");
    let chapter_token = format!("chap:physics:{tok}");
    assert!(chapters.tokens().contains(&chapter_token.as_str()));

    let types = ctx.select(USER, &chapter_token).await;
    let lecture_list_token = format!("type:physics:{tok}:lecture");
    assert!(types.tokens().contains(&lecture_list_token.as_str()));

    let lectures = ctx.select(USER, &lecture_list_token).await;
    let lecture_token = format!("lec:physics:{tok}:1");
    assert!(lectures.tokens().contains(&lecture_token.as_str()));

    let delivered = ctx.select(USER, &lecture_token).await;
    let attachment = delivered.attachment.as_ref().expect("lecture should be delivered");
    assert_eq!(attachment.kind, UploadKind::Video);
    assert_eq!(attachment.reference.file_id.as_deref(), Some("vid-1"));
    assert!(attachment.caption.contains("#1"));
    assert!(attachment.caption.contains("Motion"));

    // Delivery always re-offers navigation
    assert!(!delivered.buttons.is_empty());
    assert!(delivered.tokens().contains(&"back:subjects"));
}

#[tokio::test]
async fn missing_content_reoffers_the_sibling_content_types() {
    let ctx = TestContext::new();
    walk_wizard_to_type(&ctx, "adm:subj:physics", "Motion", "adm:type:lecture").await;
    ctx.text(ADMIN_ID, "1").await;
    ctx.upload(ADMIN_ID, video_upload("vid-1")).await;

    let tok = token::encode("Motion");
    let screen = ctx.select(USER, &format!("type:physics:{tok}:notes")).await;

    assert!(screen.attachment.is_none());
    assert!(screen.text.contains("yet"));
    // All three content types are offered again
    for ct in ["lecture", "notes", "dpp"] {
        let expected = format!("type:physics:{tok}:{ct}");
        assert!(
            screen.tokens().contains(&expected.as_str()),
            "missing sibling offer {}",
            expected
        );
    }
}

#[tokio::test]
async fn back_tokens_rebuild_the_parent_screen_from_their_own_context() {
    let ctx = TestContext::new();
    walk_wizard_to_type(&ctx, "adm:subj:physics", "Motion", "adm:type:notes").await;
    ctx.upload(ADMIN_ID, pdf_upload("pdf-1")).await;

    let tok = token::encode("Motion");
    let forward = ctx.select(USER, &format!("chap:physics:{tok}")).await;
    let back = ctx.select(USER, "back:chapters:physics").await;
    let forward_again = ctx.select(USER, "subj:physics").await;

    // The back transition lands on the same chapter list it descended from
    assert_eq!(back, forward_again);
    assert!(forward.text.contains("Motion"));
}

#[tokio::test]
async fn malformed_and_stale_tokens_degrade_to_not_found() {
    let ctx = TestContext::new();

    for bad in ["???", "subj:history", "chap:physics:doesnotexist", "lec:physics:x:99"] {
        let screen = ctx.select(USER, bad).await;
        assert!(
            screen.tokens().contains(&"subj:physics"),
            "screen for {:?} should re-enter the subject list",
            bad
        );
    }
}
