//! Admin panel and user-management screens
//!
//! Reached only through identity-gated actions; the router rejects
//! non-admin callers before any of these render.

use crate::core::error::AppResult;
use crate::core::types::Subject;
use crate::menu::screen::{Button, Screen};
use crate::storage::{catalog, registry};
use rusqlite::Connection;
use strum::IntoEnumIterator;

/// How many users the management screen lists at most
const USER_LIST_LIMIT: usize = 50;

/// The admin panel
pub fn panel_screen() -> Screen {
    let mut screen = Screen::new("⚙️ Admin Panel\n\nSelect an option:");
    screen.push_row(vec![Button::new("➕ Add Content", "adm:add")]);
    screen.push_row(vec![Button::new("🗂 Manage Chapters", "adm:manage")]);
    screen.push_row(vec![Button::new("👥 Manage Users", "adm:users")]);
    screen.push_row(vec![Button::new("📦 Export Catalog", "adm:export")]);
    screen.push_row(vec![Button::new("🚪 Exit Admin Mode", "adm:exit")]);
    screen
}

/// Subject picker for chapter management
pub fn manage_subjects_screen() -> Screen {
    let mut screen = Screen::new("🗂 Chapter Management\n\nSelect a subject:");
    for subject in Subject::iter() {
        screen.push_row(vec![Button::new(
            subject.label(),
            format!("adm:msubj:{}", subject.code()),
        )]);
    }
    screen.push_row(vec![Button::new("🔙 Back", "adm:panel")]);
    screen
}

/// Chapter picker for management/deletion within one subject
pub fn manage_chapters_screen(conn: &Connection, subject: Subject) -> AppResult<Screen> {
    let chapters = catalog::list_chapters(conn, subject)?;
    if chapters.is_empty() {
        let mut screen = Screen::new(format!("{}\n\n📭 No chapters yet.", subject.label()));
        screen.push_row(vec![Button::new("🔙 Back", "adm:manage")]);
        return Ok(screen);
    }

    let mut screen = Screen::new(format!("🗂 {} — Chapters\n\nSelect a chapter to manage:", subject.label()));
    for chapter in &chapters {
        screen.push_row(vec![Button::new(
            chapter.name.clone(),
            format!("del:menu:{}:{}", subject.code(), chapter.token()),
        )]);
    }
    screen.push_row(vec![Button::new("🔙 Back", "adm:manage")]);
    Ok(screen)
}

/// Registered-user overview
pub fn users_screen(conn: &Connection) -> AppResult<Screen> {
    let users = registry::all_users(conn)?;
    let blocked = users.iter().filter(|u| u.currently_blocked()).count();

    let mut screen = Screen::new(format!(
        "👥 User Management\n\nRegistered: {} · Blocked: {}\n\nSelect a user:",
        users.len(),
        blocked
    ));
    let mut row = Vec::new();
    for user in users.iter().take(USER_LIST_LIMIT) {
        let name = user
            .username
            .as_ref()
            .map(|u| format!("@{u}"))
            .or_else(|| user.first_name.clone())
            .unwrap_or_else(|| format!("ID:{}", user.telegram_id));
        let status = if user.currently_blocked() { "🚫" } else { "✅" };
        row.push(Button::new(
            format!("{status} {name}"),
            format!("adm:user:{}", user.telegram_id),
        ));
        if row.len() == 2 {
            screen.push_row(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        screen.push_row(row);
    }
    screen.push_row(vec![Button::new("🔙 Back", "adm:panel")]);
    Ok(screen)
}

/// One user's detail card with the block/unblock action
pub fn user_detail_screen(conn: &Connection, telegram_id: i64) -> AppResult<Screen> {
    let Some(user) = registry::get_user(conn, telegram_id)? else {
        let mut screen = Screen::new("🤷 That user is no longer registered.");
        screen.push_row(vec![Button::new("🔙 Back", "adm:users")]);
        return Ok(screen);
    };

    let status = if user.currently_blocked() {
        "🚫 Blocked"
    } else {
        "✅ Active"
    };
    let mut screen = Screen::new(format!(
        "👤 User Details\n\nName: {}\nUsername: {}\nID: {}\nStatus: {}\nWarnings: {}\nJoined: {}",
        user.first_name.as_deref().unwrap_or("—"),
        user.username.as_deref().map(|u| format!("@{u}")).unwrap_or_else(|| "—".to_string()),
        user.telegram_id,
        status,
        user.warnings,
        user.created_at
    ));
    if user.currently_blocked() {
        screen.push_row(vec![Button::new(
            "✅ Unblock User",
            format!("adm:unblock:{}", user.telegram_id),
        )]);
    } else {
        screen.push_row(vec![Button::new(
            "🚫 Block User",
            format!("adm:block:{}", user.telegram_id),
        )]);
    }
    screen.push_row(vec![Button::new("🔙 Back", "adm:users")]);
    Ok(screen)
}
