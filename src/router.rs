//! Inbound event dispatch
//!
//! The single entry point the host transport calls for every inbound
//! event. Routing order mirrors the control flow of the whole system:
//! free text and uploads go to the ingestion wizard while the admin is
//! mid-flow, everything else is parsed once into a tagged [`Action`] and
//! dispatched - admin actions behind the identity gate, deletions through
//! the confirmation workflow, the rest to the navigation engine. Every
//! path ends in a [`Screen`]; persistence failures are logged and rendered
//! as an explicit failure message, never propagated to the caller.

use crate::core::config;
use crate::core::types::UploadedFile;
use crate::files::FileStore;
use crate::menu::action::{self, Action};
use crate::menu::screen::{Button, Screen};
use crate::menu::{admin as admin_menu, browse, deletion};
use crate::notify::Delivery;
use crate::session::SessionStore;
use crate::storage::db::{self, DbPool};
use crate::storage::{backup, catalog, registry};
use crate::wizard;
use std::path::Path;
use std::sync::Arc;

/// What kind of inbound event the transport received
#[derive(Debug, Clone)]
pub enum EventKind {
    /// The user pressed a button; the token is echoed back verbatim
    Select(String),
    /// A free-form text message
    Text(String),
    /// A file upload
    Upload(UploadedFile),
}

/// One inbound event, as handed over by the transport
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub from: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub kind: EventKind,
}

/// The event dispatcher. One per process; cheap to clone behind `Arc`s.
pub struct Router {
    pool: Arc<DbPool>,
    sessions: Arc<SessionStore>,
    delivery: Arc<dyn Delivery>,
    file_store: Option<Arc<dyn FileStore>>,
    admin_ids: Vec<i64>,
}

impl Router {
    /// Builds a router with the admin set from the environment
    pub fn new(pool: Arc<DbPool>, delivery: Arc<dyn Delivery>) -> Self {
        Self::with_admins(pool, delivery, config::admin::ADMIN_IDS.clone())
    }

    /// Builds a router with an explicit admin set (embedding, tests)
    pub fn with_admins(pool: Arc<DbPool>, delivery: Arc<dyn Delivery>, admin_ids: Vec<i64>) -> Self {
        Router {
            pool,
            sessions: Arc::new(SessionStore::new()),
            delivery,
            file_store: None,
            admin_ids,
        }
    }

    /// Plugs in a file store so accepted uploads get a path fallback arm
    pub fn with_file_store(mut self, file_store: Arc<dyn FileStore>) -> Self {
        self.file_store = Some(file_store);
        self
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Handles one inbound event and returns the next screen. Total:
    /// internal failures render a failure screen instead of escaping.
    pub async fn handle_event(&self, event: InboundEvent) -> Screen {
        let caller = event.from;
        let admin = self.is_admin(caller);
        match self.dispatch(event).await {
            Ok(screen) => screen,
            Err(e) => {
                log::error!("Failed to handle event from {}: {}", caller, e);
                failure_screen(admin)
            }
        }
    }

    async fn dispatch(&self, event: InboundEvent) -> crate::core::error::AppResult<Screen> {
        let caller = event.from;
        let admin = self.is_admin(caller);
        let conn = db::get_connection(&self.pool)?;

        let user = registry::ensure_user(&conn, caller, event.username.as_deref(), event.first_name.as_deref())?;
        if !admin && user.currently_blocked() {
            return Ok(Screen::new("🚫 You are currently blocked. Please try again later."));
        }

        match event.kind {
            EventKind::Text(text) => {
                if admin && self.sessions.is_active(caller) {
                    return wizard::handle_text(&conn, &self.sessions, &self.admin_ids, caller, &text);
                }
                if admin {
                    let mut screen = Screen::new("Please use the buttons, or open the admin panel.");
                    screen.push_row(vec![
                        Button::new("⚙️ Admin Panel", "adm:panel"),
                        Button::new("🏠 Menu", "home"),
                    ]);
                    return Ok(screen);
                }
                Ok(warn_for_free_text(&conn, caller)?)
            }

            EventKind::Upload(upload) => {
                if admin && self.sessions.is_active(caller) {
                    drop(conn);
                    return wizard::handle_upload(
                        &self.pool,
                        &self.sessions,
                        &self.delivery,
                        self.file_store.as_ref(),
                        &self.admin_ids,
                        caller,
                        upload,
                    )
                    .await;
                }
                if admin {
                    let mut screen = Screen::new("Start \"Add Content\" from the admin panel before sending files.");
                    screen.push_row(vec![Button::new("⚙️ Admin Panel", "adm:panel")]);
                    return Ok(screen);
                }
                Ok(warn_for_free_text(&conn, caller)?)
            }

            EventKind::Select(token) => {
                let parsed = action::parse(&token);
                self.dispatch_action(&conn, caller, admin, parsed)
            }
        }
    }

    fn dispatch_action(
        &self,
        conn: &db::DbConnection,
        caller: i64,
        admin: bool,
        parsed: Action,
    ) -> crate::core::error::AppResult<Screen> {
        match &parsed {
            // ---- Browse (everyone) ----
            Action::Start | Action::BackToSubjects => Ok(browse::subject_list_screen(admin)),
            Action::Help => Ok(browse::help_screen()),
            Action::SelectSubject(subject) | Action::BackToChapters(subject) => {
                browse::chapter_list_screen(conn, *subject)
            }
            Action::SelectChapter { subject, chapter_token }
            | Action::BackToContentTypes { subject, chapter_token } => {
                match catalog::resolve_chapter(conn, *subject, chapter_token)? {
                    Some(chapter) => Ok(browse::content_type_screen(&chapter)),
                    None => Ok(browse::not_found_screen()),
                }
            }
            Action::SelectContentType {
                subject,
                chapter_token,
                content_type,
            } => match catalog::resolve_chapter(conn, *subject, chapter_token)? {
                Some(chapter) => {
                    if content_type.is_multi_valued() {
                        browse::lecture_list_screen(conn, &chapter)
                    } else {
                        browse::deliver_screen(conn, &chapter, *content_type, None)
                    }
                }
                None => Ok(browse::not_found_screen()),
            },
            Action::SelectLecture {
                subject,
                chapter_token,
                lecture_no,
            } => match catalog::resolve_chapter(conn, *subject, chapter_token)? {
                Some(chapter) => browse::deliver_screen(
                    conn,
                    &chapter,
                    crate::core::types::ContentType::Lecture,
                    Some(lecture_no.as_str()),
                ),
                None => Ok(browse::not_found_screen()),
            },

            // ---- Admin panel and wizard (identity-gated) ----
            Action::AdminPanel
            | Action::AdminAddContent
            | Action::AdminSelectSubject(_)
            | Action::AdminSelectChapter { .. }
            | Action::AdminNewChapter
            | Action::AdminSelectContentType(_)
            | Action::AdminManageChapters
            | Action::AdminManageSubject(_)
            | Action::AdminUsers
            | Action::AdminUserDetail(_)
            | Action::AdminBlockUser(_)
            | Action::AdminUnblockUser(_)
            | Action::AdminExport
            | Action::AdminExit
            | Action::DeleteMenu { .. }
            | Action::DeleteLecturePick { .. }
            | Action::ProposeDelete(_)
            | Action::ConfirmDelete(_)
            | Action::CancelDelete { .. }
                if !admin =>
            {
                log::warn!("Non-admin {} attempted admin action", caller);
                Ok(wizard::denied_screen())
            }

            Action::AdminPanel => Ok(admin_menu::panel_screen()),
            Action::AdminAddContent
            | Action::AdminSelectSubject(_)
            | Action::AdminSelectChapter { .. }
            | Action::AdminNewChapter
            | Action::AdminSelectContentType(_) => {
                wizard::handle_action(conn, &self.sessions, &self.admin_ids, caller, &parsed)
            }
            Action::AdminManageChapters => Ok(admin_menu::manage_subjects_screen()),
            Action::AdminManageSubject(subject) => admin_menu::manage_chapters_screen(conn, *subject),
            Action::AdminUsers => admin_menu::users_screen(conn),
            Action::AdminUserDetail(id) => admin_menu::user_detail_screen(conn, *id),
            Action::AdminBlockUser(id) => {
                registry::block_user(conn, *id)?;
                admin_menu::user_detail_screen(conn, *id)
            }
            Action::AdminUnblockUser(id) => {
                registry::unblock_user(conn, *id)?;
                admin_menu::user_detail_screen(conn, *id)
            }
            Action::AdminExport => {
                let path = backup::export_snapshot(conn, Path::new(config::BACKUP_DIR.as_str()))?;
                let mut screen = Screen::new(format!("📦 Catalog exported to {}", path.display()));
                screen.push_row(vec![Button::new("⚙️ Admin Panel", "adm:panel")]);
                Ok(screen)
            }
            Action::AdminExit => Ok(wizard::exit(&self.sessions, &self.admin_ids, caller)),

            // ---- Deletion workflow (identity-gated above) ----
            Action::DeleteMenu { subject, chapter_token } => deletion::menu_screen(conn, *subject, chapter_token),
            Action::DeleteLecturePick { subject, chapter_token } => {
                deletion::pick_screen(conn, *subject, chapter_token)
            }
            Action::ProposeDelete(target) => deletion::propose_screen(conn, target),
            Action::ConfirmDelete(target) => deletion::execute_screen(conn, target),
            Action::CancelDelete { subject, chapter_token } => deletion::menu_screen(conn, *subject, chapter_token),

            Action::Unknown(token) => {
                log::debug!("Unknown action token from {}: {}", caller, token);
                Ok(browse::not_found_screen())
            }
        }
    }
}

/// Non-admin free text outside any expected input: warn, and block at the
/// limit
fn warn_for_free_text(conn: &db::DbConnection, caller: i64) -> rusqlite::Result<Screen> {
    let warnings = registry::add_warning(conn, caller)?;
    let max = config::moderation::MAX_WARNINGS;
    if warnings >= max {
        return Ok(Screen::new(
            "🚫 You have been blocked for 24 hours due to repeated messages. You will be unblocked automatically.",
        ));
    }
    let mut screen = Screen::new(format!(
        "⚠️ Warning {warnings}/{max}\nPlease use the menu buttons only. {} warning(s) remaining before a block.",
        max - warnings
    ));
    screen.push_row(vec![Button::new("🏠 Menu", "home")]);
    Ok(screen)
}

fn failure_screen(admin: bool) -> Screen {
    if admin {
        let mut screen = Screen::new("❌ The operation failed and nothing was changed. Please try again.");
        screen.push_row(vec![Button::new("⚙️ Admin Panel", "adm:panel")]);
        screen
    } else {
        let mut screen = Screen::new("Something went wrong. Please try again.");
        screen.push_row(vec![Button::new("🏠 Menu", "home")]);
        screen
    }
}
