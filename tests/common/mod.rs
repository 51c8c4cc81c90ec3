//! Shared fixtures for the integration suites
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use studyrack::core::types::{FileReference, UploadKind, UploadedFile};
use studyrack::files::{FileStore, FileStoreError};
use studyrack::notify::{Delivery, DeliveryError};
use studyrack::storage::{create_pool, get_connection, DbConnection, DbPool};
use studyrack::{EventKind, InboundEvent, Router, Screen};
use tempfile::TempDir;

/// The one configured admin identity in every test
pub const ADMIN_ID: i64 = 9000;

/// Records every delivery; recipients can be marked permanently or
/// transiently failing.
#[derive(Default)]
pub struct MockDelivery {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub permanently_failing: Mutex<HashSet<i64>>,
    pub transiently_failing: Mutex<HashSet<i64>>,
}

impl MockDelivery {
    pub fn fail_permanently(&self, recipient: i64) {
        self.permanently_failing.lock().unwrap().insert(recipient);
    }

    pub fn fail_transiently(&self, recipient: i64) {
        self.transiently_failing.lock().unwrap().insert(recipient);
    }

    pub fn sent_to(&self, recipient: i64) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == recipient)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Delivery for MockDelivery {
    async fn deliver(&self, recipient: i64, text: &str) -> Result<(), DeliveryError> {
        if self.permanently_failing.lock().unwrap().contains(&recipient) {
            return Err(DeliveryError::Blocked);
        }
        if self.transiently_failing.lock().unwrap().contains(&recipient) {
            return Err(DeliveryError::Transient("timed out".to_string()));
        }
        self.sent.lock().unwrap().push((recipient, text.to_string()));
        Ok(())
    }
}

/// In-memory file store: `fetch` hands back the platform handle as bytes,
/// `store` records the suggested name and mints a path reference.
#[derive(Default)]
pub struct MockFileStore {
    pub stored: Mutex<Vec<String>>,
}

#[async_trait]
impl FileStore for MockFileStore {
    async fn fetch(&self, reference: &FileReference) -> Result<Vec<u8>, FileStoreError> {
        match &reference.file_id {
            Some(id) => Ok(id.clone().into_bytes()),
            None => Err(FileStoreError::NotFound),
        }
    }

    async fn store(&self, _payload: Vec<u8>, suggested_name: &str) -> Result<FileReference, FileStoreError> {
        self.stored.lock().unwrap().push(suggested_name.to_string());
        Ok(FileReference::from_path(format!("storage/{suggested_name}")))
    }
}

/// A fresh SQLite-backed router with one admin and a recording delivery
pub struct TestContext {
    pub pool: Arc<DbPool>,
    pub router: Router,
    pub delivery: Arc<MockDelivery>,
    pub files: Arc<MockFileStore>,
    _dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::build(false)
    }

    /// A context whose router archives uploads through the mock file store
    pub fn with_archive() -> Self {
        Self::build(true)
    }

    fn build(archive: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.sqlite");
        let pool = Arc::new(create_pool(db_path.to_str().unwrap()).unwrap());
        let delivery = Arc::new(MockDelivery::default());
        let files = Arc::new(MockFileStore::default());
        let delivery_dyn: Arc<dyn Delivery> = delivery.clone();
        let mut router = Router::with_admins(Arc::clone(&pool), delivery_dyn, vec![ADMIN_ID]);
        if archive {
            let files_dyn: Arc<dyn FileStore> = files.clone();
            router = router.with_file_store(files_dyn);
        }
        TestContext {
            pool,
            router,
            delivery,
            files,
            _dir: dir,
        }
    }

    pub fn conn(&self) -> DbConnection {
        get_connection(&self.pool).unwrap()
    }

    pub async fn select(&self, from: i64, token: &str) -> Screen {
        self.router
            .handle_event(InboundEvent {
                from,
                username: None,
                first_name: None,
                kind: EventKind::Select(token.to_string()),
            })
            .await
    }

    pub async fn text(&self, from: i64, text: &str) -> Screen {
        self.router
            .handle_event(InboundEvent {
                from,
                username: None,
                first_name: None,
                kind: EventKind::Text(text.to_string()),
            })
            .await
    }

    pub async fn upload(&self, from: i64, upload: UploadedFile) -> Screen {
        self.router
            .handle_event(InboundEvent {
                from,
                username: None,
                first_name: None,
                kind: EventKind::Upload(upload),
            })
            .await
    }
}

pub fn video_upload(file_id: &str) -> UploadedFile {
    UploadedFile {
        kind: UploadKind::Video,
        mime_type: Some("video/mp4".to_string()),
        file_name: Some("lecture.mp4".to_string()),
        reference: FileReference::from_file_id(file_id),
    }
}

pub fn pdf_upload(file_id: &str) -> UploadedFile {
    UploadedFile {
        kind: UploadKind::Document,
        mime_type: Some("application/pdf".to_string()),
        file_name: Some("notes.pdf".to_string()),
        reference: FileReference::from_file_id(file_id),
    }
}

pub fn png_upload(file_id: &str) -> UploadedFile {
    UploadedFile {
        kind: UploadKind::Document,
        mime_type: Some("image/png".to_string()),
        file_name: Some("scan.png".to_string()),
        reference: FileReference::from_file_id(file_id),
    }
}

/// Finds the button whose label contains `needle` and returns its token
pub fn token_of(screen: &Screen, needle: &str) -> String {
    screen
        .buttons
        .iter()
        .flatten()
        .find(|b| b.label.contains(needle))
        .unwrap_or_else(|| panic!("no button containing {:?} in {:?}", needle, screen.buttons))
        .token
        .clone()
}

/// Walks the admin wizard through subject, a new chapter name, and a
/// content-type selection
pub async fn walk_wizard_to_type(
    ctx: &TestContext,
    subject_token: &str,
    chapter_name: &str,
    type_token: &str,
) -> Screen {
    ctx.select(ADMIN_ID, "adm:add").await;
    ctx.select(ADMIN_ID, subject_token).await;
    ctx.select(ADMIN_ID, "adm:newchap").await;
    ctx.text(ADMIN_ID, chapter_name).await;
    ctx.select(ADMIN_ID, type_token).await
}
