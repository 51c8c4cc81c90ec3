//! Per-admin wizard session store
//!
//! One mutable wizard slot per admin identity, held in memory only: a
//! session is created when the admin opens the ingestion flow, overwritten
//! step by step, and cleared on completion of the whole flow, explicit
//! exit, or process restart. Non-admin identities never get a slot.

use crate::core::types::{ContentType, Subject};
use dashmap::DashMap;

/// Where the admin currently is in the ingestion flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    AwaitingSubject,
    AwaitingChapter,
    AwaitingContentType,
    AwaitingLectureNumber,
    AwaitingFile,
}

/// The in-progress selection of one admin identity
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub step: WizardStep,
    pub subject: Option<Subject>,
    pub chapter: Option<String>,
    pub content_type: Option<ContentType>,
    pub lecture_no: Option<String>,
}

impl WizardSession {
    fn new() -> Self {
        WizardSession {
            step: WizardStep::AwaitingSubject,
            subject: None,
            chapter: None,
            content_type: None,
            lecture_no: None,
        }
    }

    /// Back to the content-type step with subject and chapter retained,
    /// so the admin can keep uploading into the same chapter
    pub fn reset_for_next_upload(&mut self) {
        self.step = WizardStep::AwaitingContentType;
        self.content_type = None;
        self.lecture_no = None;
    }
}

/// Session store keyed by admin identity
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<i64, WizardSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore {
            sessions: DashMap::new(),
        }
    }

    /// Starts a fresh session, overwriting any previous one for this
    /// identity
    pub fn begin(&self, admin_id: i64) -> WizardSession {
        let session = WizardSession::new();
        self.sessions.insert(admin_id, session.clone());
        session
    }

    pub fn get(&self, admin_id: i64) -> Option<WizardSession> {
        self.sessions.get(&admin_id).map(|entry| entry.value().clone())
    }

    pub fn set(&self, admin_id: i64, session: WizardSession) {
        self.sessions.insert(admin_id, session);
    }

    /// Clears the session unconditionally; returns whether one existed
    pub fn clear(&self, admin_id: i64) -> bool {
        self.sessions.remove(&admin_id).is_some()
    }

    pub fn is_active(&self, admin_id: i64) -> bool {
        self.sessions.contains_key(&admin_id)
    }
}
