//! Inbound action tokens
//!
//! Every selection arrives as an opaque `prefix:field:field` string. It is
//! parsed exactly once, here, into a tagged [`Action`]; downstream
//! components match on the variant and never touch the raw token again.
//! Anything malformed or unrecognized becomes [`Action::Unknown`], which
//! the navigation engine degrades to a not-found screen.
//!
//! Chapter tokens and lecture numbers are delimiter-safe by construction
//! (see `core::token` and `core::validation`), so a plain `:` split is
//! unambiguous.

use crate::core::types::{ContentType, Subject};

/// A deletion target, shared between the propose and confirm phases. The
/// target is re-resolved from subject + chapter token at both phases -
/// the token is an address, never trusted as a liveness proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Chapter { subject: Subject, chapter_token: String },
    AllLectures { subject: Subject, chapter_token: String },
    Lecture { subject: Subject, chapter_token: String, lecture_no: String },
    Notes { subject: Subject, chapter_token: String },
    Dpp { subject: Subject, chapter_token: String },
}

impl DeleteTarget {
    pub fn subject(&self) -> Subject {
        match self {
            DeleteTarget::Chapter { subject, .. }
            | DeleteTarget::AllLectures { subject, .. }
            | DeleteTarget::Lecture { subject, .. }
            | DeleteTarget::Notes { subject, .. }
            | DeleteTarget::Dpp { subject, .. } => *subject,
        }
    }

    pub fn chapter_token(&self) -> &str {
        match self {
            DeleteTarget::Chapter { chapter_token, .. }
            | DeleteTarget::AllLectures { chapter_token, .. }
            | DeleteTarget::Lecture { chapter_token, .. }
            | DeleteTarget::Notes { chapter_token, .. }
            | DeleteTarget::Dpp { chapter_token, .. } => chapter_token,
        }
    }

    fn kind_and_suffix(&self) -> (&'static str, String) {
        let tail = format!("{}:{}", self.subject().code(), self.chapter_token());
        match self {
            DeleteTarget::Chapter { .. } => ("chapter", tail),
            DeleteTarget::AllLectures { .. } => ("lectures", tail),
            DeleteTarget::Lecture { lecture_no, .. } => ("lecture", format!("{tail}:{lecture_no}")),
            DeleteTarget::Notes { .. } => ("notes", tail),
            DeleteTarget::Dpp { .. } => ("dpp", tail),
        }
    }

    /// Token that proposes this deletion
    pub fn propose_token(&self) -> String {
        let (kind, suffix) = self.kind_and_suffix();
        format!("del:{kind}:{suffix}")
    }

    /// Token that confirms this deletion
    pub fn confirm_token(&self) -> String {
        let (kind, suffix) = self.kind_and_suffix();
        format!("del:confirm:{kind}:{suffix}")
    }

    fn parse(kind: &str, subject: Subject, chapter_token: &str, lecture_no: Option<&str>) -> Option<DeleteTarget> {
        let chapter_token = chapter_token.to_string();
        match (kind, lecture_no) {
            ("chapter", None) => Some(DeleteTarget::Chapter { subject, chapter_token }),
            ("lectures", None) => Some(DeleteTarget::AllLectures { subject, chapter_token }),
            ("lecture", Some(no)) => Some(DeleteTarget::Lecture {
                subject,
                chapter_token,
                lecture_no: no.to_string(),
            }),
            ("notes", None) => Some(DeleteTarget::Notes { subject, chapter_token }),
            ("dpp", None) => Some(DeleteTarget::Dpp { subject, chapter_token }),
            _ => None,
        }
    }
}

/// Every selection the core understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Entry point: the subject list
    Start,
    Help,
    SelectSubject(Subject),
    SelectChapter { subject: Subject, chapter_token: String },
    SelectContentType { subject: Subject, chapter_token: String, content_type: ContentType },
    SelectLecture { subject: Subject, chapter_token: String, lecture_no: String },
    BackToSubjects,
    BackToChapters(Subject),
    BackToContentTypes { subject: Subject, chapter_token: String },

    AdminPanel,
    AdminAddContent,
    AdminSelectSubject(Subject),
    AdminSelectChapter { subject: Subject, chapter_token: String },
    AdminNewChapter,
    AdminSelectContentType(ContentType),
    AdminManageChapters,
    AdminManageSubject(Subject),
    AdminUsers,
    AdminUserDetail(i64),
    AdminBlockUser(i64),
    AdminUnblockUser(i64),
    AdminExport,
    AdminExit,

    DeleteMenu { subject: Subject, chapter_token: String },
    DeleteLecturePick { subject: Subject, chapter_token: String },
    ProposeDelete(DeleteTarget),
    ConfirmDelete(DeleteTarget),
    CancelDelete { subject: Subject, chapter_token: String },

    /// Anything malformed or stale - degrades to a not-found screen
    Unknown(String),
}

/// Parses an inbound token. Total: never fails, never panics.
pub fn parse(data: &str) -> Action {
    let unknown = || Action::Unknown(data.to_string());
    let fields: Vec<&str> = data.split(':').collect();

    match fields.as_slice() {
        ["home"] => Action::Start,
        ["help"] => Action::Help,
        ["subj", code] => match Subject::from_code(code) {
            Some(subject) => Action::SelectSubject(subject),
            None => unknown(),
        },
        ["chap", code, tok] => match Subject::from_code(code) {
            Some(subject) => Action::SelectChapter {
                subject,
                chapter_token: tok.to_string(),
            },
            None => unknown(),
        },
        ["type", code, tok, ct] => match (Subject::from_code(code), ContentType::from_code(ct)) {
            (Some(subject), Some(content_type)) => Action::SelectContentType {
                subject,
                chapter_token: tok.to_string(),
                content_type,
            },
            _ => unknown(),
        },
        ["lec", code, tok, no] => match Subject::from_code(code) {
            Some(subject) => Action::SelectLecture {
                subject,
                chapter_token: tok.to_string(),
                lecture_no: no.to_string(),
            },
            None => unknown(),
        },
        ["back", "subjects"] => Action::BackToSubjects,
        ["back", "chapters", code] => match Subject::from_code(code) {
            Some(subject) => Action::BackToChapters(subject),
            None => unknown(),
        },
        ["back", "types", code, tok] => match Subject::from_code(code) {
            Some(subject) => Action::BackToContentTypes {
                subject,
                chapter_token: tok.to_string(),
            },
            None => unknown(),
        },

        ["adm", "panel"] => Action::AdminPanel,
        ["adm", "add"] => Action::AdminAddContent,
        ["adm", "subj", code] => match Subject::from_code(code) {
            Some(subject) => Action::AdminSelectSubject(subject),
            None => unknown(),
        },
        ["adm", "chap", code, tok] => match Subject::from_code(code) {
            Some(subject) => Action::AdminSelectChapter {
                subject,
                chapter_token: tok.to_string(),
            },
            None => unknown(),
        },
        ["adm", "newchap"] => Action::AdminNewChapter,
        ["adm", "type", ct] => match ContentType::from_code(ct) {
            Some(content_type) => Action::AdminSelectContentType(content_type),
            None => unknown(),
        },
        ["adm", "manage"] => Action::AdminManageChapters,
        ["adm", "msubj", code] => match Subject::from_code(code) {
            Some(subject) => Action::AdminManageSubject(subject),
            None => unknown(),
        },
        ["adm", "users"] => Action::AdminUsers,
        ["adm", "user", id] => match id.parse::<i64>() {
            Ok(id) => Action::AdminUserDetail(id),
            Err(_) => unknown(),
        },
        ["adm", "block", id] => match id.parse::<i64>() {
            Ok(id) => Action::AdminBlockUser(id),
            Err(_) => unknown(),
        },
        ["adm", "unblock", id] => match id.parse::<i64>() {
            Ok(id) => Action::AdminUnblockUser(id),
            Err(_) => unknown(),
        },
        ["adm", "export"] => Action::AdminExport,
        ["adm", "exit"] => Action::AdminExit,

        ["del", "menu", code, tok] => match Subject::from_code(code) {
            Some(subject) => Action::DeleteMenu {
                subject,
                chapter_token: tok.to_string(),
            },
            None => unknown(),
        },
        ["del", "pick", code, tok] => match Subject::from_code(code) {
            Some(subject) => Action::DeleteLecturePick {
                subject,
                chapter_token: tok.to_string(),
            },
            None => unknown(),
        },
        ["del", "cancel", code, tok] => match Subject::from_code(code) {
            Some(subject) => Action::CancelDelete {
                subject,
                chapter_token: tok.to_string(),
            },
            None => unknown(),
        },
        ["del", "confirm", kind, code, tok] => match Subject::from_code(code) {
            Some(subject) => match DeleteTarget::parse(kind, subject, tok, None) {
                Some(target) => Action::ConfirmDelete(target),
                None => unknown(),
            },
            None => unknown(),
        },
        ["del", "confirm", kind, code, tok, no] => match Subject::from_code(code) {
            Some(subject) => match DeleteTarget::parse(kind, subject, tok, Some(no)) {
                Some(target) => Action::ConfirmDelete(target),
                None => unknown(),
            },
            None => unknown(),
        },
        ["del", kind, code, tok] => match Subject::from_code(code) {
            Some(subject) => match DeleteTarget::parse(kind, subject, tok, None) {
                Some(target) => Action::ProposeDelete(target),
                None => unknown(),
            },
            None => unknown(),
        },
        ["del", kind, code, tok, no] => match Subject::from_code(code) {
            Some(subject) => match DeleteTarget::parse(kind, subject, tok, Some(no)) {
                Some(target) => Action::ProposeDelete(target),
                None => unknown(),
            },
            None => unknown(),
        },

        _ => unknown(),
    }
}
