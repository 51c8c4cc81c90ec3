use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The fixed subject set, defined at deploy time and never mutated at
/// runtime. Codes are the stable identifiers used inside action tokens and
/// the persisted catalog; labels are what users see on buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Physics,
    Chemistry,
    Maths,
    English,
    Biology,
}

impl Subject {
    /// Stable lowercase code used in tokens and storage
    pub fn code(&self) -> &'static str {
        match self {
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
            Subject::Maths => "maths",
            Subject::English => "english",
            Subject::Biology => "biology",
        }
    }

    /// Display label shown on buttons and screens
    pub fn label(&self) -> &'static str {
        match self {
            Subject::Physics => "⚛️ Physics",
            Subject::Chemistry => "🧪 Chemistry",
            Subject::Maths => "📐 Maths",
            Subject::English => "📚 English",
            Subject::Biology => "🔬 Biology",
        }
    }

    /// Resolve a subject from its code. Unknown codes yield `None` - the
    /// caller degrades to a not-found screen, never a failure.
    pub fn from_code(code: &str) -> Option<Subject> {
        Subject::iter().find(|s| s.code() == code)
    }
}

/// Content categories under a chapter. `Lecture` is multi-valued by lecture
/// number; `Notes` and `Dpp` hold a single file reference each and every
/// upload overwrites the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Lecture,
    Notes,
    Dpp,
}

impl ContentType {
    pub fn code(&self) -> &'static str {
        match self {
            ContentType::Lecture => "lecture",
            ContentType::Notes => "notes",
            ContentType::Dpp => "dpp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Lecture => "🎥 Lecture",
            ContentType::Notes => "📝 Notes",
            ContentType::Dpp => "📊 DPP",
        }
    }

    pub fn from_code(code: &str) -> Option<ContentType> {
        ContentType::iter().find(|t| t.code() == code)
    }

    /// The upload kind this content type expects from the transport
    pub fn expected_kind(&self) -> UploadKind {
        match self {
            ContentType::Lecture => UploadKind::Video,
            ContentType::Notes | ContentType::Dpp => UploadKind::Document,
        }
    }

    /// Whether entries under this type are keyed by lecture number
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, ContentType::Lecture)
    }
}

/// Capability class of an uploaded payload, reported by the file-I/O
/// collaborator. Keeps content-type validation independent of any
/// transport-specific payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Video,
    Document,
}

/// Opaque pointer to stored binary content, sufficient to re-deliver the
/// file without re-uploading. The platform file handle is preferred for
/// speed; the filesystem path is the fallback. At least one arm is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// Platform-native file handle (fast re-delivery)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_id: Option<String>,
    /// Filesystem path fallback
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<String>,
}

impl FileReference {
    pub fn from_file_id(file_id: impl Into<String>) -> Self {
        FileReference {
            file_id: Some(file_id.into()),
            path: None,
        }
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        FileReference {
            file_id: None,
            path: Some(path.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file_id.is_none() && self.path.is_none()
    }
}

/// An uploaded file as handed over by the transport during ingestion
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub kind: UploadKind,
    /// MIME type where the transport exposes one ("application/pdf" etc.)
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub reference: FileReference,
}

impl UploadedFile {
    /// PDF check for document uploads. A transport that reports no MIME type
    /// passes - the kind check already happened.
    pub fn looks_like_pdf(&self) -> bool {
        match &self.mime_type {
            Some(mime) => mime.eq_ignore_ascii_case("application/pdf"),
            None => true,
        }
    }
}

/// Event broadcast to registered users after a successful ingestion
#[derive(Debug, Clone)]
pub struct NewContentEvent {
    pub subject: Subject,
    pub chapter: String,
    pub content_type: ContentType,
    pub lecture_no: Option<String>,
}

impl NewContentEvent {
    /// Formats the broadcast text shown to every registered user
    pub fn broadcast_text(&self) -> String {
        let what = match &self.lecture_no {
            Some(no) => format!("{} #{}", self.content_type.label(), no),
            None => self.content_type.label().to_string(),
        };
        format!(
            "📢 New content available!\n\n{subject}\n📖 {chapter}\n{what}\n\nOpen the menu to grab it.",
            subject = self.subject.label(),
            chapter = self.chapter,
            what = what,
        )
    }
}
