//! File-store collaborator seam
//!
//! The core never touches bytes itself - uploads arrive as opaque
//! references and deliveries go out the same way. A host that wants the
//! filesystem fallback arm populated plugs in a [`FileStore`]; the wizard
//! then archives each accepted upload best-effort, so content survives a
//! dead platform handle.

use crate::core::types::{ContentType, FileReference, Subject, UploadKind, UploadedFile};
use crate::core::token;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("file not found in store")]
    NotFound,
    #[error("file store unavailable: {0}")]
    Unavailable(String),
}

/// Storage seam implemented by the host (local disk, object store, ...).
/// The core never assumes which.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Re-fetches previously stored content
    async fn fetch(&self, reference: &FileReference) -> Result<Vec<u8>, FileStoreError>;

    /// Stores a payload under a suggested name and returns a reference
    async fn store(&self, payload: Vec<u8>, suggested_name: &str) -> Result<FileReference, FileStoreError>;
}

/// Deterministic archive filename for an accepted upload
pub fn archive_name(
    subject: Subject,
    chapter: &str,
    content_type: ContentType,
    lecture_no: Option<&str>,
    kind: UploadKind,
) -> String {
    let ext = match kind {
        UploadKind::Video => "mp4",
        UploadKind::Document => "pdf",
    };
    match lecture_no {
        Some(no) => format!(
            "{}_{}_{}_{}.{}",
            subject.code(),
            token::slug(chapter),
            content_type.code(),
            no,
            ext
        ),
        None => format!("{}_{}_{}.{}", subject.code(), token::slug(chapter), content_type.code(), ext),
    }
}

/// Round-trips an accepted upload through the store to populate the path
/// fallback arm. Best-effort: any failure leaves the platform handle as
/// the only arm.
pub async fn archive_upload(
    files: &dyn FileStore,
    upload: &UploadedFile,
    subject: Subject,
    chapter: &str,
    content_type: ContentType,
    lecture_no: Option<&str>,
) -> Result<FileReference, FileStoreError> {
    let payload = files.fetch(&upload.reference).await?;
    let name = archive_name(subject, chapter, content_type, lecture_no, upload.kind);
    files.store(payload, &name).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_name_is_deterministic_and_flat() {
        let name = archive_name(
            Subject::Physics,
            "Laws of Motion",
            ContentType::Lecture,
            Some("2.1"),
            UploadKind::Video,
        );
        assert_eq!(name, "physics_laws-of-motion_lecture_2.1.mp4");

        let name = archive_name(Subject::Maths, "Algebra", ContentType::Notes, None, UploadKind::Document);
        assert_eq!(name, "maths_algebra_notes.pdf");
    }
}
