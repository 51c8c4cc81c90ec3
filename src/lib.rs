//! Studyrack - catalog core for a study-materials bot
//!
//! This library implements the transport-agnostic core of a conversational
//! content catalog: a single admin ingests video lectures and PDF
//! notes/practice sets under subject → chapter → content-type paths, and end
//! users browse the same hierarchy through opaque action tokens. The
//! messaging transport, UI rendering, and process entry point are external
//! collaborators behind narrow seams ([`notify::Delivery`], upload
//! descriptors, [`menu::Screen`]).
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, domain types, token codec, validation
//! - `storage`: SQLite-backed catalog, user registry, and snapshot export
//! - `menu`: action parsing, screen descriptions, navigation and deletion
//! - `session`: per-admin wizard session store
//! - `wizard`: multi-step admin ingestion state machine
//! - `files`: file-store collaborator seam
//! - `notify`: best-effort broadcast fan-out
//! - `router`: inbound event dispatch

pub mod core;
pub mod files;
pub mod menu;
pub mod notify;
pub mod router;
pub mod session;
pub mod storage;
pub mod wizard;

// Re-export commonly used types for convenience
pub use crate::core::error::{AppError, AppResult};
pub use crate::core::types::{ContentType, FileReference, Subject, UploadKind, UploadedFile};
pub use crate::files::{FileStore, FileStoreError};
pub use crate::menu::{Action, Screen};
pub use crate::notify::{Delivery, DeliveryError};
pub use crate::router::{EventKind, InboundEvent, Router};
pub use crate::storage::{create_pool, get_connection, DbConnection, DbPool};
