//! Transport-neutral screen descriptions
//!
//! A screen is what the core hands back for rendering: text, rows of
//! selectable buttons (each carrying the token the transport echoes back
//! verbatim), and optionally a file to deliver alongside.

use crate::core::types::{FileReference, UploadKind};

/// One selectable action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Button {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// A file delivered together with a screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub reference: FileReference,
    pub kind: UploadKind,
    pub caption: String,
}

/// What the transport should render next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub text: String,
    pub buttons: Vec<Vec<Button>>,
    pub attachment: Option<Attachment>,
}

impl Screen {
    pub fn new(text: impl Into<String>) -> Self {
        Screen {
            text: text.into(),
            buttons: Vec::new(),
            attachment: None,
        }
    }

    /// Appends one row of buttons
    pub fn push_row(&mut self, row: Vec<Button>) {
        self.buttons.push(row);
    }

    /// All button tokens in render order - handy in tests and transports
    pub fn tokens(&self) -> Vec<&str> {
        self.buttons
            .iter()
            .flat_map(|row| row.iter().map(|b| b.token.as_str()))
            .collect()
    }
}
