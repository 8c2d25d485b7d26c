//! Non-blocking text entry.
//!
//! Adding a text annotation needs content from the user. Instead of blocking
//! the event loop on a modal prompt, the canvas opens a [`TextRequest`] and
//! the host answers it later with a [`TextResponse`].

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A pending request for annotation text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextRequest {
    /// Identifies the request; responses must echo it.
    pub id: u64,
    /// Where the annotation will be placed, in canvas coordinates.
    pub position: Point,
}

/// The host's answer to a [`TextRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextResponse {
    Submitted(String),
    Cancelled,
}

impl TextResponse {
    /// The entered text, if any was entered.
    pub fn text(&self) -> Option<&str> {
        match self {
            TextResponse::Submitted(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

impl From<Option<String>> for TextResponse {
    fn from(value: Option<String>) -> Self {
        value.map_or(TextResponse::Cancelled, TextResponse::Submitted)
    }
}

/// Holds at most one outstanding text request.
#[derive(Debug, Clone)]
pub struct TextPrompt {
    next_id: u64,
    pending: Option<TextRequest>,
}

impl Default for TextPrompt {
    fn default() -> Self {
        Self {
            next_id: 1,
            pending: None,
        }
    }
}

impl TextPrompt {
    /// Create an idle prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a request at `position`, superseding any pending one.
    pub fn open(&mut self, position: Point) -> TextRequest {
        let request = TextRequest {
            id: self.next_id,
            position,
        };
        self.next_id += 1;
        if let Some(old) = self.pending.replace(request) {
            log::debug!("Text request {} superseded by {}", old.id, request.id);
        }
        request
    }

    /// Get the pending request, if any.
    pub fn pending(&self) -> Option<&TextRequest> {
        self.pending.as_ref()
    }

    /// Take the pending request if it matches `id`.
    pub fn take(&mut self, id: u64) -> Option<TextRequest> {
        if self.pending.is_some_and(|r| r.id == id) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Drop the pending request. Returns true if there was one.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}
