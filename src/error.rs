//! Structured error types for the quire pagination engine.
//!
//! Structural violations, measurement failures and authoring mistakes are
//! all reported up to the caller. Nothing here is retried or masked.

use thiserror::Error;

use crate::model::{Element, ElementType};

/// The unified error type returned by all public quire API functions.
#[derive(Debug, Error)]
pub enum QuireError {
    /// A child element of a disallowed type was attached to a parent.
    #[error("{child:?} is not an allowed child for {parent:?}")]
    NotAllowed {
        child: ElementType,
        parent: ElementType,
    },

    /// A cell's span does not fit in the remaining column slots of its row.
    #[error("cell spanning {span} column(s) does not fit: row has {used} of {columns} columns in use")]
    SpanOverflow {
        span: u32,
        used: usize,
        columns: usize,
    },

    /// A formatting span does not address a valid byte range of its text.
    #[error("span {start}..{end} is not a valid range of a {len}-byte text")]
    InvalidSpan { start: usize, end: usize, len: usize },

    /// The text-measurement service failed or returned degenerate output.
    #[error("text measurement failed: {0}")]
    Measurement(String),

    /// A style name was looked up in a style sheet that does not define it.
    #[error("no {kind} style named {name:?}")]
    MissingStyle { kind: &'static str, name: String },

    /// The document builder was driven out of order.
    #[error("document builder: {0}")]
    Builder(String),

    /// JSON input failed to parse as a valid document or configuration.
    #[error("failed to parse input: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// Font data could not be parsed.
    #[error("font error: {0}")]
    Font(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for QuireError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        QuireError::Parse { source: e, hint }
    }
}

/// A rejected attach. The tree is unchanged and the child is handed back.
#[derive(Debug)]
pub struct Rejected {
    pub child: Box<Element>,
    pub parent: ElementType,
    reason: RejectReason,
}

#[derive(Debug, Clone, Copy)]
enum RejectReason {
    NotAllowed,
    SpanOverflow { span: u32, used: usize, columns: usize },
}

impl Rejected {
    pub(crate) fn not_allowed(child: Element, parent: ElementType) -> Self {
        Self {
            child: Box::new(child),
            parent,
            reason: RejectReason::NotAllowed,
        }
    }

    pub(crate) fn span_overflow(
        child: Element,
        parent: ElementType,
        span: u32,
        used: usize,
        columns: usize,
    ) -> Self {
        Self {
            child: Box::new(child),
            parent,
            reason: RejectReason::SpanOverflow {
                span,
                used,
                columns,
            },
        }
    }

    /// Take the rejected element back.
    pub fn into_child(self) -> Element {
        *self.child
    }
}

impl Rejected {
    /// The error describing this rejection, leaving the child in place.
    pub fn error(&self) -> QuireError {
        match self.reason {
            RejectReason::NotAllowed => QuireError::NotAllowed {
                child: self.child.element_type(),
                parent: self.parent,
            },
            RejectReason::SpanOverflow {
                span,
                used,
                columns,
            } => QuireError::SpanOverflow {
                span,
                used,
                columns,
            },
        }
    }
}

impl From<Rejected> for QuireError {
    fn from(r: Rejected) -> Self {
        r.error()
    }
}

pub type Result<T> = std::result::Result<T, QuireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_carry_a_hint() {
        let err: QuireError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.contains("Hint: Check for trailing commas"), "{msg}");
    }

    #[test]
    fn truncated_input_is_reported_as_eof() {
        let err: QuireError = serde_json::from_str::<serde_json::Value>("{\"a\": ")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }
}
