//! Presentation-agnostic error feedback for the four display modes.

use crate::validation::policy::{DisplayMode, Field};

/// How long a toast stays visible.
pub const TOAST_TTL_MS: u32 = 3_000;

/// A field that failed validation, with the message to show for it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// One unit of user-visible feedback that the host renders with its own UI toolkit.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feedback {
    /// Text under the field.
    Inline { field: Field, message: String },
    /// Text above the field.
    Above { field: Field, message: String },
    /// A single modal message covering every error.
    Alert { message: String },
    /// A transient notification.
    Toast { message: String, ttl_ms: u32 },
}

impl Feedback {
    pub fn message(&self) -> &str {
        match self {
            Feedback::Inline { message, .. }
            | Feedback::Above { message, .. }
            | Feedback::Alert { message }
            | Feedback::Toast { message, .. } => message,
        }
    }
}

/// Map field errors to feedback for `mode`.
///
/// Alert collapses everything into one message, one line per field. The other modes
/// produce one entry per error, in the order given.
pub fn present(errors: &[FieldError], mode: DisplayMode) -> Vec<Feedback> {
    if errors.is_empty() {
        return Vec::new();
    }
    match mode {
        DisplayMode::Inline => errors
            .iter()
            .map(|e| Feedback::Inline {
                field: e.field,
                message: e.message.clone(),
            })
            .collect(),
        DisplayMode::Above => errors
            .iter()
            .map(|e| Feedback::Above {
                field: e.field,
                message: e.message.clone(),
            })
            .collect(),
        DisplayMode::Alert => {
            let message = errors
                .iter()
                .map(|e| format!("{}: {}", e.field.label(), e.message))
                .collect::<Vec<_>>()
                .join("\n");
            vec![Feedback::Alert { message }]
        }
        DisplayMode::Toast => errors
            .iter()
            .map(|e| Feedback::Toast {
                message: e.message.clone(),
                ttl_ms: TOAST_TTL_MS,
            })
            .collect(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/validation/feedback.rs"]
mod tests;
