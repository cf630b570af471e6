use crate::assets::avatar::AvatarRejection;

/// Convenience result type used across confticket.
pub type TicketResult<T> = Result<T, TicketError>;

/// Top-level error taxonomy used by the library APIs.
///
/// Field validity is not an error: [`crate::validate`] returns a
/// [`crate::FieldValidationResult`] value for every input.
#[derive(thiserror::Error, Debug)]
pub enum TicketError {
    /// Invalid configuration or caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while rasterizing a ticket plan.
    #[error("render error: {0}")]
    Render(String),

    /// An operation was attempted in a widget phase that does not allow it.
    #[error("state error: {0}")]
    State(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// An avatar upload was refused.
    #[error(transparent)]
    Avatar(#[from] AvatarRejection),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TicketError {
    /// Build a [`TicketError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TicketError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TicketError::State`] value.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build a [`TicketError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
