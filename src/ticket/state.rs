use crate::assets::avatar::AvatarImage;
use crate::validation::policy::Field;

/// Everything the renderer needs to paint one ticket.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TicketState {
    pub full_name: String,
    pub email: String,
    pub github_username: String,
    pub avatar: Option<AvatarImage>,
    /// Set once the number is frozen; otherwise each render draws a fresh one.
    pub ticket_number: Option<String>,
}

impl TicketState {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::GithubUsername => &self.github_username,
        }
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::GithubUsername => &mut self.github_username,
        };
        *slot = value.into();
    }

    /// True when any identifying field or an avatar is present.
    pub fn has_data(&self) -> bool {
        !self.full_name.is_empty()
            || !self.email.is_empty()
            || !self.github_username.is_empty()
            || self.avatar.is_some()
    }

    /// The handle as shown on the ticket: always `@`-prefixed, `None` when empty.
    pub fn display_handle(&self) -> Option<String> {
        display_handle(&self.github_username)
    }
}

pub fn display_handle(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with('@') {
        Some(raw.to_string())
    } else {
        Some(format!("@{raw}"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ticket/state.rs"]
mod tests;
