use std::sync::OnceLock;

use regex::Regex;

use crate::validation::policy::{Field, GithubPolicy, NamePolicy, ValidationConfig};

/// Longest handle GitHub accepts.
pub const GITHUB_USERNAME_MAX_LEN: usize = 39;

/// Outcome of validating one raw field value.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldValidationResult {
    pub is_valid: bool,
    /// Empty when valid.
    pub message: String,
    /// Replacement for the raw value, when the active policy rewrites it.
    pub normalized_value: Option<String>,
}

impl FieldValidationResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
            normalized_value: None,
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            is_valid: false,
            message: message.to_string(),
            normalized_value: None,
        }
    }

    /// The value a host should keep for the field: the normalized value when present.
    pub fn effective_value<'a>(&'a self, raw: &'a str) -> &'a str {
        self.normalized_value.as_deref().unwrap_or(raw)
    }
}

/// Validate `raw` for `field` under `config`.
///
/// Pure and total: the same inputs always produce the same result.
pub fn validate(field: Field, raw: &str, config: &ValidationConfig) -> FieldValidationResult {
    let result = match field {
        Field::FullName => validate_name(raw, config.name_validation),
        Field::Email => validate_email(raw),
        Field::GithubUsername => validate_github(raw, config.github_validation),
    };
    tracing::debug!(%field, valid = result.is_valid, "validated field");
    result
}

pub fn validate_name(raw: &str, policy: NamePolicy) -> FieldValidationResult {
    if raw.trim().is_empty() {
        return FieldValidationResult::invalid("Full name is required");
    }
    match policy {
        NamePolicy::First => {
            if raw.contains(' ') {
                return FieldValidationResult::invalid("Please enter only your first name");
            }
        }
        NamePolicy::Full => {
            if raw.split_whitespace().count() < 2 {
                return FieldValidationResult::invalid("Please enter your first and last name");
            }
        }
    }
    FieldValidationResult::valid()
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile"))
}

pub fn validate_email(raw: &str) -> FieldValidationResult {
    if raw.trim().is_empty() {
        return FieldValidationResult::invalid("Email address is required");
    }
    if !email_regex().is_match(raw) {
        return FieldValidationResult::invalid("Please enter a valid email address");
    }
    FieldValidationResult::valid()
}

pub fn validate_github(raw: &str, policy: GithubPolicy) -> FieldValidationResult {
    const INVALID: &str = "Please enter a valid GitHub username";

    if raw.trim().is_empty() {
        return FieldValidationResult::invalid("GitHub username is required");
    }
    let stripped = raw.strip_prefix('@');
    match policy {
        GithubPolicy::RequireAt => match stripped {
            None => FieldValidationResult::invalid("GitHub username must start with @"),
            Some(user) if is_valid_github_username(user) => FieldValidationResult::valid(),
            Some(_) => FieldValidationResult::invalid(INVALID),
        },
        GithubPolicy::NoAt => {
            let user = stripped.unwrap_or(raw);
            if !is_valid_github_username(user) {
                return FieldValidationResult::invalid(INVALID);
            }
            FieldValidationResult {
                normalized_value: stripped.map(str::to_string),
                ..FieldValidationResult::valid()
            }
        }
        GithubPolicy::Flexible => {
            if is_valid_github_username(stripped.unwrap_or(raw)) {
                FieldValidationResult::valid()
            } else {
                FieldValidationResult::invalid(INVALID)
            }
        }
    }
}

/// GitHub's username grammar: an ASCII alphanumeric, then up to 38 alphanumerics or single
/// hyphens, never ending in a hyphen.
pub fn is_valid_github_username(user: &str) -> bool {
    let bytes = user.as_bytes();
    let Some(&first) = bytes.first() else {
        return false;
    };
    if bytes.len() > GITHUB_USERNAME_MAX_LEN || !first.is_ascii_alphanumeric() {
        return false;
    }
    let mut prev_hyphen = false;
    for &b in &bytes[1..] {
        if b == b'-' {
            if prev_hyphen {
                return false;
            }
            prev_hyphen = true;
        } else if b.is_ascii_alphanumeric() {
            prev_hyphen = false;
        } else {
            return false;
        }
    }
    !prev_hyphen
}

#[cfg(test)]
#[path = "../../tests/unit/validation/rules.rs"]
mod tests;
