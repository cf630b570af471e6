use std::fmt;
use std::str::FromStr;

use crate::foundation::error::TicketError;

/// One of the three required registrant fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    Email,
    GithubUsername,
}

impl Field {
    /// Fixed order used for submit validation and focus selection.
    pub const ALL: [Field; 3] = [Field::FullName, Field::Email, Field::GithubUsername];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::FullName => "full_name",
            Field::Email => "email",
            Field::GithubUsername => "github_username",
        }
    }

    /// Human-facing label, used by alert-style feedback.
    pub fn label(self) -> &'static str {
        match self {
            Field::FullName => "Full Name",
            Field::Email => "Email Address",
            Field::GithubUsername => "GitHub Username",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = TicketError;

    /// Accepts snake_case, kebab-case, and the camelCase names hosts usually bind form inputs to.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_name" | "full-name" | "fullName" | "name" => Ok(Field::FullName),
            "email" => Ok(Field::Email),
            "github_username" | "github-username" | "githubUsername" | "github" => {
                Ok(Field::GithubUsername)
            }
            other => Err(TicketError::validation(format!("unknown field '{other}'"))),
        }
    }
}

/// How the full-name field is judged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePolicy {
    /// A single given name; any space is rejected.
    First,
    /// At least two whitespace-delimited tokens.
    #[default]
    Full,
}

/// How a leading `@` on the GitHub handle is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GithubPolicy {
    /// The handle must be written as `@user`.
    RequireAt,
    /// A leading `@` is stripped and reported back as the normalized value.
    NoAt,
    /// A leading `@` is ignored for validation and kept as typed.
    #[default]
    Flexible,
}

/// Where field errors are surfaced by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Inline,
    Above,
    Alert,
    Toast,
}

/// Policy set threaded into every validation call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub name_validation: NamePolicy,
    pub github_validation: GithubPolicy,
    pub display_mode: DisplayMode,
}

macro_rules! snake_case_from_str {
    ($ty:ty, $what:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = TicketError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($variant),)+
                    other => Err(TicketError::validation(format!(
                        concat!("unknown ", $what, " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

snake_case_from_str!(NamePolicy, "name policy", {
    "first" => NamePolicy::First,
    "full" => NamePolicy::Full,
});

snake_case_from_str!(GithubPolicy, "github policy", {
    "require_at" => GithubPolicy::RequireAt,
    "no_at" => GithubPolicy::NoAt,
    "flexible" => GithubPolicy::Flexible,
});

snake_case_from_str!(DisplayMode, "display mode", {
    "inline" => DisplayMode::Inline,
    "above" => DisplayMode::Above,
    "alert" => DisplayMode::Alert,
    "toast" => DisplayMode::Toast,
});

#[cfg(test)]
#[path = "../../tests/unit/validation/policy.rs"]
mod tests;
