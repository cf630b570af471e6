use super::*;
use crate::validation::policy::DisplayMode;

fn cfg(name: NamePolicy, github: GithubPolicy) -> ValidationConfig {
    ValidationConfig {
        name_validation: name,
        github_validation: github,
        display_mode: DisplayMode::Inline,
    }
}

#[test]
fn name_required_under_both_policies() {
    for policy in [NamePolicy::First, NamePolicy::Full] {
        let r = validate_name("", policy);
        assert!(!r.is_valid);
        assert!(r.message.contains("required"));
        assert!(!validate_name("   ", policy).is_valid);
    }
}

#[test]
fn first_name_policy_rejects_any_space() {
    assert!(validate_name("Ada", NamePolicy::First).is_valid);
    for raw in ["Ada Lovelace", "Ada ", " Ada", "A B C"] {
        let r = validate_name(raw, NamePolicy::First);
        assert!(!r.is_valid, "{raw:?} should be rejected");
    }
}

#[test]
fn full_name_policy_needs_two_tokens() {
    assert!(validate_name("Ada Lovelace", NamePolicy::Full).is_valid);
    assert!(validate_name("  Ada   King  Lovelace ", NamePolicy::Full).is_valid);
    for raw in ["Ada", " Ada ", "Ada\t"] {
        assert!(!validate_name(raw, NamePolicy::Full).is_valid, "{raw:?}");
    }
}

#[test]
fn email_matches_pattern() {
    for ok in ["ada@example.com", "a@b.c", "first.last+tag@sub.domain.org"] {
        assert!(validate_email(ok).is_valid, "{ok}");
    }
    for bad in [
        "not-an-email",
        "a@b",
        "@b.c",
        "a@.c",
        "a@b.",
        "a b@c.d",
        "a@@b.c",
        " ada@example.com",
    ] {
        let r = validate_email(bad);
        assert!(!r.is_valid, "{bad}");
        assert_eq!(r.message, "Please enter a valid email address");
    }
    assert_eq!(validate_email("").message, "Email address is required");
}

#[test]
fn github_username_grammar() {
    assert!(is_valid_github_username("octocat"));
    assert!(is_valid_github_username("a"));
    assert!(is_valid_github_username("a-b-c"));
    assert!(is_valid_github_username("0day"));
    assert!(is_valid_github_username(&"a".repeat(39)));

    assert!(!is_valid_github_username(""));
    assert!(!is_valid_github_username(&"a".repeat(40)));
    assert!(!is_valid_github_username("-ab"));
    assert!(!is_valid_github_username("ab-"));
    assert!(!is_valid_github_username("a--b"));
    assert!(!is_valid_github_username("a_b"));
    assert!(!is_valid_github_username("a.b"));
    assert!(!is_valid_github_username("@ab"));
}

#[test]
fn require_at_policy() {
    let c = cfg(NamePolicy::Full, GithubPolicy::RequireAt);
    assert!(validate(Field::GithubUsername, "@octocat", &c).is_valid);
    let r = validate(Field::GithubUsername, "octocat", &c);
    assert!(!r.is_valid);
    assert_eq!(r.message, "GitHub username must start with @");
    assert!(!validate(Field::GithubUsername, "@", &c).is_valid);
}

#[test]
fn no_at_policy_normalizes_prefix() {
    let c = cfg(NamePolicy::Full, GithubPolicy::NoAt);
    let plain = validate(Field::GithubUsername, "octocat", &c);
    assert!(plain.is_valid);
    assert_eq!(plain.normalized_value, None);

    let prefixed = validate(Field::GithubUsername, "@octocat", &c);
    assert!(prefixed.is_valid);
    assert_eq!(prefixed.normalized_value.as_deref(), Some("octocat"));
    assert_eq!(prefixed.effective_value("@octocat"), "octocat");
}

#[test]
fn flexible_policy_keeps_value() {
    let c = cfg(NamePolicy::Full, GithubPolicy::Flexible);
    for raw in ["octocat", "@octocat"] {
        let r = validate(Field::GithubUsername, raw, &c);
        assert!(r.is_valid, "{raw}");
        assert_eq!(r.normalized_value, None);
        assert_eq!(r.effective_value(raw), raw);
    }
}

#[test]
fn doubled_hyphen_rejected_under_every_policy() {
    for policy in [
        GithubPolicy::RequireAt,
        GithubPolicy::NoAt,
        GithubPolicy::Flexible,
    ] {
        let c = cfg(NamePolicy::Full, policy);
        assert!(!validate(Field::GithubUsername, "a--b", &c).is_valid);
        assert!(!validate(Field::GithubUsername, "@a--b", &c).is_valid);
    }
}

#[test]
fn validate_dispatches_by_field_and_is_deterministic() {
    let c = ValidationConfig::default();
    assert!(validate(Field::FullName, "Ada Lovelace", &c).is_valid);
    assert!(validate(Field::Email, "ada@example.com", &c).is_valid);
    assert!(validate(Field::GithubUsername, "ada", &c).is_valid);
    assert_eq!(
        validate(Field::Email, "nope", &c),
        validate(Field::Email, "nope", &c)
    );
}
