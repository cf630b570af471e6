use rand::Rng;

/// Name used for initials when the registrant has not typed one yet.
pub const FALLBACK_NAME: &str = "Coding Conf";

/// Up to two upper-cased initials: the first character of each whitespace-delimited token.
pub fn ticket_initials(full_name: &str) -> String {
    let source = if full_name.trim().is_empty() {
        FALLBACK_NAME
    } else {
        full_name
    };
    source
        .split_whitespace()
        .filter_map(|token| token.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Initials followed by a zero-padded four-digit random number, e.g. `AL0427`.
pub fn generate_ticket_number<R: Rng + ?Sized>(full_name: &str, rng: &mut R) -> String {
    let n: u32 = rng.random_range(0..10_000);
    format!("{}{n:04}", ticket_initials(full_name))
}

#[cfg(test)]
#[path = "../../tests/unit/ticket/number.rs"]
mod tests;
