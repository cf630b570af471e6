use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TicketError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(TicketError::render("x").to_string().contains("render error:"));
    assert!(TicketError::state("x").to_string().contains("state error:"));
    assert!(
        TicketError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TicketError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn avatar_rejection_is_transparent() {
    let err = TicketError::from(AvatarRejection::TooLarge {
        bytes: 600_000,
        limit: 512_000,
    });
    assert_eq!(
        err.to_string(),
        AvatarRejection::TooLarge {
            bytes: 600_000,
            limit: 512_000,
        }
        .to_string()
    );
}
