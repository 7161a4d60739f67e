//! The secret-key gate in front of owner mutations.
//!
//! Enforcement is entirely client-side: the stored secret travels with the
//! record and is compared here. The ownership check below is a display hint,
//! the secret comparison is the actual gate, and neither is a server-side
//! boundary.

use crate::domain::entities::PostRecord;

/// Outcome of challenging an owner mutation with an entered secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// No secret supplied yet; the caller must collect one first.
    AwaitingSecret,
    /// The entered secret did not match and has been discarded.
    Rejected,
    /// Exact match against the stored secret.
    Authorized,
}

/// Compare an entered secret against the stored one. Exact string equality;
/// whitespace is significant, so `"abc "` does not authorize `"abc"`.
pub fn verify_secret(entered: &str, stored: &str) -> bool {
    entered == stored
}

pub fn challenge(post: &PostRecord, entered: Option<&str>) -> GateOutcome {
    match entered {
        None => GateOutcome::AwaitingSecret,
        Some(secret) if secret.is_empty() => GateOutcome::AwaitingSecret,
        Some(secret) if verify_secret(secret, &post.user_password) => GateOutcome::Authorized,
        Some(_) => GateOutcome::Rejected,
    }
}

/// Whether owner actions are offered to this viewer at all.
pub fn owner_actions_visible(post: &PostRecord, viewer: &str) -> bool {
    post.username == viewer
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn post(username: &str, secret: &str) -> PostRecord {
        PostRecord {
            id: 1,
            title: "A".to_string(),
            username: username.to_string(),
            user_password: secret.to_string(),
            location: None,
            travel_type: None,
            photos: None,
            comments: None,
            like: 0,
            description: None,
            created_at: datetime!(2024-05-01 10:00 UTC),
            updated_at: None,
        }
    }

    #[test]
    fn missing_or_blank_secret_awaits_input() {
        let record = post("alice", "abc");
        assert_eq!(challenge(&record, None), GateOutcome::AwaitingSecret);
        assert_eq!(challenge(&record, Some("")), GateOutcome::AwaitingSecret);
    }

    #[test]
    fn equality_is_exact() {
        let record = post("alice", "abc");
        assert_eq!(challenge(&record, Some("abc")), GateOutcome::Authorized);
        assert_eq!(challenge(&record, Some("abc ")), GateOutcome::Rejected);
        assert_eq!(challenge(&record, Some("ABC")), GateOutcome::Rejected);
    }

    #[test]
    fn owner_hint_compares_display_identity() {
        let record = post("alice", "abc");
        assert!(owner_actions_visible(&record, "alice"));
        assert!(!owner_actions_visible(&record, "bob"));
    }
}
