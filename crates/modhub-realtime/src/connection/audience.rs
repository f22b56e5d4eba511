//! Recipient selection for fan-out.

use std::collections::HashSet;

use modhub_core::types::UserId;

/// Which users receive a broadcast. Selection is by user, never by session,
/// so every open session of a selected user receives the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Every connected user.
    All,
    /// Every connected user except these.
    Except(HashSet<UserId>),
    /// Only these users.
    Only(HashSet<UserId>),
}

impl Audience {
    /// Everyone except the given users.
    pub fn except(users: impl IntoIterator<Item = UserId>) -> Self {
        Self::Except(users.into_iter().collect())
    }

    /// Only the given users.
    pub fn only(users: impl IntoIterator<Item = UserId>) -> Self {
        Self::Only(users.into_iter().collect())
    }

    /// Whether `user_id` is a recipient.
    pub fn includes(&self, user_id: &UserId) -> bool {
        match self {
            Self::All => true,
            Self::Except(excluded) => !excluded.contains(user_id),
            Self::Only(included) => included.contains(user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection() {
        let a = UserId::new();
        let b = UserId::new();
        assert!(Audience::All.includes(&a));
        assert!(!Audience::except([a]).includes(&a));
        assert!(Audience::except([a]).includes(&b));
        assert!(Audience::only([b]).includes(&b));
        assert!(!Audience::only(Vec::new()).includes(&a));
    }
}
