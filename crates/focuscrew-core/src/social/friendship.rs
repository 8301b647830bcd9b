//! Friend requests and their lifecycle.
//!
//! ```text
//! (request) -> Pending -> Accepted
//!                     \-> Rejected
//!                     \-> (deleted on cancel)
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::error::FriendshipError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FriendshipStatus::Pending),
            "accepted" => Ok(FriendshipStatus::Accepted),
            "rejected" => Ok(FriendshipStatus::Rejected),
            other => Err(format!("unknown friendship status: {other}")),
        }
    }
}

/// A friendship between two distinct users.
///
/// `user1` sent the request, `user2` received it. Membership is unordered:
/// [`Friendship::involves`] and [`Friendship::other`] treat both sides alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    pub user1: UserId,
    pub user2: UserId,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    /// Open a pending request from `from` to `to`.
    ///
    /// # Errors
    /// Returns [`FriendshipError::SelfFriendship`] if both ids are equal.
    pub fn request(from: UserId, to: UserId) -> Result<Self, FriendshipError> {
        if from == to {
            return Err(FriendshipError::SelfFriendship(from));
        }
        Ok(Self {
            user1: from,
            user2: to,
            status: FriendshipStatus::Pending,
            created_at: Utc::now(),
        })
    }

    pub fn involves(&self, user: &UserId) -> bool {
        &self.user1 == user || &self.user2 == user
    }

    /// The member that is not `user`, if `user` is a member at all.
    pub fn other(&self, user: &UserId) -> Option<&UserId> {
        if &self.user1 == user {
            Some(&self.user2)
        } else if &self.user2 == user {
            Some(&self.user1)
        } else {
            None
        }
    }

    /// Same unordered pair, regardless of direction.
    pub fn is_between(&self, a: &UserId, b: &UserId) -> bool {
        (&self.user1 == a && &self.user2 == b) || (&self.user1 == b && &self.user2 == a)
    }

    /// Accept a pending request. Only the addressee may accept.
    pub fn accept(&mut self, by: &UserId) -> Result<(), FriendshipError> {
        self.answer(by, FriendshipStatus::Accepted, "accept")
    }

    /// Reject a pending request. Only the addressee may reject.
    pub fn reject(&mut self, by: &UserId) -> Result<(), FriendshipError> {
        self.answer(by, FriendshipStatus::Rejected, "reject")
    }

    /// Check that `by` may withdraw this request. The caller deletes it.
    pub fn check_cancel(&self, by: &UserId) -> Result<(), FriendshipError> {
        if self.status != FriendshipStatus::Pending {
            return Err(FriendshipError::InvalidTransition {
                from: self.status,
                action: "cancel",
            });
        }
        if &self.user1 != by {
            return Err(FriendshipError::NotParticipant {
                user: by.clone(),
                action: "cancel",
            });
        }
        Ok(())
    }

    /// Check that `by` may end an accepted friendship. The caller deletes it.
    pub fn check_remove(&self, by: &UserId) -> Result<(), FriendshipError> {
        if self.status != FriendshipStatus::Accepted {
            return Err(FriendshipError::InvalidTransition {
                from: self.status,
                action: "remove",
            });
        }
        if !self.involves(by) {
            return Err(FriendshipError::NotParticipant {
                user: by.clone(),
                action: "remove",
            });
        }
        Ok(())
    }

    fn answer(
        &mut self,
        by: &UserId,
        to: FriendshipStatus,
        action: &'static str,
    ) -> Result<(), FriendshipError> {
        if self.status != FriendshipStatus::Pending {
            return Err(FriendshipError::InvalidTransition {
                from: self.status,
                action,
            });
        }
        if &self.user2 != by {
            return Err(FriendshipError::NotParticipant {
                user: by.clone(),
                action,
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (UserId, UserId) {
        (UserId::new("alice"), UserId::new("bob"))
    }

    #[test]
    fn cannot_befriend_self() {
        let a = UserId::new("alice");
        let err = Friendship::request(a.clone(), a.clone()).unwrap_err();
        assert_eq!(err, FriendshipError::SelfFriendship(a));
    }

    #[test]
    fn addressee_accepts() {
        let (a, b) = ids();
        let mut f = Friendship::request(a, b.clone()).unwrap();
        f.accept(&b).unwrap();
        assert_eq!(f.status, FriendshipStatus::Accepted);
    }

    #[test]
    fn requester_cannot_accept_own_request() {
        let (a, b) = ids();
        let mut f = Friendship::request(a.clone(), b).unwrap();
        assert!(matches!(
            f.accept(&a),
            Err(FriendshipError::NotParticipant { .. })
        ));
        assert_eq!(f.status, FriendshipStatus::Pending);
    }

    #[test]
    fn accepted_cannot_be_rejected() {
        let (a, b) = ids();
        let mut f = Friendship::request(a, b.clone()).unwrap();
        f.accept(&b).unwrap();
        assert_eq!(
            f.reject(&b),
            Err(FriendshipError::InvalidTransition {
                from: FriendshipStatus::Accepted,
                action: "reject",
            })
        );
    }

    #[test]
    fn rejected_is_terminal() {
        let (a, b) = ids();
        let mut f = Friendship::request(a.clone(), b.clone()).unwrap();
        f.reject(&b).unwrap();
        assert!(f.accept(&b).is_err());
        assert!(f.check_cancel(&a).is_err());
    }

    #[test]
    fn only_requester_cancels_pending() {
        let (a, b) = ids();
        let f = Friendship::request(a.clone(), b.clone()).unwrap();
        assert!(f.check_cancel(&a).is_ok());
        assert!(f.check_cancel(&b).is_err());
    }

    #[test]
    fn either_member_removes_accepted() {
        let (a, b) = ids();
        let mut f = Friendship::request(a.clone(), b.clone()).unwrap();
        assert!(f.check_remove(&a).is_err());
        f.accept(&b).unwrap();
        assert!(f.check_remove(&a).is_ok());
        assert!(f.check_remove(&b).is_ok());
        assert!(f.check_remove(&UserId::new("carol")).is_err());
    }

    #[test]
    fn pair_is_unordered() {
        let (a, b) = ids();
        let f = Friendship::request(a.clone(), b.clone()).unwrap();
        assert!(f.is_between(&b, &a));
        assert_eq!(f.other(&b), Some(&a));
        assert_eq!(f.other(&UserId::new("carol")), None);
    }

    #[test]
    fn status_parses_from_storage_form() {
        for s in [
            FriendshipStatus::Pending,
            FriendshipStatus::Accepted,
            FriendshipStatus::Rejected,
        ] {
            assert_eq!(s.as_str().parse::<FriendshipStatus>().unwrap(), s);
        }
        assert!("blocked".parse::<FriendshipStatus>().is_err());
    }
}
