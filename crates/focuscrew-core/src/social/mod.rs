//! Social graph: user profiles and friendships.

mod friendship;
mod profile;

pub use friendship::{Friendship, FriendshipStatus};
pub use profile::{validate_nickname, Profile, UserId, MAX_NICKNAME_LEN};
