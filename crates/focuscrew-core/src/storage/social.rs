//! Profile, friendship and streak-day queries.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::database::{fmt_ts, parse_ts, Database};
use crate::error::{DatabaseError, FriendshipError, Result};
use crate::social::{validate_nickname, Friendship, FriendshipStatus, Profile, UserId};
use crate::streak::{StreakCalendar, DAY_FORMAT};

type ProfileRow = (String, String, Option<String>, Option<u64>, String);
type FriendshipRow = (String, String, String, String);

fn profile_row(row: &Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn friendship_row(row: &Row<'_>) -> rusqlite::Result<FriendshipRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn to_friendship((user1, user2, status, created_at): FriendshipRow) -> Result<Friendship> {
    let status = status
        .parse::<FriendshipStatus>()
        .map_err(DatabaseError::QueryFailed)?;
    Ok(Friendship {
        user1: UserId::new(user1),
        user2: UserId::new(user2),
        status,
        created_at: parse_ts(&created_at)?,
    })
}

const PROFILE_COLUMNS: &str = "p.id, p.nickname, p.image_url, p.total_work_secs, p.created_at";

impl Database {
    // ── Profiles ─────────────────────────────────────────────────────

    /// Store a new profile with its streak days, all or nothing.
    ///
    /// # Errors
    /// Returns [`DatabaseError::AlreadyExists`] if the id is taken.
    pub fn create_profile(&self, profile: &Profile) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO profiles (id, nickname, image_url, total_work_secs, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                profile.id.as_str(),
                profile.nickname,
                profile.image_url,
                profile.total_work_secs,
                fmt_ts(profile.created_at),
            ],
        )?;
        if inserted == 0 {
            return Err(DatabaseError::AlreadyExists {
                entity: "profile",
                id: profile.id.to_string(),
            }
            .into());
        }
        if let Some(days) = &profile.streak_days {
            for day in StreakCalendar::from_strings(days).days() {
                tx.execute(
                    "INSERT OR IGNORE INTO streak_days (user_id, day) VALUES (?1, ?2)",
                    params![profile.id.as_str(), day.format(DAY_FORMAT).to_string()],
                )?;
            }
        }
        tx.commit()?;
        tracing::info!(user = %profile.id, "profile created");
        Ok(())
    }

    pub fn find_profile(&self, id: &UserId) -> Result<Option<Profile>> {
        let row = self
            .conn()
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles p WHERE p.id = ?1"),
                params![id.as_str()],
                profile_row,
            )
            .optional()?;
        match row {
            Some(row) => Ok(Some(self.to_profile(row)?)),
            None => Ok(None),
        }
    }

    /// # Errors
    /// Returns [`DatabaseError::NotFound`] if there is no such profile.
    pub fn profile(&self, id: &UserId) -> Result<Profile> {
        self.find_profile(id)?.ok_or_else(|| {
            DatabaseError::NotFound {
                entity: "profile",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// `id`'s profile with `friendship` filled in relative to `viewer`.
    pub fn profile_for_viewer(&self, viewer: &UserId, id: &UserId) -> Result<Profile> {
        let mut profile = self.profile(id)?;
        if viewer != id {
            profile.friendship = self.friendship(viewer, id)?.map(|f| f.status);
        }
        Ok(profile)
    }

    pub fn rename(&self, id: &UserId, nickname: &str) -> Result<()> {
        let nickname = validate_nickname(nickname)?;
        self.update_profile(
            id,
            "UPDATE profiles SET nickname = ?2 WHERE id = ?1",
            Some(nickname),
        )
    }

    /// Set or clear the profile image URL.
    pub fn set_image_url(&self, id: &UserId, url: Option<&str>) -> Result<()> {
        self.update_profile(
            id,
            "UPDATE profiles SET image_url = ?2 WHERE id = ?1",
            url.map(str::to_string),
        )
    }

    fn update_profile(&self, id: &UserId, sql: &str, value: Option<String>) -> Result<()> {
        let updated = self.conn().execute(sql, params![id.as_str(), value])?;
        if updated == 0 {
            return Err(DatabaseError::NotFound {
                entity: "profile",
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Remove a user and everything that references them.
    pub fn delete_account(&self, id: &UserId) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM profiles WHERE id = ?1", params![id.as_str()])?;
        if removed == 0 {
            return Err(DatabaseError::NotFound {
                entity: "profile",
                id: id.to_string(),
            }
            .into());
        }
        tx.execute("DELETE FROM sessions WHERE user_id = ?1", params![id.as_str()])?;
        tx.execute("DELETE FROM streak_days WHERE user_id = ?1", params![id.as_str()])?;
        tx.execute(
            "DELETE FROM friendships WHERE user1 = ?1 OR user2 = ?1",
            params![id.as_str()],
        )?;
        tx.commit()?;
        tracing::info!(user = %id, "account deleted");
        Ok(())
    }

    fn to_profile(&self, row: ProfileRow) -> Result<Profile> {
        let (id, nickname, image_url, total_work_secs, created_at) = row;
        let id = UserId::new(id);
        let days = self.streak_calendar(&id)?.to_strings();
        Ok(Profile {
            nickname,
            image_url,
            total_work_secs,
            streak_days: (!days.is_empty()).then_some(days),
            friendship: None,
            created_at: parse_ts(&created_at)?,
            id,
        })
    }

    // ── Streak days ──────────────────────────────────────────────────

    pub fn add_streak_day(&self, id: &UserId, day: NaiveDate) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO streak_days (user_id, day) VALUES (?1, ?2)",
            params![id.as_str(), day.format(DAY_FORMAT).to_string()],
        )?;
        Ok(())
    }

    pub fn streak_calendar(&self, id: &UserId) -> Result<StreakCalendar> {
        let mut stmt = self
            .conn()
            .prepare("SELECT day FROM streak_days WHERE user_id = ?1")?;
        let days = stmt
            .query_map(params![id.as_str()], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(StreakCalendar::from_strings(&days))
    }

    // ── Friendships ──────────────────────────────────────────────────

    /// The friendship between `a` and `b`, in either direction.
    pub fn friendship(&self, a: &UserId, b: &UserId) -> Result<Option<Friendship>> {
        let row = self
            .conn()
            .query_row(
                "SELECT user1, user2, status, created_at FROM friendships
                 WHERE (user1 = ?1 AND user2 = ?2) OR (user1 = ?2 AND user2 = ?1)",
                params![a.as_str(), b.as_str()],
                friendship_row,
            )
            .optional()?;
        row.map(to_friendship).transpose()
    }

    /// Send a friend request from `from` to `to`.
    ///
    /// A previously rejected request between the pair is replaced.
    ///
    /// # Errors
    /// Fails if either profile is missing, the ids are equal, or the pair
    /// already has a pending or accepted friendship.
    pub fn send_friend_request(&self, from: &UserId, to: &UserId) -> Result<Friendship> {
        let request = Friendship::request(from.clone(), to.clone())?;
        self.profile(from)?;
        self.profile(to)?;

        let tx = self.conn().unchecked_transaction()?;
        if let Some(existing) = self.friendship(from, to)? {
            if existing.status != FriendshipStatus::Rejected {
                return Err(FriendshipError::AlreadyExists(from.clone(), to.clone()).into());
            }
            tx.execute(
                "DELETE FROM friendships WHERE user1 = ?1 AND user2 = ?2",
                params![existing.user1.as_str(), existing.user2.as_str()],
            )?;
        }
        tx.execute(
            "INSERT INTO friendships (user1, user2, status, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                request.user1.as_str(),
                request.user2.as_str(),
                request.status.as_str(),
                fmt_ts(request.created_at),
            ],
        )?;
        tx.commit()?;
        tracing::info!(from = %from, to = %to, "friend request sent");
        Ok(request)
    }

    /// `by` accepts the pending request that `from` sent them.
    pub fn accept_friend_request(&self, by: &UserId, from: &UserId) -> Result<Friendship> {
        let mut f = self.incoming_request(by, from)?;
        f.accept(by)?;
        self.store_status(&f)?;
        tracing::info!(from = %from, by = %by, "friend request accepted");
        Ok(f)
    }

    /// `by` rejects the pending request that `from` sent them.
    pub fn reject_friend_request(&self, by: &UserId, from: &UserId) -> Result<Friendship> {
        let mut f = self.incoming_request(by, from)?;
        f.reject(by)?;
        self.store_status(&f)?;
        tracing::info!(from = %from, by = %by, "friend request rejected");
        Ok(f)
    }

    /// `by` withdraws the pending request they sent to `to`.
    pub fn cancel_friend_request(&self, by: &UserId, to: &UserId) -> Result<()> {
        let f = self
            .friendship(by, to)?
            .ok_or_else(|| FriendshipError::NotFound(by.clone(), to.clone()))?;
        f.check_cancel(by)?;
        self.delete_friendship(&f)?;
        tracing::info!(from = %by, to = %to, "friend request cancelled");
        Ok(())
    }

    /// End an accepted friendship. Either member may do this.
    pub fn remove_friend(&self, by: &UserId, friend: &UserId) -> Result<()> {
        let f = self
            .friendship(by, friend)?
            .ok_or_else(|| FriendshipError::NotFound(by.clone(), friend.clone()))?;
        f.check_remove(by)?;
        self.delete_friendship(&f)?;
        tracing::info!(by = %by, friend = %friend, "friend removed");
        Ok(())
    }

    /// Profiles of everyone with an accepted friendship with `user`,
    /// ordered by nickname.
    pub fn friends(&self, user: &UserId) -> Result<Vec<Profile>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM friendships f
             JOIN profiles p
               ON p.id = CASE WHEN f.user1 = ?1 THEN f.user2 ELSE f.user1 END
             WHERE (f.user1 = ?1 OR f.user2 = ?1) AND f.status = 'accepted'
             ORDER BY p.nickname, p.id"
        ))?;
        let rows = stmt
            .query_map(params![user.as_str()], profile_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|row| {
                let mut p = self.to_profile(row)?;
                p.friendship = Some(FriendshipStatus::Accepted);
                Ok(p)
            })
            .collect()
    }

    /// Pending requests addressed to `user`, oldest first.
    pub fn incoming_requests(&self, user: &UserId) -> Result<Vec<Friendship>> {
        self.friendships_where("user2 = ?1 AND status = 'pending'", user)
    }

    /// Pending requests sent by `user`, oldest first.
    pub fn outgoing_requests(&self, user: &UserId) -> Result<Vec<Friendship>> {
        self.friendships_where("user1 = ?1 AND status = 'pending'", user)
    }

    fn friendships_where(&self, clause: &str, user: &UserId) -> Result<Vec<Friendship>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT user1, user2, status, created_at FROM friendships
             WHERE {clause} ORDER BY created_at, user1, user2"
        ))?;
        let rows = stmt
            .query_map(params![user.as_str()], friendship_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(to_friendship).collect()
    }

    fn incoming_request(&self, by: &UserId, from: &UserId) -> Result<Friendship> {
        match self.friendship(by, from)? {
            Some(f) if &f.user1 == from => Ok(f),
            Some(_) => Err(FriendshipError::NotParticipant {
                user: by.clone(),
                action: "answer",
            }
            .into()),
            None => Err(FriendshipError::NotFound(from.clone(), by.clone()).into()),
        }
    }

    fn store_status(&self, f: &Friendship) -> Result<()> {
        self.conn().execute(
            "UPDATE friendships SET status = ?3 WHERE user1 = ?1 AND user2 = ?2",
            params![f.user1.as_str(), f.user2.as_str(), f.status.as_str()],
        )?;
        Ok(())
    }

    fn delete_friendship(&self, f: &Friendship) -> Result<()> {
        self.conn().execute(
            "DELETE FROM friendships WHERE user1 = ?1 AND user2 = ?2",
            params![f.user1.as_str(), f.user2.as_str()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with(users: &[&str]) -> Database {
        let db = Database::open_memory().unwrap();
        for u in users {
            db.create_profile(&Profile::new(UserId::new(*u), u).unwrap())
                .unwrap();
        }
        db
    }

    fn id(s: &str) -> UserId {
        UserId::new(s)
    }

    #[test]
    fn duplicate_profile_rejected() {
        let db = db_with(&["ana"]);
        let err = db
            .create_profile(&Profile::new(id("ana"), "other").unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn failed_streak_insert_leaves_no_profile() {
        let db = Database::open_memory().unwrap();
        db.conn().execute_batch("DROP TABLE streak_days").unwrap();

        let mut profile = Profile::new(id("ana"), "Ana").unwrap();
        profile.streak_days = Some(vec!["2024-05-01".into()]);
        assert!(db.create_profile(&profile).is_err());

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM profiles WHERE id = 'ana'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn rename_and_image() {
        let db = db_with(&["ana"]);
        db.rename(&id("ana"), "  Ana B ").unwrap();
        db.set_image_url(&id("ana"), Some("https://img.example/ana.png"))
            .unwrap();
        let p = db.profile(&id("ana")).unwrap();
        assert_eq!(p.nickname, "Ana B");
        assert_eq!(p.image_url.as_deref(), Some("https://img.example/ana.png"));

        db.set_image_url(&id("ana"), None).unwrap();
        assert!(db.profile(&id("ana")).unwrap().image_url.is_none());
        assert!(db.rename(&id("ana"), "").is_err());
        assert!(db.rename(&id("nobody"), "x").is_err());
    }

    #[test]
    fn request_accept_flow() {
        let db = db_with(&["ana", "ben"]);
        db.send_friend_request(&id("ana"), &id("ben")).unwrap();

        assert_eq!(db.incoming_requests(&id("ben")).unwrap().len(), 1);
        assert_eq!(db.outgoing_requests(&id("ana")).unwrap().len(), 1);
        assert!(db.friends(&id("ana")).unwrap().is_empty());

        let viewed = db.profile_for_viewer(&id("ben"), &id("ana")).unwrap();
        assert_eq!(viewed.friendship, Some(FriendshipStatus::Pending));

        db.accept_friend_request(&id("ben"), &id("ana")).unwrap();
        let friends = db.friends(&id("ana")).unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].id, id("ben"));
        assert_eq!(db.friends(&id("ben")).unwrap()[0].id, id("ana"));
        assert!(db.incoming_requests(&id("ben")).unwrap().is_empty());
    }

    #[test]
    fn duplicate_request_in_either_direction_fails() {
        let db = db_with(&["ana", "ben"]);
        db.send_friend_request(&id("ana"), &id("ben")).unwrap();
        assert!(db.send_friend_request(&id("ana"), &id("ben")).is_err());
        assert!(db.send_friend_request(&id("ben"), &id("ana")).is_err());
    }

    #[test]
    fn rejected_request_can_be_resent() {
        let db = db_with(&["ana", "ben"]);
        db.send_friend_request(&id("ana"), &id("ben")).unwrap();
        db.reject_friend_request(&id("ben"), &id("ana")).unwrap();
        assert_eq!(
            db.friendship(&id("ana"), &id("ben")).unwrap().unwrap().status,
            FriendshipStatus::Rejected
        );

        let f = db.send_friend_request(&id("ben"), &id("ana")).unwrap();
        assert_eq!(f.user1, id("ben"));
        assert_eq!(f.status, FriendshipStatus::Pending);
    }

    #[test]
    fn requester_cannot_accept() {
        let db = db_with(&["ana", "ben"]);
        db.send_friend_request(&id("ana"), &id("ben")).unwrap();
        assert!(db.accept_friend_request(&id("ana"), &id("ben")).is_err());
    }

    #[test]
    fn cancel_removes_pending_only() {
        let db = db_with(&["ana", "ben"]);
        db.send_friend_request(&id("ana"), &id("ben")).unwrap();
        assert!(db.cancel_friend_request(&id("ben"), &id("ana")).is_err());
        db.cancel_friend_request(&id("ana"), &id("ben")).unwrap();
        assert!(db.friendship(&id("ana"), &id("ben")).unwrap().is_none());
        assert!(db.cancel_friend_request(&id("ana"), &id("ben")).is_err());
    }

    #[test]
    fn remove_friend() {
        let db = db_with(&["ana", "ben"]);
        db.send_friend_request(&id("ana"), &id("ben")).unwrap();
        db.accept_friend_request(&id("ben"), &id("ana")).unwrap();
        db.remove_friend(&id("ben"), &id("ana")).unwrap();
        assert!(db.friends(&id("ana")).unwrap().is_empty());
    }

    #[test]
    fn request_to_unknown_or_self_fails() {
        let db = db_with(&["ana"]);
        assert!(db.send_friend_request(&id("ana"), &id("ghost")).is_err());
        assert!(db.send_friend_request(&id("ana"), &id("ana")).is_err());
    }

    #[test]
    fn delete_account_cascades() {
        let db = db_with(&["ana", "ben"]);
        db.send_friend_request(&id("ana"), &id("ben")).unwrap();
        db.accept_friend_request(&id("ben"), &id("ana")).unwrap();
        let now = chrono::Utc::now();
        db.record_session(&id("ana"), "", 60, now, now).unwrap();

        db.delete_account(&id("ana")).unwrap();
        assert!(db.find_profile(&id("ana")).unwrap().is_none());
        assert!(db.friends(&id("ben")).unwrap().is_empty());
        assert!(db.sessions(&id("ana"), 10).unwrap().is_empty());
        assert!(db.streak_calendar(&id("ana")).unwrap().is_empty());
    }

    #[test]
    fn streak_days_normalized_on_create() {
        let db = Database::open_memory().unwrap();
        let mut p = Profile::new(id("ana"), "ana").unwrap();
        p.streak_days = Some(vec![
            "2025-05-01T22:00:00Z".into(),
            "2025-05-01".into(),
            "2025-05-02".into(),
        ]);
        db.create_profile(&p).unwrap();
        let stored = db.profile(&id("ana")).unwrap();
        assert_eq!(
            stored.streak_days,
            Some(vec!["2025-05-01".to_string(), "2025-05-02".to_string()])
        );
    }
}
