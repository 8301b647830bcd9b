use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use super::source::LeaderboardSource;
use crate::error::SourceError;
use crate::social::{Profile, UserId};

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    pub user_id: UserId,
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub total_secs: u64,
    pub is_viewer: bool,
}

pub struct LeaderboardAggregator<S> {
    source: Arc<S>,
    size: usize,
    fetch_timeout: Option<Duration>,
}

impl<S: LeaderboardSource> LeaderboardAggregator<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            size: DEFAULT_LEADERBOARD_SIZE,
            fetch_timeout: None,
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Bound each per-user total fetch. Without one, a fetch that never
    /// completes holds up the whole board.
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Rank `viewer` and their friends by focus time this week.
    ///
    /// # Errors
    /// Fails only if the viewer's profile or friend list cannot be fetched.
    /// Individual total fetches that fail are dropped from the result.
    pub async fn build(&self, viewer: &UserId) -> Result<Vec<LeaderboardEntry>, SourceError> {
        let me = self.source.profile(viewer).await?;
        let friends = self.source.friends(viewer).await?;

        let mut candidates: HashMap<UserId, Profile> = friends
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        candidates.insert(me.id.clone(), me);

        let mut fetches = JoinSet::new();
        for (id, profile) in candidates {
            let source = Arc::clone(&self.source);
            let timeout = self.fetch_timeout;
            fetches.spawn(async move {
                let total = match timeout {
                    Some(limit) => tokio::time::timeout(limit, source.weekly_total(&id))
                        .await
                        .unwrap_or_else(|_| {
                            Err(SourceError::Timeout {
                                user: id.clone(),
                                timeout: limit,
                            })
                        }),
                    None => source.weekly_total(&id).await,
                };
                (profile, total)
            });
        }

        let mut totals = Vec::new();
        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok((profile, Ok(Some(total)))) => totals.push((profile, total)),
                Ok((profile, Ok(None))) => {
                    tracing::debug!(user = %profile.id, "no weekly total, skipping");
                }
                Ok((profile, Err(e))) => {
                    tracing::warn!(user = %profile.id, "weekly total fetch failed: {e}");
                }
                Err(e) => tracing::warn!("weekly total task failed: {e}"),
            }
        }

        Ok(rank(totals, viewer, self.size))
    }
}

/// Sort by total descending and keep the top `size`.
///
/// Ties go to the nickname that sorts first, then the lower id, so the
/// order does not depend on which fetch finished first.
pub(crate) fn rank(
    mut totals: Vec<(Profile, u64)>,
    viewer: &UserId,
    size: usize,
) -> Vec<LeaderboardEntry> {
    totals.sort_by(|(a, at), (b, bt)| {
        bt.cmp(at)
            .then_with(|| a.nickname.cmp(&b.nickname))
            .then_with(|| a.id.cmp(&b.id))
    });
    totals
        .into_iter()
        .take(size)
        .enumerate()
        .map(|(i, (profile, total_secs))| LeaderboardEntry {
            rank: i + 1,
            is_viewer: &profile.id == viewer,
            user_id: profile.id,
            nickname: profile.nickname,
            image_url: profile.image_url,
            total_secs,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn profile(id: &str) -> Profile {
        Profile::new(UserId::new(id), id).unwrap()
    }

    #[test]
    fn rank_orders_descending_with_stable_ties() {
        let viewer = UserId::new("b");
        let ranked = rank(
            vec![(profile("c"), 10), (profile("a"), 30), (profile("b"), 10)],
            &viewer,
            10,
        );
        let ids: Vec<_> = ranked.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(ranked[0].rank, 1);
        assert!(ranked[1].is_viewer);
        assert!(!ranked[2].is_viewer);
    }

    #[test]
    fn rank_truncates() {
        let totals = (0..15)
            .map(|i| (profile(&format!("u{i:02}")), i as u64))
            .collect();
        let ranked = rank(totals, &UserId::new("u00"), 10);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].total_secs, 14);
        assert_eq!(ranked[9].total_secs, 5);
    }

    #[test]
    fn timeout_error_keeps_sub_second_precision() {
        let err = SourceError::Timeout {
            user: UserId::new("ana"),
            timeout: Duration::from_millis(500),
        };
        assert!(err.to_string().contains("500ms"), "{err}");
    }

    proptest! {
        #[test]
        fn rank_is_sorted_and_bounded(
            totals in proptest::collection::vec(0u64..10_000, 0..40),
            size in 1usize..20,
        ) {
            let input: Vec<_> = totals
                .iter()
                .enumerate()
                .map(|(i, t)| (profile(&format!("u{i}")), *t))
                .collect();
            let ranked = rank(input, &UserId::new("u0"), size);

            prop_assert!(ranked.len() <= size);
            prop_assert_eq!(ranked.len(), totals.len().min(size));
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].total_secs >= pair[1].total_secs);
            }
            for (i, e) in ranked.iter().enumerate() {
                prop_assert_eq!(e.rank, i + 1);
            }
        }
    }
}
