use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::routes::activity::model::{UserActivity, UserStats};

#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub unlocked: bool,
    pub progress: u32,
    pub date: Option<DateTime<Utc>>,
}

fn achievement(
    (id, title, description, icon): (&'static str, &'static str, &'static str, &'static str),
    value: i32,
    target: i32,
    stats: &UserStats,
) -> Achievement {
    let unlocked = value >= target;
    let progress = (i64::from(value.max(0)) * 100 / i64::from(target)).min(100) as u32;
    Achievement {
        id,
        title,
        description,
        icon,
        unlocked,
        progress,
        date: unlocked.then_some(stats.last_activity),
    }
}

/// Badges derived from the user's counters.
pub fn achievements(stats: &UserStats) -> Vec<Achievement> {
    vec![
        achievement(
            ("first_acronym", "First Acronym", "Created your first acronym", "🎯"),
            stats.acronyms_created,
            1,
            stats,
        ),
        achievement(
            ("vote_master", "Vote Master", "Cast 50 votes on acronyms", "🗳️"),
            stats.total_votes,
            50,
            stats,
        ),
        achievement(
            ("popular_creator", "Popular Creator", "Got 100 votes on your acronyms", "⭐"),
            stats.votes_received,
            100,
            stats,
        ),
        achievement(
            ("community_builder", "Community Builder", "Got 10 followers", "👥"),
            stats.followers,
            10,
            stats,
        ),
        achievement(
            ("search_explorer", "Search Explorer", "Made 25 searches", "🔍"),
            stats.search_count,
            25,
            stats,
        ),
    ]
}

/// Activity as shown on the profile page.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub action: String,
    pub acronym: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

impl From<UserActivity> for ActivityEntry {
    fn from(activity: UserActivity) -> Self {
        let description = activity.description();
        Self {
            id: activity.id,
            action: activity.action,
            acronym: activity.acronym,
            timestamp: activity.timestamp,
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(list: &'a [Achievement], id: &str) -> &'a Achievement {
        list.iter().find(|a| a.id == id).unwrap()
    }

    #[test]
    fn fresh_user_has_nothing_unlocked() {
        let list = achievements(&UserStats::empty("u"));
        assert_eq!(list.len(), 5);
        assert!(list.iter().all(|a| !a.unlocked && a.progress == 0 && a.date.is_none()));
    }

    #[test]
    fn progress_is_capped_and_unlocks_at_target() {
        let mut stats = UserStats::empty("u");
        stats.acronyms_created = 3;
        stats.search_count = 10;
        stats.followers = 40;

        let list = achievements(&stats);
        let first = find(&list, "first_acronym");
        assert!(first.unlocked);
        assert_eq!(first.progress, 100);
        assert_eq!(first.date, Some(stats.last_activity));

        let search = find(&list, "search_explorer");
        assert!(!search.unlocked);
        assert_eq!(search.progress, 40);

        assert_eq!(find(&list, "community_builder").progress, 100);
    }

    #[test]
    fn entry_carries_description() {
        let activity = UserActivity::new("u", "voted", "VIBE", None, None);
        let entry = ActivityEntry::from(activity);
        assert_eq!(entry.action, "voted");
        assert_eq!(entry.description, "Voted on \"VIBE\"");
    }
}
