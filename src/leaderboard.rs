use crate::models::{AppData, LeaderboardEntry};
use crate::stats;
use chrono::{DateTime, Utc};

/// Ranking categories the leaderboard can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    DaysSmokeFree,
    MoneySaved,
    CurrentStreak,
    CigarettesNotSmoked,
}

impl Category {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "days_smoke_free" => Some(Self::DaysSmokeFree),
            "money_saved" => Some(Self::MoneySaved),
            "current_streak" => Some(Self::CurrentStreak),
            "cigarettes_not_smoked" => Some(Self::CigarettesNotSmoked),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DaysSmokeFree => "days_smoke_free",
            Self::MoneySaved => "money_saved",
            Self::CurrentStreak => "current_streak",
            Self::CigarettesNotSmoked => "cigarettes_not_smoked",
        }
    }
}

const MAX_ENTRIES: usize = 50;

pub fn build_leaderboard(data: &AppData, category: Category) -> Vec<LeaderboardEntry> {
    build_leaderboard_at(Utc::now(), data, category)
}

/// Rank every user with a quit date set, best first, capped to 50 entries.
/// Each entry is derived from the same snapshot the dashboard sees.
pub fn build_leaderboard_at(
    now: DateTime<Utc>,
    data: &AppData,
    category: Category,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = data
        .users
        .iter()
        .filter(|(_, user)| user.profile.quit_date.is_some())
        .map(|(id, user)| {
            let snapshot = stats::build_snapshot_at(now, user);
            LeaderboardEntry {
                user_id: id.clone(),
                days_smoke_free: snapshot.days_smoke_free,
                money_saved: snapshot.money_saved,
                current_streak: snapshot.current_streak,
                cigarettes_not_smoked: snapshot.cigarettes_not_smoked,
            }
        })
        .collect();

    entries.sort_by(|a, b| match category {
        Category::DaysSmokeFree => b.days_smoke_free.cmp(&a.days_smoke_free),
        Category::MoneySaved => b
            .money_saved
            .partial_cmp(&a.money_saved)
            .unwrap_or(std::cmp::Ordering::Equal),
        Category::CurrentStreak => b.current_streak.cmp(&a.current_streak),
        Category::CigarettesNotSmoked => b.cigarettes_not_smoked.cmp(&a.cigarettes_not_smoked),
    });

    entries.truncate(MAX_ENTRIES);
    entries
}
