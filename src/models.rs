use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuitMethod {
    ColdTurkey,
    Gradual,
    Nrt,
    Prescription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CravingTrigger {
    Stress,
    Social,
    Routine,
    Boredom,
    Alcohol,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Excellent,
    Good,
    Okay,
    Difficult,
    Terrible,
}

/// Per-user smoking habit record. Numeric fields are optional; partial
/// profiles are a normal steady state and default to zero in calculations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    pub quit_date: Option<DateTime<Utc>>,
    pub cigarettes_per_day: Option<u32>,
    pub cost_per_pack: Option<f64>,
    pub cigarettes_per_pack: Option<u32>,
    pub quit_method: Option<QuitMethod>,
    #[serde(default)]
    pub reasons_for_quitting: Vec<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

/// One row per user per calendar date, upserted by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub date: NaiveDate,
    pub is_smoke_free: bool,
    pub cigarettes_smoked: u32,
    pub notes: Option<String>,
    pub mood: Option<Mood>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craving {
    pub intensity: u8,
    pub trigger: Option<CravingTrigger>,
    pub coping_strategy: Option<String>,
    pub resisted: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub achievement_type: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub title: Option<String>,
    pub content: String,
    pub mood: Option<Mood>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserData {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub progress: BTreeMap<NaiveDate, ProgressEntry>,
    #[serde(default)]
    pub cravings: Vec<Craving>,
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

impl UserData {
    /// Progress entries most-recent-first, capped to the evaluation window.
    pub fn recent_progress(&self, limit: usize) -> Vec<ProgressEntry> {
        self.progress.values().rev().take(limit).cloned().collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub users: BTreeMap<String, UserData>,
}

// Request payloads.

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub quit_date: Option<DateTime<Utc>>,
    pub cigarettes_per_day: Option<u32>,
    pub cost_per_pack: Option<f64>,
    pub cigarettes_per_pack: Option<u32>,
    pub quit_method: Option<QuitMethod>,
    #[serde(default)]
    pub reasons_for_quitting: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub date: Option<NaiveDate>,
    pub is_smoke_free: bool,
    #[serde(default)]
    pub cigarettes_smoked: u32,
    pub notes: Option<String>,
    pub mood: Option<Mood>,
}

#[derive(Debug, Deserialize)]
pub struct CravingRequest {
    pub intensity: u8,
    pub trigger: Option<CravingTrigger>,
    pub coping_strategy: Option<String>,
    #[serde(default)]
    pub resisted: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JournalRequest {
    pub title: Option<String>,
    pub content: String,
    pub mood: Option<Mood>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// Response payloads.

#[derive(Debug, Serialize, Deserialize)]
pub struct CravingStatsResponse {
    pub total_cravings: u64,
    pub resisted_cravings: u64,
    pub success_rate: f64,
    pub average_intensity: f64,
    pub top_trigger: Option<CravingTrigger>,
    pub recent_cravings: Vec<Craving>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AchievementResponse {
    pub achievement_type: String,
    pub name: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub days_smoke_free: u32,
    pub money_saved: f64,
    pub current_streak: u32,
    pub cigarettes_not_smoked: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub category: String,
    pub entries: Vec<LeaderboardEntry>,
}
