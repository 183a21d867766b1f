use crate::achievements;
use crate::errors::AppError;
use crate::leaderboard::{self, Category};
use crate::models::{
    Achievement, AchievementResponse, Craving, CravingRequest, CravingStatsResponse,
    CravingTrigger, JournalEntry, JournalRequest, LeaderboardResponse, Profile, ProfileRequest,
    ProgressEntry, ProgressRequest,
};
use crate::state::AppState;
use crate::stats::{self, StatsSnapshot, PROGRESS_WINDOW};
use crate::storage::persist_data;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;

const RECENT_CRAVINGS: usize = 10;

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Profile> {
    let data = state.data.lock().await;
    let profile = data
        .users
        .get(&user_id)
        .map(|user| user.profile.clone())
        .unwrap_or_default();
    Json(profile)
}

pub async fn put_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let mut data = state.data.lock().await;
    let profile = {
        let user = data.users.entry(user_id.clone()).or_default();
        user.profile = Profile {
            quit_date: payload.quit_date,
            cigarettes_per_day: payload.cigarettes_per_day,
            cost_per_pack: payload.cost_per_pack,
            cigarettes_per_pack: payload.cigarettes_per_pack,
            quit_method: payload.quit_method,
            reasons_for_quitting: payload.reasons_for_quitting,
            onboarding_completed: true,
        };
        user.profile.clone()
    };

    persist_data(&state.data_path, &data).await?;
    state.notifier.notify_change(&user_id);

    Ok(Json(profile))
}

pub async fn log_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<ProgressRequest>,
) -> Result<Json<ProgressEntry>, AppError> {
    let date = payload.date.unwrap_or_else(today);
    let entry = ProgressEntry {
        date,
        is_smoke_free: payload.is_smoke_free,
        // Smoke-free days cannot also carry a cigarette count.
        cigarettes_smoked: if payload.is_smoke_free {
            0
        } else {
            payload.cigarettes_smoked
        },
        notes: payload.notes,
        mood: payload.mood,
    };

    let mut data = state.data.lock().await;
    data.users
        .entry(user_id.clone())
        .or_default()
        .progress
        .insert(date, entry.clone());

    persist_data(&state.data_path, &data).await?;
    state.notifier.notify_change(&user_id);

    Ok(Json(entry))
}

pub async fn get_today_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Option<ProgressEntry>> {
    let data = state.data.lock().await;
    let entry = data
        .users
        .get(&user_id)
        .and_then(|user| user.progress.get(&today()).cloned());
    Json(entry)
}

pub async fn list_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<ProgressEntry>> {
    let data = state.data.lock().await;
    let entries = data
        .users
        .get(&user_id)
        .map(|user| user.recent_progress(PROGRESS_WINDOW))
        .unwrap_or_default();
    Json(entries)
}

pub async fn log_craving(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<CravingRequest>,
) -> Result<Json<Craving>, AppError> {
    if !(1..=10).contains(&payload.intensity) {
        return Err(AppError::bad_request("intensity must be between 1 and 10"));
    }

    let craving = Craving {
        intensity: payload.intensity,
        trigger: payload.trigger,
        coping_strategy: payload.coping_strategy,
        resisted: payload.resisted,
        notes: payload.notes,
        created_at: Utc::now(),
    };

    let mut data = state.data.lock().await;
    data.users
        .entry(user_id.clone())
        .or_default()
        .cravings
        .push(craving.clone());

    persist_data(&state.data_path, &data).await?;
    state.notifier.notify_change(&user_id);

    Ok(Json(craving))
}

pub async fn get_craving_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<CravingStatsResponse> {
    let data = state.data.lock().await;
    let cravings = data
        .users
        .get(&user_id)
        .map(|user| user.cravings.clone())
        .unwrap_or_default();

    let total = cravings.len() as u64;
    let resisted = cravings.iter().filter(|c| c.resisted).count() as u64;
    let average_intensity = if cravings.is_empty() {
        0.0
    } else {
        cravings.iter().map(|c| f64::from(c.intensity)).sum::<f64>() / cravings.len() as f64
    };

    let mut trigger_counts: BTreeMap<CravingTrigger, u64> = BTreeMap::new();
    for craving in &cravings {
        if let Some(trigger) = craving.trigger {
            *trigger_counts.entry(trigger).or_default() += 1;
        }
    }
    let top_trigger = trigger_counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(trigger, _)| trigger);

    let recent_cravings: Vec<Craving> =
        cravings.iter().rev().take(RECENT_CRAVINGS).cloned().collect();

    Json(CravingStatsResponse {
        total_cravings: total,
        resisted_cravings: resisted,
        success_rate: stats::success_rate(resisted, total),
        average_intensity,
        top_trigger,
        recent_cravings,
    })
}

pub async fn add_journal_entry(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<JournalRequest>,
) -> Result<Json<JournalEntry>, AppError> {
    if payload.content.trim().is_empty() {
        return Err(AppError::bad_request("journal content must not be empty"));
    }

    let entry = JournalEntry {
        title: payload.title,
        content: payload.content,
        mood: payload.mood,
        tags: payload.tags,
        created_at: Utc::now(),
    };

    let mut data = state.data.lock().await;
    data.users
        .entry(user_id.clone())
        .or_default()
        .journal
        .push(entry.clone());

    persist_data(&state.data_path, &data).await?;

    Ok(Json(entry))
}

pub async fn list_journal(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<JournalEntry>> {
    let data = state.data.lock().await;
    let entries = data
        .users
        .get(&user_id)
        .map(|user| user.journal.iter().rev().cloned().collect())
        .unwrap_or_default();
    Json(entries)
}

/// Builds the statistics snapshot and, on the way, persists any milestone
/// achievements the user has newly crossed so the returned count already
/// reflects them. Awarding is idempotent; a second call changes nothing.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<StatsSnapshot>, AppError> {
    let now = Utc::now();
    let mut data = state.data.lock().await;

    let new_achievements: Vec<Achievement> = {
        let user = data.users.entry(user_id.clone()).or_default();
        let days = stats::build_snapshot_at(now, user).days_smoke_free;
        achievements::award(days, &user.achievements, now)
    };

    if !new_achievements.is_empty() {
        for achievement in &new_achievements {
            info!(
                user = %user_id,
                achievement = %achievement.achievement_type,
                "milestone unlocked"
            );
        }
        data.users
            .entry(user_id.clone())
            .or_default()
            .achievements
            .extend(new_achievements);
        persist_data(&state.data_path, &data).await?;
        state.notifier.notify_change(&user_id);
    }

    let snapshot = data
        .users
        .get(&user_id)
        .map(|user| stats::build_snapshot_at(now, user))
        .unwrap_or_default();

    Ok(Json(snapshot))
}

pub async fn list_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<AchievementResponse>> {
    let data = state.data.lock().await;
    let mut earned = data
        .users
        .get(&user_id)
        .map(|user| user.achievements.clone())
        .unwrap_or_default();
    earned.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));

    let responses = earned
        .into_iter()
        .map(|achievement| {
            let (name, description) = achievements::details(&achievement.achievement_type);
            AchievementResponse {
                achievement_type: achievement.achievement_type,
                name: name.to_string(),
                description: description.to_string(),
                earned_at: achievement.earned_at,
            }
        })
        .collect();
    Json(responses)
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub category: Option<String>,
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let category = match query.category.as_deref() {
        None => Category::DaysSmokeFree,
        Some(raw) => Category::parse(raw).ok_or_else(|| {
            AppError::bad_request(
                "category must be one of days_smoke_free, money_saved, \
                 current_streak, cigarettes_not_smoked",
            )
        })?,
    };

    let data = state.data.lock().await;
    let entries = leaderboard::build_leaderboard(&data, category);
    Ok(Json(LeaderboardResponse {
        category: category.as_str().to_string(),
        entries,
    }))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
