use crate::models::{ProgressEntry, UserData};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pack size substituted when the profile leaves it unset or zero.
pub const DEFAULT_CIGARETTES_PER_PACK: u32 = 20;

/// Average time spent on one cigarette, used for the time-regained figure.
const MINUTES_PER_CIGARETTE: u64 = 5;

/// The streak evaluator only looks at the most recent entries.
pub const PROGRESS_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSinceQuit {
    pub days: u32,
    /// Remainder component, 0-23.
    pub hours: u32,
    /// Remainder component, 0-59.
    pub minutes: u32,
    pub is_in_future: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub days_smoke_free: u32,
    /// Total elapsed hours, not a remainder.
    pub hours_smoke_free: u64,
    /// Total elapsed minutes, not a remainder.
    pub minutes_smoke_free: u64,
    pub money_saved: f64,
    pub cigarettes_not_smoked: u64,
    pub time_regained_hours: u64,
    pub current_streak: u32,
    pub total_cravings: u64,
    pub resisted_cravings: u64,
    pub success_rate: f64,
    pub achievement_count: u64,
    pub time_since_quit: TimeSinceQuit,
}

/// Elapsed time since the quit instant, split into whole days plus
/// hour/minute remainders. A quit date in the future yields all-zero
/// counters and `is_in_future`; negative durations are never produced.
pub fn time_since_quit(quit: DateTime<Utc>, now: DateTime<Utc>) -> TimeSinceQuit {
    if quit > now {
        return TimeSinceQuit {
            is_in_future: true,
            ..TimeSinceQuit::default()
        };
    }

    let elapsed = now - quit;
    TimeSinceQuit {
        days: elapsed.num_days() as u32,
        hours: (elapsed.num_hours() % 24) as u32,
        minutes: (elapsed.num_minutes() % 60) as u32,
        is_in_future: false,
    }
}

/// Cigarettes avoided over `days` elapsed whole days.
pub fn cigarettes_avoided(days: u32, cigarettes_per_day: u32) -> u64 {
    u64::from(days) * u64::from(cigarettes_per_day)
}

/// Money saved at full precision; rounding happens at snapshot assembly.
/// A zero or unset pack size falls back to the universal default of 20
/// so the division can never blow up.
pub fn money_saved(avoided: u64, cost_per_pack: f64, cigarettes_per_pack: u32) -> f64 {
    let pack_size = if cigarettes_per_pack == 0 {
        DEFAULT_CIGARETTES_PER_PACK
    } else {
        cigarettes_per_pack
    };
    let packs = avoided as f64 / f64::from(pack_size);
    packs * cost_per_pack
}

/// Current consecutive smoke-free streak from a most-recent-first log.
/// Stops at the first non-smoke-free entry. Duplicate dates cannot occur
/// under the upsert-by-date invariant and are not deduplicated here.
pub fn calculate_streak(entries: &[ProgressEntry]) -> u32 {
    let mut streak = 0;
    for entry in entries.iter().take(PROGRESS_WINDOW) {
        if entry.is_smoke_free {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Craving success rate in percent. No cravings logged counts as perfect
/// success (100), never NaN or zero.
pub fn success_rate(resisted: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        resisted as f64 / total as f64 * 100.0
    }
}

pub fn build_snapshot(user: &UserData) -> StatsSnapshot {
    build_snapshot_at(Utc::now(), user)
}

/// The single aggregation entry point: pure, reads the user's data and the
/// supplied instant, returns a complete snapshot. Never errors; missing
/// profile fields are defaulted to zero instead.
pub fn build_snapshot_at(now: DateTime<Utc>, user: &UserData) -> StatsSnapshot {
    let profile = &user.profile;
    let cigarettes_per_day = profile.cigarettes_per_day.unwrap_or(0);
    let cost_per_pack = profile.cost_per_pack.unwrap_or(0.0);
    let cigarettes_per_pack = profile.cigarettes_per_pack.unwrap_or(0);

    let time = match profile.quit_date {
        Some(quit) => time_since_quit(quit, now),
        None => TimeSinceQuit::default(),
    };

    let progress = user.recent_progress(PROGRESS_WINDOW);

    let (days, total_hours, total_minutes) = match profile.quit_date {
        Some(quit) if !time.is_in_future => {
            let elapsed = now - quit;
            (
                time.days,
                elapsed.num_hours() as u64,
                elapsed.num_minutes() as u64,
            )
        }
        _ => (0, 0, 0),
    };

    let avoided = cigarettes_avoided(days, cigarettes_per_day);
    let saved = money_saved(avoided, cost_per_pack, cigarettes_per_pack);
    let regained_hours =
        ((avoided * MINUTES_PER_CIGARETTE) as f64 / 60.0).round() as u64;

    // With no log at all the streak is optimistically assumed to cover every
    // day since quitting, day zero included. A relapse the user never logged
    // therefore goes unnoticed; see DESIGN.md. A future-dated quit zeroes
    // the streak along with every other counter.
    let current_streak = if time.is_in_future {
        0
    } else if !progress.is_empty() {
        calculate_streak(&progress)
    } else if profile.quit_date.is_some() {
        time.days + 1
    } else {
        0
    };

    let total_cravings = user.cravings.len() as u64;
    let resisted_cravings = user.cravings.iter().filter(|c| c.resisted).count() as u64;

    StatsSnapshot {
        days_smoke_free: days,
        hours_smoke_free: total_hours,
        minutes_smoke_free: total_minutes,
        money_saved: saved.round(),
        cigarettes_not_smoked: avoided,
        time_regained_hours: regained_hours,
        current_streak,
        total_cravings,
        resisted_cravings,
        success_rate: success_rate(resisted_cravings, total_cravings),
        achievement_count: user.achievements.len() as u64,
        time_since_quit: time,
    }
}
