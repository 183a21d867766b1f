use crate::models::Achievement;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Fixed ascending milestone table: identifier and the smoke-free day count
/// that unlocks it.
pub const THRESHOLDS: [(&str, u32); 8] = [
    ("first_day", 1),
    ("nicotine_fighter", 3),
    ("week_champion", 7),
    ("two_weeks", 14),
    ("month_master", 30),
    ("three_months", 90),
    ("half_year", 180),
    ("year_hero", 365),
];

/// Milestones newly crossed: met by `days_smoke_free` but absent from the
/// already-earned set. Thresholds are checked independently, so a user
/// returning after a long absence can unlock several at once. Re-running
/// with the same inputs after the result has been persisted yields nothing.
pub fn newly_earned<'a>(
    days_smoke_free: u32,
    earned: impl IntoIterator<Item = &'a str>,
) -> Vec<&'static str> {
    if days_smoke_free < 1 {
        return Vec::new();
    }
    let earned: BTreeSet<&str> = earned.into_iter().collect();
    THRESHOLDS
        .iter()
        .filter(|(kind, threshold)| days_smoke_free >= *threshold && !earned.contains(kind))
        .map(|(kind, _)| *kind)
        .collect()
}

/// All freshly awarded records, stamped with the evaluation instant. The
/// timestamp is deliberately not back-dated to when the threshold was in
/// fact crossed; see DESIGN.md.
pub fn award(
    days_smoke_free: u32,
    existing: &[Achievement],
    now: DateTime<Utc>,
) -> Vec<Achievement> {
    let earned = existing.iter().map(|a| a.achievement_type.as_str());
    newly_earned(days_smoke_free, earned)
        .into_iter()
        .map(|kind| Achievement {
            achievement_type: kind.to_string(),
            earned_at: now,
        })
        .collect()
}

/// Display name and description for a milestone identifier.
pub fn details(kind: &str) -> (&'static str, &'static str) {
    match kind {
        "first_day" => ("First Day Hero", "24 hours smoke-free!"),
        "nicotine_fighter" => ("Nicotine Fighter", "3 days - worst cravings behind you!"),
        "week_champion" => ("Week Champion", "1 week smoke-free milestone!"),
        "two_weeks" => ("Two Week Warrior", "2 weeks of freedom!"),
        "month_master" => ("Month Master", "30 days of smoke-free living!"),
        "three_months" => ("Quarter Champion", "3 months of healthy choices!"),
        "half_year" => ("Half Year Hero", "6 months smoke-free!"),
        "year_hero" => ("Year Hero", "One full year of freedom!"),
        _ => ("Milestone", "Achievement unlocked!"),
    }
}
