use crate::models::AppData;
use crate::stats;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

/// A write happened for this user; their snapshot should be re-evaluated.
#[derive(Debug)]
pub struct ChangeEvent {
    pub user_id: String,
}

/// Handle the write handlers use to signal changes. Constructed once in the
/// composition root and injected through `AppState`; there is no global
/// instance. Events are fire-and-forget: the snapshot recomputation is
/// idempotent, so dropping one under backpressure loses nothing.
#[derive(Clone)]
pub struct NotificationService {
    tx: mpsc::Sender<ChangeEvent>,
}

impl NotificationService {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ChangeEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn notify_change(&self, user_id: &str) {
        let event = ChangeEvent {
            user_id: user_id.to_string(),
        };
        if let Err(err) = self.tx.try_send(event) {
            debug!("dropping change event: {err}");
        }
    }
}

pub fn debounce_interval() -> Duration {
    let millis = std::env::var("NOTIFY_DEBOUNCE_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(500);
    Duration::from_millis(millis)
}

/// Background loop: waits for a change event, sleeps out the debounce
/// window while collecting the rest of the burst, then recomputes one
/// snapshot per distinct user and announces day-count changes. Rapid
/// successive writes therefore cost one recomputation, not one each.
pub async fn run(
    mut rx: mpsc::Receiver<ChangeEvent>,
    data: Arc<Mutex<AppData>>,
    debounce: Duration,
) {
    let mut last_seen_days: BTreeMap<String, u32> = BTreeMap::new();

    while let Some(event) = rx.recv().await {
        let mut users = BTreeSet::new();
        users.insert(event.user_id);

        tokio::time::sleep(debounce).await;
        while let Ok(event) = rx.try_recv() {
            users.insert(event.user_id);
        }

        let data = data.lock().await;
        for user_id in users {
            let Some(user) = data.users.get(&user_id) else {
                continue;
            };
            let snapshot = stats::build_snapshot(user);
            let previous = last_seen_days.insert(user_id.clone(), snapshot.days_smoke_free);
            if previous != Some(snapshot.days_smoke_free) {
                info!(
                    user = %user_id,
                    days = snapshot.days_smoke_free,
                    streak = snapshot.current_streak,
                    "{}",
                    motivational_message(snapshot.days_smoke_free)
                );
            }
        }
    }
}

/// Short encouragement keyed to how far along the user is.
pub fn motivational_message(days_smoke_free: u32) -> String {
    match days_smoke_free {
        0 => "Today is the beginning of your new life!".to_string(),
        1 => "You did it! One full day smoke-free!".to_string(),
        2..=6 => format!("{days_smoke_free} days strong! Keep going!"),
        7..=29 => format!("{days_smoke_free} days of freedom! You're amazing!"),
        30..=89 => format!("{days_smoke_free} days smoke-free! You've got this!"),
        90..=364 => format!("{days_smoke_free} days of pure victory!"),
        _ => {
            let years = days_smoke_free / 365;
            let remaining = days_smoke_free % 365;
            if years == 1 && remaining == 0 {
                "One full year smoke-free! Incredible achievement!".to_string()
            } else if years > 1 {
                format!("{years} years and {remaining} days smoke-free! Legend!")
            } else {
                format!("1 year and {remaining} days smoke-free! Legend!")
            }
        }
    }
}
