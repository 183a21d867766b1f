use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use quit_companion::models::{
    AchievementResponse, CravingStatsResponse, LeaderboardResponse, ProgressEntry,
};
use quit_companion::stats::StatsSnapshot;
use reqwest::Client;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::time::sleep;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "quit_companion_http_{}_{}.json",
        std::process::id(),
        nanos
    ));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + std::time::Duration::from_secs(3);
    loop {
        if let Ok(resp) = client
            .get(format!("{base_url}/api/users/probe/profile"))
            .send()
            .await
        {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(std::time::Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_quit_companion"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn onboard(client: &Client, base_url: &str, user: &str, days_ago: i64) {
    // Nudged a minute past the day boundary so elapsed whole days are stable.
    let quit_date = Utc::now() - Duration::days(days_ago) - Duration::minutes(1);
    let response = client
        .put(format!("{base_url}/api/users/{user}/profile"))
        .json(&serde_json::json!({
            "quit_date": quit_date,
            "cigarettes_per_day": 20,
            "cost_per_pack": 10.0,
            "cigarettes_per_pack": 20,
            "quit_method": "cold_turkey",
            "reasons_for_quitting": ["Health concerns", "Save money"]
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn http_stats_reflect_profile_and_award_achievements() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    onboard(&client, &server.base_url, "stats-user", 10).await;

    let snapshot: StatsSnapshot = client
        .get(format!("{}/api/users/stats-user/stats", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(snapshot.days_smoke_free, 10);
    assert_eq!(snapshot.cigarettes_not_smoked, 200);
    assert_eq!(snapshot.money_saved, 100.0);
    assert_eq!(snapshot.current_streak, 11);
    assert_eq!(snapshot.success_rate, 100.0);
    assert!(!snapshot.time_since_quit.is_in_future);
    // Day 10 crosses the 1, 3 and 7 day milestones.
    assert_eq!(snapshot.achievement_count, 3);

    let again: StatsSnapshot = client
        .get(format!("{}/api/users/stats-user/stats", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again.achievement_count, 3);

    let achievements: Vec<AchievementResponse> = client
        .get(format!(
            "{}/api/users/stats-user/achievements",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(achievements.len(), 3);
    assert!(achievements
        .iter()
        .any(|a| a.achievement_type == "week_champion"));
}

#[tokio::test]
async fn http_progress_upserts_by_date_and_drives_streak() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    onboard(&client, &server.base_url, "progress-user", 5).await;

    let today = Utc::now().date_naive();
    for (days_ago, smoke_free, cigarettes) in [(2i64, false, 4u32), (1, true, 0), (0, true, 0)] {
        let response = client
            .post(format!(
                "{}/api/users/progress-user/progress",
                server.base_url
            ))
            .json(&serde_json::json!({
                "date": today - Duration::days(days_ago),
                "is_smoke_free": smoke_free,
                "cigarettes_smoked": cigarettes
            }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    // Upsert: re-log the bad day as smoke-free, the row is replaced.
    let replaced: ProgressEntry = client
        .post(format!(
            "{}/api/users/progress-user/progress",
            server.base_url
        ))
        .json(&serde_json::json!({
            "date": today - Duration::days(2),
            "is_smoke_free": true,
            "cigarettes_smoked": 99
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(replaced.is_smoke_free);
    assert_eq!(replaced.cigarettes_smoked, 0);

    let entries: Vec<ProgressEntry> = client
        .get(format!(
            "{}/api/users/progress-user/progress",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].date, today);

    let snapshot: StatsSnapshot = client
        .get(format!("{}/api/users/progress-user/stats", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(snapshot.current_streak, 3);

    let today_entry: Option<ProgressEntry> = client
        .get(format!(
            "{}/api/users/progress-user/progress/today",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(today_entry.is_some_and(|entry| entry.is_smoke_free));
}

#[tokio::test]
async fn http_craving_validation_and_stats() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let rejected = client
        .post(format!("{}/api/users/craving-user/cravings", server.base_url))
        .json(&serde_json::json!({ "intensity": 0, "resisted": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), reqwest::StatusCode::BAD_REQUEST);

    for (intensity, trigger, resisted) in [(7, "stress", true), (4, "stress", true), (9, "social", false)] {
        let response = client
            .post(format!("{}/api/users/craving-user/cravings", server.base_url))
            .json(&serde_json::json!({
                "intensity": intensity,
                "trigger": trigger,
                "resisted": resisted
            }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let stats: CravingStatsResponse = client
        .get(format!(
            "{}/api/users/craving-user/cravings/stats",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats.total_cravings, 3);
    assert_eq!(stats.resisted_cravings, 2);
    assert!((stats.success_rate - 200.0 / 3.0).abs() < 1e-9);
    assert!((stats.average_intensity - 20.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.recent_cravings.len(), 3);
}

#[tokio::test]
async fn http_zero_cravings_read_as_perfect_success() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let stats: CravingStatsResponse = client
        .get(format!(
            "{}/api/users/fresh-user/cravings/stats",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats.total_cravings, 0);
    assert_eq!(stats.success_rate, 100.0);
}

#[tokio::test]
async fn http_journal_create_and_list_newest_first() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let empty = client
        .post(format!("{}/api/users/journal-user/journal", server.base_url))
        .json(&serde_json::json!({ "content": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), reqwest::StatusCode::BAD_REQUEST);

    for content in ["day one notes", "day two notes"] {
        let response = client
            .post(format!("{}/api/users/journal-user/journal", server.base_url))
            .json(&serde_json::json!({
                "content": content,
                "mood": "good",
                "tags": ["milestone"]
            }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let entries: Vec<serde_json::Value> = client
        .get(format!("{}/api/users/journal-user/journal", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["content"], "day two notes");
}

#[tokio::test]
async fn http_leaderboard_ranks_and_validates_category() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    onboard(&client, &server.base_url, "board-long", 30).await;
    onboard(&client, &server.base_url, "board-short", 2).await;

    let board: LeaderboardResponse = client
        .get(format!(
            "{}/api/leaderboard?category=days_smoke_free",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(board.category, "days_smoke_free");
    let long_pos = board
        .entries
        .iter()
        .position(|e| e.user_id == "board-long")
        .expect("board-long listed");
    let short_pos = board
        .entries
        .iter()
        .position(|e| e.user_id == "board-short")
        .expect("board-short listed");
    assert!(long_pos < short_pos);

    let bad = client
        .get(format!("{}/api/leaderboard?category=karma", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), reqwest::StatusCode::BAD_REQUEST);
}
