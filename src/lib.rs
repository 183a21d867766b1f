pub mod achievements;
pub mod app;
pub mod errors;
pub mod handlers;
pub mod leaderboard;
pub mod models;
pub mod notify;
pub mod state;
pub mod stats;
pub mod storage;

pub use app::router;
pub use notify::NotificationService;
pub use state::AppState;
pub use storage::{load_data, resolve_data_path};
