use crate::models::AppData;
use crate::notify::NotificationService;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub notifier: NotificationService,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData, notifier: NotificationService) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            notifier,
        }
    }
}
