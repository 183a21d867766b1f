use quit_companion::{load_data, notify, resolve_data_path, AppState, NotificationService};
use std::{env, net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = resolve_data_path()?;
    if let Some(parent) = data_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let data = load_data(&data_path).await;
    let (notifier, events) = NotificationService::channel(64);
    let state = AppState::new(data_path, data, notifier);

    tokio::spawn(notify::run(
        events,
        Arc::clone(&state.data),
        notify::debounce_interval(),
    ));

    let app = quit_companion::router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
