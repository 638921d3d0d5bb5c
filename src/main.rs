//! Multitimer - concurrent countdown timers with alerts and persistence
//!
//! This is the main entry point for the multitimer daemon.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::info;

use multitimer::{
    api::create_router,
    config::Config,
    services::{AlertDispatcher, DesktopNotifier, FileBlobStore, TerminalBellPlayer},
    state::AppState,
    tasks::{alert_dispatch_task, load_store, spawn_persistence, SystemClock, Ticker},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("multitimer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting multitimer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, tick={}ms, state_file={}",
        config.host,
        config.port,
        config.tick_ms,
        config.state_file.display()
    );

    // Restore timers saved by a previous run
    let blobs = Arc::new(FileBlobStore::new(config.state_file.clone()));
    let store = load_store(blobs.as_ref());

    // Alert delivery never blocks the engine, so it gets its own task
    let notifier = DesktopNotifier::probe(!config.no_notifications).await;
    let dispatcher = AlertDispatcher::new(TerminalBellPlayer::new(!config.mute), notifier);
    let (completion_tx, completion_rx) = mpsc::unbounded_channel();
    tokio::spawn(alert_dispatch_task(completion_rx, dispatcher));

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.tick_period(),
        store,
        Arc::new(SystemClock),
        completion_tx,
    ));

    let persistence = spawn_persistence(state.subscribe_store(), Arc::clone(&blobs));

    // Start the shared ticker
    let tick_state = Arc::clone(&state);
    let ticker = Ticker::new(config.tick_period()).start(move || {
        tick_state.tick();
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timers            - List timers");
    info!("  POST   /timers            - Create a timer");
    info!("  GET    /timers/:id        - Get a timer");
    info!("  POST   /timers/:id/toggle - Start or pause a timer");
    info!("  POST   /timers/:id/reset  - Reset a timer");
    info!("  DELETE /timers/:id        - Delete a timer");
    info!("  PUT    /timers/:id/volume - Set a timer's volume");
    info!("  GET    /status            - Timer counts and server info");
    info!("  GET    /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Stop mutating first so the final save sees the last state
    ticker.stop().await;
    persistence.stop().await;

    info!("Server shutdown complete");
    Ok(())
}
