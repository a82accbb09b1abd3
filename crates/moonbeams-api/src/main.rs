//! Moonbeams API server entry point.

use std::error::Error;
use std::sync::Arc;

use moonbeams_api::config::AppConfig;
use moonbeams_api::engine::EspeakEngine;
use moonbeams_api::state::AppState;
use moonbeams_api::story_client::HttpStorySource;
use moonbeams_api::{routes, runtime, telemetry};
use moonbeams_core::clock::SystemClock;
use moonbeams_core::engine::NarrationEngine;
use moonbeams_core::journal::BoundedJournal;
use moonbeams_narration::application::command_handlers::NarrationController;
use moonbeams_session::application::coordinator::{BedtimeInput, BedtimeSession};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Read configuration from environment.
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Moonbeams API server");

    // Attach the text-to-speech engine, if the host has one.
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let engine = EspeakEngine::probe(&config.tts_program, signal_tx)
        .await
        .map(|engine| Box::new(engine) as Box<dyn NarrationEngine>);
    let narration = NarrationController::new(engine, config.playback);
    let session = BedtimeSession::new(narration, config.voices.clone());

    // Start the coordinator.
    let journal = Arc::new(BoundedJournal::default());
    let (session_handle, _coordinator) =
        runtime::spawn(session, Arc::new(SystemClock), journal.clone(), signal_rx);

    // Build application state.
    let story_source = Arc::new(HttpStorySource::new(config.story_service_url.clone())?);
    let app_state = AppState::new(session_handle.clone(), journal, story_source);

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::api_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Silence the room before exiting.
    if let Err(err) = session_handle
        .send(Uuid::new_v4(), BedtimeInput::Shutdown)
        .await
    {
        tracing::warn!(error = %err, "could not shut the bedtime session down cleanly");
    }
    telemetry.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
