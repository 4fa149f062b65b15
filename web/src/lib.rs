use domain::call_pipeline::CallPipeline;
use log::info;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;

mod controller;
pub mod error;
mod extractors;
mod params;
mod response;
pub mod router;

pub use error::{Error, Result};

/// Shared state handed to every handler: the database pool, the parsed
/// configuration, and the call pipeline with its transcription provider.
#[derive(Clone)]
pub struct AppState {
    pub database_connection: Arc<DatabaseConnection>,
    pub config: Config,
    pub call_pipeline: Arc<CallPipeline>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: &Arc<DatabaseConnection>,
        call_pipeline: Arc<CallPipeline>,
    ) -> Self {
        Self {
            // Arc is cloned, but the source DatabaseConnection refers to the same
            // instance as the one passed in to new()
            database_connection: Arc::clone(db),
            config,
            call_pipeline,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.database_connection.as_ref()
    }
}

/// Binds the configured interface/port and serves the API until shutdown.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let address = format!("{interface}:{}", app_state.config.port);

    let router = router::define_routes(app_state);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!("Server starting... listening for connections on http://{address}");
    axum::serve(listener, router).await
}
