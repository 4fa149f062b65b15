use domain::call_pipeline::CallPipeline;
use domain::gateway::transcription::LocalTranscriber;
use log::{error, info};
use service::{
    config::{Config, RustEnv},
    logging::Logger,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    if config.runtime_env == RustEnv::Production && config.token_secret_is_default() {
        error!("TOKEN_SECRET must be overridden in production");
        std::process::exit(1);
    }

    info!("Connecting to database [{}]...", config.database_url());
    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = entity_api::init_schema(db.as_ref()).await {
        error!("Failed to initialize database schema: {e}");
        std::process::exit(1);
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.storage_path).await {
        error!(
            "Failed to create storage directory {}: {e}",
            config.storage_path
        );
        std::process::exit(1);
    }

    let call_pipeline = Arc::new(CallPipeline::new(
        Arc::new(LocalTranscriber::new()),
        config.transcription_timeout_secs,
    ));

    let app_state = web::AppState::new(config, &db, call_pipeline);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
