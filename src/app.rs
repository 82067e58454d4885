use std::sync::{Arc, Mutex};

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::application::BugClassificationUseCase;
use crate::domain::error::Result;
use crate::infrastructure::classifier::ClassifierArtifacts;
use crate::infrastructure::config::ConfigService;
use crate::interfaces::http::{add_log, start_server};

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load configuration and artifacts, then serve until shutdown
pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let config_service = ConfigService::new();
    let config = config_service.load();
    init_tracing(
        config
            .as_ref()
            .map(|c| c.logging.filter.as_str())
            .unwrap_or("info"),
    );
    let config = config?;
    info!(config_path = %config_service.config_path().display(), "Configuration loaded");

    let artifacts = Arc::new(ClassifierArtifacts::load(&config.model)?);
    let classification = Arc::new(BugClassificationUseCase::new(artifacts, &config.loader));

    let logs = Arc::new(Mutex::new(Vec::new()));
    let server = start_server(classification, logs.clone(), &config)?;

    add_log(
        &logs,
        "INFO",
        "System",
        &format!(
            "Classifier loaded and HTTP server started on {}:{}",
            config.server.host, config.server.port
        ),
    );

    server.await?;
    Ok(())
}
