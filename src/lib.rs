pub mod api; // HTTP surface: /api/v1
pub mod config;
pub mod pipeline; // Intake, decoding, extraction, underwriting

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::config::AppConfig;
use crate::pipeline::underwriting::{DealEvaluator, GeminiClient};

pub fn run() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // The blocking HTTP client owns a runtime of its own: it must be built
    // and dropped outside the server runtime.
    let client = match GeminiClient::new(&config.gemini) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Decision engine client: {e}");
            return ExitCode::FAILURE;
        }
    };
    let evaluator = DealEvaluator::new(Box::new(client), config.gemini.model.clone());
    let ctx = ApiContext::from_config(&config, evaluator);
    let _evaluator_guard = ctx.evaluator.clone();

    tracing::info!(
        bind = %config.bind_addr,
        upload_dir = %config.upload_dir.display(),
        model = %config.gemini.model,
        principals = config.api_tokens.len(),
        "Configuration loaded"
    );

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(api::serve(config.bind_addr, ctx));
    drop(runtime);

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Server error: {e}");
            ExitCode::FAILURE
        }
    }
}
