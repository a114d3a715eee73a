use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ward_core::config::{
    generation_config_from_env_values, store_backend_from_env_values,
    vital_signs_mode_from_env_value,
};
use ward_core::{CoreConfig, Services};

/// Main entry point for the Ward application
///
/// Resolves configuration once, wires the core services to the configured store and model, and
/// serves the REST API.
///
/// # Environment Variables
/// - `WARD_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `WARD_STORE`: `memory` or `file` (default: "file")
/// - `PATIENT_DATA_DIR`: File store root (default: "patient_data")
/// - `WARD_VITALS_SOURCE`: `fixed` or `stored` (default: "stored")
/// - `GEMINI_API_KEY`: API key for the generation service (required)
/// - `WARD_MODEL`: Model name (default: "gemini-2.0-flash")
/// - `WARD_GENERATION_URL`: Generation API base URL
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any configuration value is invalid or `GEMINI_API_KEY` is missing,
/// - the file store cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ward=info".parse()?)
                .add_directive("ward_run=info".parse()?)
                .add_directive("ward_core=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("WARD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let store = store_backend_from_env_values(
        std::env::var("WARD_STORE").ok(),
        std::env::var("PATIENT_DATA_DIR").ok(),
    )?;
    let vital_signs = vital_signs_mode_from_env_value(std::env::var("WARD_VITALS_SOURCE").ok())?;
    let generation = match generation_config_from_env_values(
        std::env::var("GEMINI_API_KEY").ok(),
        std::env::var("WARD_MODEL").ok(),
        std::env::var("WARD_GENERATION_URL").ok(),
    ) {
        Ok(generation) => generation,
        Err(e) => anyhow::bail!("Cannot start without a generation service: {}", e),
    };

    let config = CoreConfig::new(store, vital_signs, generation);
    tracing::info!("-- Configuration: {:?}", config);
    let services = Services::from_config(&config)?;

    tracing::info!("++ Starting Ward REST on {}", rest_addr);

    let app = api_rest::router(services);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
