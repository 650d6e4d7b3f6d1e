use boxgate_api::{build_router, state::AppState};
use boxgate_config::Settings;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "boxgate_api=debug,boxgate_services=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!("Starting boxgate on {}:{}", settings.app.host, settings.app.port);
    info!(
        token_file = %settings.tokens.path,
        redirect_uri = %settings.dropbox.redirect_uri,
        "Dropbox config"
    );
    if !settings.dropbox.has_client_id() || !settings.dropbox.has_client_secret() {
        warn!("Dropbox client credentials are not set; login will fail until they are configured");
    }

    let app_state = AppState::new(settings.clone());
    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
