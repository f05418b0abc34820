use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use formrelay_api::config::ServerConfig;
use formrelay_api::router::build_app_router;
use formrelay_api::state::AppState;
use formrelay_engine::SurveyService;
use formrelay_core::content::ContentGenerator;
use formrelay_providers::{
    FormProvider, GenerativeContent, HttpFormProvider, MailProvider, SmtpMailer,
};
use formrelay_store::SurveyStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formrelay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Persistence ---
    let store = SurveyStore::open(&config.store_path)
        .map(Arc::new)
        .expect("Failed to open survey store");

    // --- Providers (capability-checked; absent config routes to fallbacks) ---
    let forms = HttpFormProvider::from_env();
    let mailer = SmtpMailer::from_env();
    let content = GenerativeContent::from_env();
    tracing::info!(
        forms_configured = forms.is_configured(),
        smtp_configured = mailer.is_configured(),
        genai_configured = content.is_configured(),
        "Provider configuration loaded"
    );

    // --- Service ---
    let service = Arc::new(SurveyService::new(
        store,
        Arc::new(forms),
        Arc::new(mailer),
        Arc::new(content),
    ));

    let state = AppState {
        service,
        config: Arc::new(config.clone()),
    };

    // --- Router & server ---
    let app = build_app_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT combination");

    tracing::info!(%addr, "Starting formrelay API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
