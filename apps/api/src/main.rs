use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skillbridge_api::config::Config;
use skillbridge_api::db::{create_pool, ensure_schema};
use skillbridge_api::llm_client::LlmClient;
use skillbridge_api::routes::build_router;
use skillbridge_api::search_client::SearchClient;
use skillbridge_api::state::AppState;
use skillbridge_api::store::memory::{InMemoryAnalysisStore, InMemoryCourseRepository};
use skillbridge_api::store::postgres::{PgAnalysisStore, PgCourseRepository};
use skillbridge_api::store::{AnalysisStore, CourseRepository};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "skillbridge_api={rust_log},tower_http={rust_log}",
                rust_log = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillBridge API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize record stores
    let (analyses, courses): (Arc<dyn AnalysisStore>, Arc<dyn CourseRepository>) =
        match &config.database_url {
            Some(url) => {
                let pool = create_pool(url).await?;
                ensure_schema(&pool).await?;
                (
                    Arc::new(PgAnalysisStore::new(pool.clone())),
                    Arc::new(PgCourseRepository::new(pool)),
                )
            }
            None => {
                warn!("DATABASE_URL not set; records are kept in memory only");
                (
                    Arc::new(InMemoryAnalysisStore::default()),
                    Arc::new(InMemoryCourseRepository::default()),
                )
            }
        };

    // Initialize provider clients
    let llm = LlmClient::new(config.gemini.clone(), config.provider_timeout)?;
    match llm.model() {
        Some(model) => info!("AI provider client initialized (model: {model})"),
        None => warn!("GEMINI_API_KEY not set; analysis and upload are disabled"),
    }

    let search = SearchClient::new(config.search.clone(), config.provider_timeout)?;
    if search.is_configured() {
        info!("Search provider client initialized");
    } else {
        info!("Search provider not configured; learning resources use AI discovery");
    }

    // Build app state
    let state = AppState {
        ai: Arc::new(llm),
        search: Arc::new(search),
        analyses,
        courses,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
