use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skillbridge_api::client::{HttpTransport, RetryingAnalyzer};
use skillbridge_api::db::{create_pool, ensure_schema};
use skillbridge_api::models::analysis::AnalyzeRequest;
use skillbridge_api::store::postgres::PgAnalysisStore;

/// Analyze a resume against a career goal through a running SkillBridge backend.
#[derive(Debug, Parser)]
#[command(name = "analyze", version)]
struct Args {
    /// Plain-text resume file
    #[arg(long)]
    resume: PathBuf,

    /// Target role, e.g. "Data Scientist"
    #[arg(long)]
    goal: String,

    #[arg(long, default_value = "http://localhost:8080")]
    backend_url: String,

    /// Owner of the analysis, sent to the backend and used for the local copy
    #[arg(long)]
    user_id: Option<String>,

    /// Also keep a local copy of the result in this database
    #[arg(long)]
    database_url: Option<String>,

    /// Per-attempt request timeout
    #[arg(long, default_value_t = 90)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("analyze=info,skillbridge_api=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let resume_text = tokio::fs::read_to_string(&args.resume)
        .await
        .with_context(|| format!("Failed to read resume: {}", args.resume.display()))?;

    let transport = HttpTransport::new(&args.backend_url, Duration::from_secs(args.timeout_secs))?;
    let mut analyzer = RetryingAnalyzer::new(transport);

    match (&args.database_url, &args.user_id) {
        (Some(url), Some(user_id)) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            analyzer = analyzer.with_store(Arc::new(PgAnalysisStore::new(pool)), user_id.clone());
        }
        (Some(_), None) => warn!("--database-url ignored without --user-id"),
        _ => {}
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let request = AnalyzeRequest {
        resume_text,
        career_goal: args.goal,
        user_id: args.user_id,
    };
    info!("Analyzing resume via {}", args.backend_url);
    let result = analyzer.analyze(&request, &cancel).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
