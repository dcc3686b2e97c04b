//! ForeAIcast - Backend Server and batch runs
//!
//! `serve` runs the HTTP API and the Telegram webhook. The batch commands
//! generate the daily articles and push them to subscribers.

use std::{net::SocketAddr, path::Path, time::Duration};

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use foreaicast_backend::{
    config::Config,
    create_app,
    services::{document_store, targeting},
    AppState,
};
use shared::TargetDay;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "foreaicast", about = "Weather consensus bot and daily article pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API and Telegram webhook (default)
    Serve,
    /// Generate the national and county articles
    BuildArticles {
        /// Article date (YYYY-MM-DD), today or tomorrow. Defaults to tomorrow.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Push the latest articles to eligible subscribers
    Dispatch {
        /// Comma-separated county names to send besides the national article
        #[arg(long)]
        only: Option<String>,
        /// Send only to this chat, ignoring the subscriber list
        #[arg(long)]
        test_chat: Option<i64>,
    },
    /// Build tomorrow's articles, then dispatch them
    RunDaily,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foreaicast=debug,foreaicast_backend=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting ForeAIcast");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let state = AppState::new(db_pool, config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(state).await,
        Commands::BuildArticles { date } => build_articles(&state, date).await,
        Commands::Dispatch { only, test_chat } => dispatch(&state, only.as_deref(), test_chat).await,
        Commands::RunDaily => {
            build_articles(&state, None).await?;
            dispatch(&state, None, None).await
        }
    }
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr =
        format!("{}:{}", state.config.server.host, state.config.server.port).parse()?;
    let app = create_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_articles(state: &AppState, date: Option<NaiveDate>) -> anyhow::Result<()> {
    let target_date = date.unwrap_or_else(|| TargetDay::Tomorrow.date_from(Utc::now().date_naive()));

    match state.article_builder().build(target_date).await {
        Ok(summary) => {
            tracing::info!(
                run_id = %summary.run_id,
                documents = summary.documents.len(),
                skipped = ?summary.skipped_counties,
                "Articles written"
            );
            Ok(())
        }
        Err(e) => {
            state.notifier.notify_error("Cikkgenerálás", &e).await;
            Err(e.into())
        }
    }
}

async fn dispatch(state: &AppState, only: Option<&str>, test_chat: Option<i64>) -> anyhow::Result<()> {
    let output_dir = Path::new(&state.config.articles.output_dir);
    let documents = document_store::collect_documents(output_dir, only)?;
    if documents.is_empty() {
        tracing::warn!(dir = %output_dir.display(), "No articles to send");
        return Ok(());
    }

    let recipients =
        targeting::eligible_recipients(state.recipients.as_ref(), Utc::now(), test_chat).await?;
    let report = state.dispatcher().dispatch(&documents, &recipients).await;

    tracing::info!(
        report = %serde_json::to_string(&report)?,
        "Dispatch report"
    );
    Ok(())
}
