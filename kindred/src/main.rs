use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kindred::api::{create_router, AppState};
use kindred::config::Config;
use kindred::db::repository::CollectionRepository;
use kindred::db::Database;
use kindred::scoring::ScoringWeights;

#[derive(Parser)]
#[command(name = "kindred")]
#[command(about = "Interest and personality similarity matching engine")]
struct Args {
    /// Recompute every user's pairwise scores before serving, e.g. after a
    /// scoring-weight change
    #[arg(long)]
    recompute_all: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kindred=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    // Weights that do not sum to 1.0 abort startup here.
    let weights = ScoringWeights::from_config(&config.scoring)?;

    tracing::info!("Initializing database...");
    let db = Database::new(&config.database).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, db.clone(), weights);

    if args.recompute_all {
        let conn = db.connect()?;
        let users = CollectionRepository::list_user_ids(&conn).await?;
        tracing::info!(users = users.len(), "Recomputing pairwise scores for all users");
        for user_id in users {
            state.aggregation.recompute(&user_id).await?;
        }
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Kindred listening on {addr}");
    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
