//! Clinic bot - LINE webhook assistant for finding medical facilities
//!
//! A per-user dialogue state machine that routes users through a facility
//! search (department, then location) or a drug information lookup.

mod api;
mod collaborators;
mod config;
mod db;
mod line;
mod reply;
mod runtime;
mod session;
mod state_machine;

use api::{create_router, AppState};
use collaborators::{
    GooglePlacesService, OpenAiSummaryService, PmdaDrugLookup, UnconfiguredFacilitySearch,
};
use config::BotConfig;
use db::Database;
use line::{LineClient, LoggingReplySender, ReplySender, SignatureVerifier};
use runtime::{Collaborators, DatabaseLog, DialogueRuntime, FacilitySearch, SummaryGenerator};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = config::load_dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic_bot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Some(path) = &dotenv {
        tracing::info!(path = %path.display(), "Loaded .env");
    }
    let config = BotConfig::from_env()?;

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path, "Opening database");
    let db = Database::open(&config.db_path)?;

    let collaborators = build_collaborators(&config, db.clone())?;
    let runtime = DialogueRuntime::new(collaborators, config.collaborator_timeout);

    let replies: Arc<dyn ReplySender> = match &config.channel_access_token {
        Some(token) => Arc::new(LineClient::new(token.clone(), config.collaborator_timeout)?),
        None => {
            tracing::warn!("LINE_CHANNEL_ACCESS_TOKEN not set; replies will only be logged");
            Arc::new(LoggingReplySender)
        }
    };

    let state = AppState::new(
        runtime,
        SignatureVerifier::new(&config.channel_secret)?,
        replies,
        db,
    );
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Clinic bot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_collaborators(
    config: &BotConfig,
    db: Database,
) -> Result<Collaborators, Box<dyn std::error::Error>> {
    let timeout = config.collaborator_timeout;

    let facilities: Arc<dyn FacilitySearch> = match &config.google_maps_api_key {
        Some(key) => Arc::new(GooglePlacesService::new(key.clone(), timeout)?),
        None => {
            tracing::warn!("GOOGLE_MAPS_API_KEY not set; facility searches will fail");
            Arc::new(UnconfiguredFacilitySearch)
        }
    };

    let summary: Option<Arc<dyn SummaryGenerator>> =
        match (config.facility_summary, &config.openai_api_key) {
            (true, Some(key)) => Some(Arc::new(OpenAiSummaryService::new(
                key.clone(),
                config.summary_model.clone(),
                timeout,
            )?)),
            (true, None) => {
                tracing::warn!("FACILITY_SUMMARY set without OPENAI_API_KEY; listing facilities");
                None
            }
            (false, _) => None,
        };

    tracing::info!(
        places = config.google_maps_api_key.is_some(),
        summary = summary.is_some(),
        model = %config.summary_model,
        "Collaborators configured"
    );

    Ok(Collaborators {
        facilities,
        drugs: Arc::new(PmdaDrugLookup::new(config.drug_search_url.clone(), timeout)?),
        summary,
        log: Arc::new(DatabaseLog::new(db)),
    })
}
