//! Outfitter Server
//!
//! Thin axum boundary in front of the orchestration engine. Owns the two
//! user-visible failure modes: request validation (400) and unsupported
//! orchestration kinds (501). Everything else the engine absorbs into
//! fallback data, so a successful run always returns a complete response.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use outfitter_core::agents::{AgentRegistry, ScriptedAgent};
use outfitter_core::error::EngineError;
use outfitter_core::orchestration::{Orchestrator, OrchestratorConfig};
use outfitter_core::response::OrchestrationRequest;
use serde_json::json;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "outfitter", about = "Outfitter multi-agent orchestration server")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

struct AppState {
    orchestrator: Orchestrator,
}

type SharedState = Arc<AppState>;

/// Demo agents so the binary runs standalone. A deployment swaps these for
/// real capabilities behind the same `AgentCapability` trait.
fn demo_registry() -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    registry.register(Arc::new(ScriptedAgent::new(
        "product-search",
        json!({"products": [
            {"name": "TrailLite 2P Tent", "sku": "TNT-2201"},
            {"name": "Ember 20F Sleeping Bag", "sku": "SLP-0440"}
        ]})
        .to_string(),
    )));
    registry.register(Arc::new(ScriptedAgent::new(
        "customer-match",
        json!({"customerId": "C-1009", "profile": "weekend camper"}).to_string(),
    )));
    registry.register(Arc::new(ScriptedAgent::new(
        "navigation",
        json!({
            "startLocation": "store entrance",
            "estimatedTime": "4 minutes",
            "steps": [
                {"direction": "forward", "description": "Walk past the registers"},
                {"direction": "left", "description": "Turn left at footwear",
                 "landmark": {"description": "Boot wall", "location": "aisle 5"}},
                {"direction": "arrive", "description": "Camping gear is straight ahead"}
            ]
        })
        .to_string(),
    )));
    registry.register(Arc::new(ScriptedAgent::new(
        "alternatives",
        json!([
            {"name": "BasePro 4P Tent", "sku": "TNT-4410", "price": 329.99,
             "inStock": true, "isAvailable": true, "location": "Back wall",
             "aisle": 7, "section": "Camping"}
        ])
        .to_string(),
    )));
    registry
}

async fn orchestrate(
    State(state): State<SharedState>,
    Json(request): Json<OrchestrationRequest>,
) -> Response {
    if let Err(error) = request.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": error.to_string()})),
        )
            .into_response();
    }

    match state.orchestrator.run(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(error @ EngineError::UnsupportedOrchestration(_)) => (
            StatusCode::NOT_IMPLEMENTED,
            Json(json!({"error": error.to_string()})),
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, "orchestration run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "orchestration failed"})),
            )
                .into_response()
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = OrchestratorConfig {
        agents: vec![
            "product-search".to_string(),
            "customer-match".to_string(),
            "navigation".to_string(),
            "alternatives".to_string(),
        ],
        ..OrchestratorConfig::default()
    };
    let state: SharedState = Arc::new(AppState {
        orchestrator: Orchestrator::new(config, demo_registry()),
    });

    let app = Router::new()
        .route("/api/orchestrate", post(orchestrate))
        .route("/api/health", get(health))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    tracing::info!(%addr, "outfitter server listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
