//! # leakwatch-server
//!
//! REST transport for the leak-detection engine: readings in, verdicts
//! out, plus the best-effort motor relay.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use engine::{DetectionEngine, EngineConfig, Verdict};
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod routes;

/// Application state shared across handlers.
///
/// The engine mutex serializes all mutations; `snapshot` holds the
/// last-committed verdict so reads never block on an in-flight ingest.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<DetectionEngine>>,
    pub snapshot: Arc<RwLock<Option<Verdict>>>,
    pub motor: Arc<RwLock<MotorState>>,
    pub relay_url: Option<String>,
    pub http: reqwest::Client,
}

/// Last commanded motor state.
#[derive(Debug, Clone)]
pub struct MotorState {
    pub state: String,
}

impl Default for MotorState {
    fn default() -> Self {
        Self {
            state: "OFF".to_string(),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,tower_http=info".into()),
        )
        .init();

    let store_path = env::var("STORE_PATH").unwrap_or_else(|_| "water_usage_data.csv".to_string());
    let engine = match DetectionEngine::open(&store_path, EngineConfig::default()) {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(%err, store_path = %store_path, "failed to open detection engine");
            std::process::exit(1);
        }
    };

    let state = AppState {
        engine: Arc::new(Mutex::new(engine)),
        snapshot: Arc::new(RwLock::new(None)),
        motor: Arc::new(RwLock::new(MotorState::default())),
        relay_url: env::var("MOTOR_RELAY_URL").ok(),
        http: reqwest::Client::new(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/update", post(routes::update))
        .route("/data", get(routes::data))
        .route("/predict/weekly", get(routes::predict_weekly))
        .route("/motor", post(routes::control_motor))
        .route("/motor-status", get(routes::motor_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .expect("PORT must be a valid number");
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST:PORT configuration");

    tracing::info!(
        "leakwatch-server v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
