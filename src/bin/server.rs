use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use cut_planner::engine::{Engine, RunReport};
use cut_planner::history::{HistoryEntry, HistoryLedger, OffcutNotice};
use cut_planner::types::{
    Piece, Project, SheetPiece, Stock, ValidationResult, deserialize_u32_from_number,
};
use serde::Deserialize;
use std::sync::Arc;
use std::sync::mpsc::sync_channel;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
}

#[derive(Deserialize)]
struct OptimizeRequest {
    project: Project,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    kerf: u32,
    /// Linear pieces; read when the project stocks bars.
    #[serde(default)]
    pieces: Vec<Piece>,
    /// Rectangular pieces; read when the project stocks sheets.
    #[serde(default)]
    sheet_pieces: Vec<SheetPiece>,
}

async fn optimize(
    State(state): State<AppState>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<RunReport>, (StatusCode, Json<ValidationResult>)> {
    tracing::info!(
        project = %req.project.name,
        stock = %req.project.stock,
        "POST /optimize"
    );

    let outcome = match req.project.stock {
        Stock::Bar { .. } => state.engine.run_bars(&req.project, &req.pieces, req.kerf),
        Stock::Sheet { .. } => state
            .engine
            .run_sheets(&req.project, &req.sheet_pieces, req.kerf),
    };

    match outcome {
        Ok(report) => Ok(Json(report)),
        Err(check) => Err((StatusCode::UNPROCESSABLE_ENTITY, Json(check))),
    }
}

async fn history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.engine.ledger().entries())
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    // Offcut notices leave the request path through a bounded channel; a
    // real deployment posts them to the leftover-inventory service.
    let (tx, rx) = sync_channel::<OffcutNotice>(64);
    std::thread::spawn(move || {
        while let Ok(notice) = rx.recv() {
            tracing::info!(
                project = %notice.project,
                material = notice.material.as_deref().unwrap_or("unspecified"),
                waste = notice.total_waste,
                "offcut kept for inventory"
            );
        }
    });

    let state = AppState {
        engine: Arc::new(Engine::new(HistoryLedger::with_notifier(tx))),
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .route("/history", get(history))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
