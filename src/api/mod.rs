use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::capture::{CaptureError, CaptureRecord, CaptureStore};
use crate::core::{
    EngineError, GoalResult, MonthSnapshot, SimulationParameters, project, required_contribution,
};
use crate::export::snapshots_to_csv;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Parser, Debug)]
#[command(
    name = "compounder",
    about = "Compound-interest projection calculator (monthly contributions, goal seeking, CSV export)"
)]
pub struct Cli {
    #[arg(long, default_value_t = 1000.0, help = "Amount present at month 0")]
    pub initial_value: f64,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Amount added at the end of every month"
    )]
    pub monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Monthly interest rate in percent, e.g. 1"
    )]
    pub monthly_rate: f64,
    #[arg(long, default_value_t = 24, help = "Number of months to project")]
    pub periods: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    initial_value: Option<f64>,
    monthly_contribution: Option<f64>,
    /// Percent, like the rate field in the UI; divided by 100 at this boundary.
    monthly_rate: Option<f64>,
    periods: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    initial_value: Option<f64>,
    monthly_rate: Option<f64>,
    periods: Option<u32>,
    target_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapturePayload {
    email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    final_total_value: f64,
    final_cumulative_contributions: f64,
    final_cumulative_growth: f64,
    snapshots: Vec<MonthSnapshot>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalResponse {
    initial_value: f64,
    monthly_rate: f64,
    periods: u32,
    target_value: f64,
    #[serde(flatten)]
    outcome: GoalResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CaptureResponse {
    email: String,
    captured_at: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_params(cli: Cli) -> Result<SimulationParameters, String> {
    if !cli.initial_value.is_finite() {
        return Err("--initial-value must be a finite number".to_string());
    }
    if !cli.monthly_contribution.is_finite() {
        return Err("--monthly-contribution must be a finite number".to_string());
    }
    if !cli.monthly_rate.is_finite() {
        return Err("--monthly-rate must be a finite number".to_string());
    }
    if cli.periods < 1 {
        return Err("--periods must be >= 1".to_string());
    }

    Ok(SimulationParameters {
        initial_value: cli.initial_value,
        monthly_contribution: cli.monthly_contribution,
        monthly_rate: cli.monthly_rate / 100.0,
        periods: cli.periods,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        initial_value: 1_000.0,
        monthly_contribution: 100.0,
        monthly_rate: 1.0,
        periods: 24,
    }
}

fn params_from_payload(payload: SimulatePayload) -> Result<SimulationParameters, String> {
    let mut cli = default_cli_for_api();
    if let Some(v) = payload.initial_value {
        cli.initial_value = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.monthly_rate {
        cli.monthly_rate = v;
    }
    if let Some(v) = payload.periods {
        cli.periods = v;
    }
    build_params(cli)
}

fn simulate_response(params: &SimulationParameters) -> Result<SimulateResponse, EngineError> {
    let snapshots = project(params)?;
    let last = snapshots.last().copied().ok_or(EngineError::InvalidPeriods)?;
    Ok(SimulateResponse {
        final_total_value: last.total_value,
        final_cumulative_contributions: last.cumulative_contributions,
        final_cumulative_growth: last.cumulative_growth,
        snapshots,
    })
}

fn goal_response(payload: GoalPayload) -> Result<GoalResponse, String> {
    let defaults = default_cli_for_api();
    let initial_value = payload.initial_value.unwrap_or(defaults.initial_value);
    let monthly_rate = payload.monthly_rate.unwrap_or(defaults.monthly_rate) / 100.0;
    let periods = payload.periods.unwrap_or(defaults.periods);
    let target_value = payload
        .target_value
        .ok_or_else(|| "targetValue is required".to_string())?;

    if !initial_value.is_finite() || !monthly_rate.is_finite() || !target_value.is_finite() {
        return Err("all goal parameters must be finite numbers".to_string());
    }

    let outcome = required_contribution(initial_value, monthly_rate, periods, target_value)
        .map_err(|e| e.to_string())?;

    Ok(GoalResponse {
        initial_value,
        monthly_rate,
        periods,
        target_value,
        outcome,
    })
}

pub async fn run_http_server(
    port: u16,
    store: Arc<dyn CaptureStore>,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/goal", get(goal_get_handler).post(goal_post_handler))
        .route("/api/capture", post(capture_handler))
        .route("/api/export.csv", get(export_csv_handler))
        .fallback(not_found_handler)
        .with_state(store)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("compounder HTTP API listening on http://{addr}");
    tracing::info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let params = match params_from_payload(payload) {
        Ok(params) => params,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match simulate_response(&params) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

async fn goal_get_handler(Query(payload): Query<GoalPayload>) -> Response {
    goal_handler_impl(payload)
}

async fn goal_post_handler(Json(payload): Json<GoalPayload>) -> Response {
    goal_handler_impl(payload)
}

fn goal_handler_impl(payload: GoalPayload) -> Response {
    match goal_response(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn capture_handler(
    State(store): State<Arc<dyn CaptureStore>>,
    Json(payload): Json<CapturePayload>,
) -> Response {
    let record = match CaptureRecord::new(&payload.email) {
        Ok(record) => record,
        Err(CaptureError::InvalidEmail(email)) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("invalid email address: {email}"),
            );
        }
        Err(e) => return internal_error(e),
    };

    if let Err(e) = store.append(&record) {
        return internal_error(e);
    }

    tracing::info!(email = %record.email, "captured export unlock email");
    json_response(
        StatusCode::OK,
        CaptureResponse {
            email: record.email,
            captured_at: record.captured_at.to_rfc3339(),
        },
    )
}

async fn export_csv_handler(Query(payload): Query<SimulatePayload>) -> Response {
    let params = match params_from_payload(payload) {
        Ok(params) => params,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let snapshots = match project(&params) {
        Ok(snapshots) => snapshots,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match snapshots_to_csv(&snapshots) {
        Ok(csv) => with_cache_control((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"projection.csv\"",
                ),
            ],
            csv,
        )),
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    tracing::error!("request failed: {e}");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
