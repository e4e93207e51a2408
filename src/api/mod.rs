use axum::{
    Router,
    extract::{Json, Query, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    Analysis, Composition, GoalSeekResult, GoalStatus, MAX_MONTHS, MONTHS_PER_YEAR,
    ProjectionInput, ProjectionResult, TimeToGoal, analysis, composition, goal_status,
    project_over_horizon, seek_goal,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const MAX_ANNUAL_RATE: f64 = 30.0;
const MAX_MONTHLY_CONTRIBUTION: f64 = 50_000.0;
const MAX_YEARS: u32 = MAX_MONTHS / MONTHS_PER_YEAR;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{flag} must be a finite number")]
    NonFinite { flag: &'static str },
    #[error("Invalid API JSON payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Invalid API query string: {0}")]
    Query(String),
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("failed to encode projection: {0}")]
    Encode(serde_json::Error),
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "compound",
    about = "Compound-interest projection: monthly trajectory, yearly rollup and time to goal"
)]
pub struct Cli {
    #[arg(long, default_value_t = 10_000.0, help = "Starting balance")]
    initial_investment: f64,
    #[arg(
        long,
        default_value_t = 1_000.0,
        help = "Contribution added at the end of every month (0 to 50000)"
    )]
    monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Nominal annual growth rate in percent, e.g. 10 (0 to 30)"
    )]
    annual_rate: f64,
    #[arg(long, default_value_t = 10, help = "Projection horizon in years (1 to 50)")]
    years: u32,
    #[arg(
        long,
        help = "Projection horizon in months; overrides --years when set (at most 600)"
    )]
    horizon_months: Option<u32>,
    #[arg(long, help = "Target balance; enables time-to-goal and goal status")]
    target_goal: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectPayload {
    #[serde(deserialize_with = "blank_as_none")]
    initial_investment: Option<f64>,
    #[serde(deserialize_with = "blank_as_none")]
    monthly_contribution: Option<f64>,
    #[serde(deserialize_with = "blank_as_none")]
    annual_rate: Option<f64>,
    #[serde(deserialize_with = "blank_as_none")]
    years: Option<u32>,
    #[serde(deserialize_with = "blank_as_none")]
    horizon_months: Option<u32>,
    #[serde(deserialize_with = "blank_as_none")]
    target_goal: Option<f64>,
}

// Query strings carry every value as text and send cleared fields as `key=`.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field<T> {
        Value(T),
        Text(String),
    }

    match Option::<Field<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Field::Value(value)) => Ok(Some(value)),
        Some(Field::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Field::Text(text)) => text.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    input: ProjectionInput,
    horizon_years: f64,
    #[serde(flatten)]
    projection: ProjectionResult,
    goal_seek: Option<GoalSeekResult>,
    time_to_goal: Option<TimeToGoal>,
    goal_status: Option<GoalStatus>,
    composition: Composition,
    analysis: Analysis,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_inputs(cli: Cli) -> Result<ProjectionInput, InputError> {
    let initial_investment = finite("--initial-investment", cli.initial_investment)?.max(0.0);
    let monthly_contribution = clamp_field(
        "--monthly-contribution",
        cli.monthly_contribution,
        0.0,
        MAX_MONTHLY_CONTRIBUTION,
    )?;
    let annual_rate = clamp_field("--annual-rate", cli.annual_rate, 0.0, MAX_ANNUAL_RATE)?;
    let target_goal = cli
        .target_goal
        .map(|goal| finite("--target-goal", goal).map(|g| g.max(0.0)))
        .transpose()?;

    let horizon_months = match cli.horizon_months {
        Some(months) => months.min(MAX_MONTHS),
        None => cli.years.clamp(1, MAX_YEARS) * MONTHS_PER_YEAR,
    };

    let mut input = ProjectionInput::new(initial_investment, monthly_contribution, annual_rate)
        .with_horizon_months(horizon_months);
    input.target_goal = target_goal;
    Ok(input)
}

fn finite(flag: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NonFinite { flag })
    }
}

fn clamp_field(flag: &'static str, value: f64, min: f64, max: f64) -> Result<f64, InputError> {
    let value = finite(flag, value)?;
    let clamped = value.clamp(min, max);
    if clamped != value {
        debug!(flag, value, clamped, "clamped input to allowed range");
    }
    Ok(clamped)
}

pub fn build_project_response(input: &ProjectionInput) -> ProjectResponse {
    let projection = project_over_horizon(input);
    let horizon_years = input.horizon_months.unwrap_or(0) as f64 / MONTHS_PER_YEAR as f64;

    let goal_seek = input.target_goal.map(|_| seek_goal(input));
    let goal_outcome = goal_seek.as_ref().map(|seek| seek.outcome);
    let time_to_goal = goal_outcome
        .and_then(|outcome| outcome.months())
        .map(TimeToGoal::from_months);
    let status = goal_outcome.and_then(|outcome| {
        goal_status(&projection, input.target_goal, outcome, horizon_years)
    });

    ProjectResponse {
        input: *input,
        horizon_years,
        composition: composition(input, &projection),
        analysis: analysis(input, &projection),
        projection,
        goal_seek,
        time_to_goal,
        goal_status: status,
    }
}

/// One-shot mode: parses flags from `args` and prints the projection as JSON.
pub fn run_cli<I, T>(args: I) -> Result<(), InputError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let input = build_inputs(cli)?;
    let response = build_project_response(&input);
    let json = serde_json::to_string_pretty(&response).map_err(InputError::Encode)?;
    println!("{json}");
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("projection HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router()).await
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/healthz", get(health_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler)
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

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(query: Result<Query<ProjectPayload>, QueryRejection>) -> Response {
    let request = match query {
        Ok(Query(payload)) => api_request_from_payload(payload),
        Err(rejection) => Err(InputError::Query(rejection.body_text())),
    };
    project_handler_impl(request)
}

async fn project_post_handler(body: String) -> Response {
    project_handler_impl(api_request_from_json(&body))
}

fn project_handler_impl(request: Result<ProjectionInput, InputError>) -> Response {
    let input = match request {
        Ok(input) => input,
        Err(err) => {
            warn!(%err, "rejected projection request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    debug!(
        initial = input.initial_investment,
        contribution = input.monthly_contribution,
        rate = input.annual_rate,
        horizon = ?input.horizon_months,
        target = ?input.target_goal,
        "running projection"
    );
    json_response(StatusCode::OK, build_project_response(&input))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

pub fn api_request_from_json(json: &str) -> Result<ProjectionInput, InputError> {
    if json.trim().is_empty() {
        return api_request_from_payload(ProjectPayload::default());
    }
    let payload = serde_json::from_str::<ProjectPayload>(json)?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ProjectPayload) -> Result<ProjectionInput, InputError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_investment {
        cli.initial_investment = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_rate {
        cli.annual_rate = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if payload.horizon_months.is_some() {
        cli.horizon_months = payload.horizon_months;
    }
    cli.target_goal = payload.target_goal;

    build_inputs(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        initial_investment: 10_000.0,
        monthly_contribution: 1_000.0,
        annual_rate: 10.0,
        years: 10,
        horizon_months: None,
        target_goal: None,
    }
}
