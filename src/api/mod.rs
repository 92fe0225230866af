use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    CalculationInput, CalculationResult, ComputeError, ContributionGoal, Field, Insights,
    RawCalculationInput, RawContributionGoal, RequiredContribution, ValidationError,
    parse_numeric, required_contribution, run_projection,
};

pub mod cli;
pub mod format;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

pub const DEFAULT_MONTHLY_CONTRIBUTION: f64 = 2_432.45;
pub const DEFAULT_YEARS_TO_RETIREMENT: f64 = 25.0;
pub const DEFAULT_ANNUAL_RETURN_RATE: f64 = 0.10;
pub const DEFAULT_ANNUAL_WITHDRAWAL_RATE: f64 = 0.04;
pub const DEFAULT_TARGET_MONTHLY_WITHDRAWAL: f64 = 5_000.0;

/// A payload value that may arrive as a JSON number or as text (query strings,
/// form posts). Text is parsed by the core validator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    fn resolve(&self, field: Field) -> Result<f64, ValidationError> {
        match self {
            NumericField::Number(value) => Ok(*value),
            NumericField::Text(text) => parse_numeric(text, field),
        }
    }
}

fn resolve_or(
    value: Option<&NumericField>,
    default: f64,
    field: Field,
) -> Result<f64, ValidationError> {
    value.map_or(Ok(default), |v| v.resolve(field))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectPayload {
    #[serde(alias = "monthlyContribution")]
    monthly_contribution: Option<NumericField>,
    #[serde(alias = "yearsToRetirement", alias = "years")]
    years_to_retirement: Option<NumericField>,
    #[serde(alias = "annualReturnRate")]
    annual_return_rate: Option<NumericField>,
    #[serde(alias = "annualWithdrawalRate")]
    annual_withdrawal_rate: Option<NumericField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RequiredContributionPayload {
    #[serde(alias = "targetMonthlyWithdrawal")]
    target_monthly_withdrawal: Option<NumericField>,
    #[serde(alias = "yearsToRetirement", alias = "years")]
    years_to_retirement: Option<NumericField>,
    #[serde(alias = "annualReturnRate")]
    annual_return_rate: Option<NumericField>,
    #[serde(alias = "annualWithdrawalRate")]
    annual_withdrawal_rate: Option<NumericField>,
}

#[derive(Debug, Serialize)]
struct ProjectResponse<'a> {
    inputs: &'a CalculationInput,
    #[serde(flatten)]
    result: &'a CalculationResult,
    insights: Insights,
}

#[derive(Debug, Serialize)]
struct RequiredContributionResponse<'a> {
    goal: &'a ContributionGoal,
    #[serde(flatten)]
    solved: &'a RequiredContribution,
    insights: Insights,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/health", get(health_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route(
            "/api/required-contribution",
            get(required_get_handler).post(required_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("retirement projection API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{}/", addr.port());

    axum::serve(listener, router()).await
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
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn required_get_handler(Query(payload): Query<RequiredContributionPayload>) -> Response {
    required_handler_impl(payload).await
}

async fn required_post_handler(Json(payload): Json<RequiredContributionPayload>) -> Response {
    required_handler_impl(payload).await
}

async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let input = match input_from_payload(&payload) {
        Ok(input) => input,
        Err(err) => {
            warn!("rejected projection request: {err}");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    match run_projection(&input) {
        Ok(result) => {
            debug!(
                "projected {} months, final balance {:.2}",
                result.months, result.final_balance
            );
            json_response(StatusCode::OK, build_project_response(&input, &result))
        }
        Err(err) => compute_error_response(err),
    }
}

async fn required_handler_impl(payload: RequiredContributionPayload) -> Response {
    let goal = match goal_from_payload(&payload) {
        Ok(goal) => goal,
        Err(err) => {
            warn!("rejected required-contribution request: {err}");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    match required_contribution(&goal) {
        Ok(solved) => {
            debug!(
                "solved contribution {:.2} for target withdrawal {:.2}",
                solved.required_monthly_contribution, solved.target_monthly_withdrawal
            );
            json_response(StatusCode::OK, build_required_response(&goal, &solved))
        }
        Err(err) => compute_error_response(err),
    }
}

fn input_from_payload(payload: &ProjectPayload) -> Result<CalculationInput, ValidationError> {
    RawCalculationInput {
        monthly_contribution: resolve_or(
            payload.monthly_contribution.as_ref(),
            DEFAULT_MONTHLY_CONTRIBUTION,
            Field::MonthlyContribution,
        )?,
        years_to_retirement: resolve_or(
            payload.years_to_retirement.as_ref(),
            DEFAULT_YEARS_TO_RETIREMENT,
            Field::YearsToRetirement,
        )?,
        annual_return_rate: resolve_or(
            payload.annual_return_rate.as_ref(),
            DEFAULT_ANNUAL_RETURN_RATE,
            Field::AnnualReturnRate,
        )?,
        annual_withdrawal_rate: resolve_or(
            payload.annual_withdrawal_rate.as_ref(),
            DEFAULT_ANNUAL_WITHDRAWAL_RATE,
            Field::AnnualWithdrawalRate,
        )?,
    }
    .validate()
}

fn goal_from_payload(
    payload: &RequiredContributionPayload,
) -> Result<ContributionGoal, ValidationError> {
    RawContributionGoal {
        target_monthly_withdrawal: resolve_or(
            payload.target_monthly_withdrawal.as_ref(),
            DEFAULT_TARGET_MONTHLY_WITHDRAWAL,
            Field::TargetMonthlyWithdrawal,
        )?,
        years_to_retirement: resolve_or(
            payload.years_to_retirement.as_ref(),
            DEFAULT_YEARS_TO_RETIREMENT,
            Field::YearsToRetirement,
        )?,
        annual_return_rate: resolve_or(
            payload.annual_return_rate.as_ref(),
            DEFAULT_ANNUAL_RETURN_RATE,
            Field::AnnualReturnRate,
        )?,
        annual_withdrawal_rate: resolve_or(
            payload.annual_withdrawal_rate.as_ref(),
            DEFAULT_ANNUAL_WITHDRAWAL_RATE,
            Field::AnnualWithdrawalRate,
        )?,
    }
    .validate()
}

fn build_project_response<'a>(
    input: &'a CalculationInput,
    result: &'a CalculationResult,
) -> ProjectResponse<'a> {
    ProjectResponse {
        inputs: input,
        result,
        insights: result.insights(),
    }
}

fn build_required_response<'a>(
    goal: &'a ContributionGoal,
    solved: &'a RequiredContribution,
) -> RequiredContributionResponse<'a> {
    RequiredContributionResponse {
        goal,
        solved,
        insights: solved.projection.insights(),
    }
}

fn compute_error_response(err: ComputeError) -> Response {
    if err.is_client_fault() {
        warn!("rejected request: {err}");
        error_response(StatusCode::BAD_REQUEST, &err.to_string())
    } else {
        error!("{err}");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
    }
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

#[cfg(test)]
fn project_input_from_json(json: &str) -> Result<CalculationInput, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    input_from_payload(&payload).map_err(|e| e.to_string())
}
