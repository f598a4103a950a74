use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    CombinedRecord, EXPORT_FILE_NAME, EXPORT_MIME_TYPE, ScenarioRun, SimulationInput, SummaryRow,
    build_workbook, run_scenarios,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    initial_amount: Option<f64>,
    monthly_contribution: Option<f64>,
    base_rate: Option<f64>,
    horizon_years: Option<u32>,
    target: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Scenario-based savings projection (pessimistic/base/optimistic compounding)"
)]
struct Cli {
    #[arg(long, default_value_t = 0.0, help = "Starting capital already invested")]
    initial_amount: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Contribution added at the end of every month"
    )]
    monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Base annual growth rate in percent, e.g. 10"
    )]
    base_rate: f64,
    #[arg(long, default_value_t = 1, help = "Projection horizon in years")]
    horizon_years: u32,
    #[arg(
        long,
        default_value_t = 10_000.0,
        help = "Financial target the projection is measured against"
    )]
    target: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    target: f64,
    records: Vec<CombinedRecord>,
    summary: Vec<SummaryRow>,
    progress: ProgressIndicator,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressIndicator {
    percent: f64,
    bar_fraction: f64,
    label: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<SimulationInput, String> {
    if !cli.initial_amount.is_finite() || cli.initial_amount < 0.0 {
        return Err("--initial-amount must be >= 0".to_string());
    }

    if !cli.monthly_contribution.is_finite() || cli.monthly_contribution < 0.0 {
        return Err("--monthly-contribution must be >= 0".to_string());
    }

    if !(0.1..=30.0).contains(&cli.base_rate) {
        return Err("--base-rate must be between 0.1 and 30 percent".to_string());
    }

    if !(1..=50).contains(&cli.horizon_years) {
        return Err("--horizon-years must be between 1 and 50".to_string());
    }

    if !cli.target.is_finite() || cli.target <= 0.0 {
        return Err("--target must be > 0".to_string());
    }

    Ok(SimulationInput {
        initial_amount: cli.initial_amount,
        monthly_contribution: cli.monthly_contribution,
        annual_rate: cli.base_rate / 100.0,
        horizon_years: cli.horizon_years,
        target: cli.target,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        initial_amount: 0.0,
        monthly_contribution: 0.0,
        base_rate: 10.0,
        horizon_years: 1,
        target: 10_000.0,
    }
}

fn simulation_input_from_payload(payload: SimulatePayload) -> Result<SimulationInput, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_amount {
        cli.initial_amount = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.base_rate {
        cli.base_rate = v;
    }
    if let Some(v) = payload.horizon_years {
        cli.horizon_years = v;
    }
    if let Some(v) = payload.target {
        cli.target = v;
    }

    build_inputs(cli)
}

#[cfg(test)]
fn simulation_input_from_json(json: &str) -> Result<SimulationInput, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    simulation_input_from_payload(payload)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/export", get(export_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "projection HTTP API listening");
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
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let input = match simulation_input_from_payload(payload) {
        Ok(input) => input,
        Err(msg) => {
            tracing::warn!(error = %msg, "rejected simulation payload");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let run = match run_scenarios(&input) {
        Ok(run) => run,
        Err(e) => {
            tracing::warn!(error = %e, "simulation failed");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    json_response(StatusCode::OK, build_simulate_response(&input, &run))
}

async fn export_handler(Query(payload): Query<SimulatePayload>) -> Response {
    let input = match simulation_input_from_payload(payload) {
        Ok(input) => input,
        Err(msg) => {
            tracing::warn!(error = %msg, "rejected export payload");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let run = match run_scenarios(&input) {
        Ok(run) => run,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match build_workbook(&run) {
        Ok(bytes) => {
            let mut response = (StatusCode::OK, bytes).into_response();
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                EXPORT_MIME_TYPE.parse().expect("valid header"),
            );
            response.headers_mut().insert(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\"")
                    .parse()
                    .expect("valid header"),
            );
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "spreadsheet export failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to build spreadsheet",
            )
        }
    }
}

fn build_simulate_response(input: &SimulationInput, run: &ScenarioRun) -> SimulateResponse {
    SimulateResponse {
        target: input.target,
        records: run.combined_records(),
        summary: run.summary.clone(),
        progress: progress_indicator(run),
    }
}

fn progress_indicator(run: &ScenarioRun) -> ProgressIndicator {
    let percent = run.base_final_progress_percent();
    ProgressIndicator {
        percent,
        bar_fraction: (percent / 100.0).min(1.0),
        label: progress_label(percent),
    }
}

fn progress_label(percent: f64) -> String {
    if percent < 100.0 {
        format!("{percent:.2}% da meta atingida")
    } else {
        format!("Meta ultrapassada em {:.2}%!", percent - 100.0)
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    fn assert_golden_snapshot(path: &str, actual: &str) {
        let update = matches!(
            std::env::var("UPDATE_GOLDEN").as_deref(),
            Ok("1") | Ok("true") | Ok("TRUE")
        );
        let snapshot_path = Path::new(path);

        if update {
            if let Some(parent) = snapshot_path.parent() {
                fs::create_dir_all(parent).expect("failed to create snapshot directory");
            }
            fs::write(snapshot_path, actual).expect("failed to write golden snapshot");
            return;
        }

        let expected = fs::read_to_string(snapshot_path).unwrap_or_else(|_| {
            panic!("missing golden snapshot at {path}; run with UPDATE_GOLDEN=1 to generate")
        });
        assert_eq!(
            actual, expected,
            "snapshot mismatch for {path}; run with UPDATE_GOLDEN=1 to refresh if expected"
        );
    }

    #[test]
    fn build_inputs_converts_percent_rate_to_fraction() {
        let mut cli = sample_cli();
        cli.base_rate = 12.5;

        let input = build_inputs(cli).expect("valid inputs");
        assert_approx(input.annual_rate, 0.125);
    }

    #[test]
    fn build_inputs_rejects_rate_outside_policy_range() {
        let mut cli = sample_cli();
        cli.base_rate = 0.05;
        let err = build_inputs(cli).expect_err("must reject rate below 0.1");
        assert!(err.contains("--base-rate"));

        let mut cli = sample_cli();
        cli.base_rate = 30.5;
        let err = build_inputs(cli).expect_err("must reject rate above 30");
        assert!(err.contains("--base-rate"));
    }

    #[test]
    fn build_inputs_rejects_horizon_outside_policy_range() {
        let mut cli = sample_cli();
        cli.horizon_years = 0;
        let err = build_inputs(cli).expect_err("must reject zero horizon");
        assert!(err.contains("--horizon-years"));

        let mut cli = sample_cli();
        cli.horizon_years = 51;
        let err = build_inputs(cli).expect_err("must reject horizon above 50");
        assert!(err.contains("--horizon-years"));
    }

    #[test]
    fn build_inputs_rejects_negative_amounts_and_zero_target() {
        let mut cli = sample_cli();
        cli.initial_amount = -1.0;
        let err = build_inputs(cli).expect_err("must reject negative initial amount");
        assert!(err.contains("--initial-amount"));

        let mut cli = sample_cli();
        cli.monthly_contribution = -1.0;
        let err = build_inputs(cli).expect_err("must reject negative contribution");
        assert!(err.contains("--monthly-contribution"));

        let mut cli = sample_cli();
        cli.target = 0.0;
        let err = build_inputs(cli).expect_err("must reject zero target");
        assert!(err.contains("--target"));
    }

    #[test]
    fn simulation_input_from_json_parses_web_keys() {
        let json = r#"{
          "initialAmount": 25000,
          "monthlyContribution": 800,
          "baseRate": 9.5,
          "horizonYears": 20,
          "target": 1000000
        }"#;
        let input = simulation_input_from_json(json).expect("json should parse");

        assert_approx(input.initial_amount, 25_000.0);
        assert_approx(input.monthly_contribution, 800.0);
        assert_approx(input.annual_rate, 0.095);
        assert_eq!(input.horizon_years, 20);
        assert_approx(input.target, 1_000_000.0);
    }

    #[test]
    fn simulation_input_from_json_falls_back_to_defaults() {
        let input = simulation_input_from_json("{}").expect("empty payload uses defaults");

        assert_approx(input.initial_amount, 0.0);
        assert_approx(input.annual_rate, 0.10);
        assert_eq!(input.horizon_years, 1);
        assert_approx(input.target, 10_000.0);
    }

    #[test]
    fn progress_label_below_target_uses_reached_wording() {
        assert_eq!(progress_label(42.5), "42.50% da meta atingida");
        assert_eq!(progress_label(0.0), "0.00% da meta atingida");
        assert_eq!(progress_label(99.99), "99.99% da meta atingida");
    }

    #[test]
    fn progress_label_at_or_above_target_uses_exceeded_wording() {
        assert_eq!(progress_label(100.0), "Meta ultrapassada em 0.00%!");
        assert_eq!(progress_label(120.25), "Meta ultrapassada em 20.25%!");
    }

    #[test]
    fn progress_bar_fraction_is_bounded_to_one() {
        let mut cli = sample_cli();
        cli.initial_amount = 50_000.0;
        cli.target = 10_000.0;

        let input = build_inputs(cli).expect("valid inputs");
        let run = run_scenarios(&input).expect("run should succeed");
        let progress = progress_indicator(&run);

        assert!(progress.percent > 100.0);
        assert_approx(progress.bar_fraction, 1.0);
        assert!(progress.label.starts_with("Meta ultrapassada em "));
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let input = build_inputs(sample_cli()).expect("valid inputs");
        let run = run_scenarios(&input).expect("run should succeed");
        let response = build_simulate_response(&input, &run);

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"target\""));
        assert!(json.contains("\"records\""));
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"progress\""));
        assert!(json.contains("\"scenario\":\"Pessimistic\""));
        assert!(json.contains("\"accumulatedValue\""));
        assert!(json.contains("\"targetProgressPercent\""));
        assert!(json.contains("\"finalValue\""));
        assert!(json.contains("\"barFraction\""));
    }

    #[test]
    fn golden_snapshot_zero_capital_response_json() {
        let mut cli = sample_cli();
        cli.initial_amount = 0.0;
        cli.monthly_contribution = 0.0;
        cli.base_rate = 10.0;
        cli.horizon_years = 1;
        cli.target = 1_000.0;

        let input = build_inputs(cli).expect("valid inputs");
        let run = run_scenarios(&input).expect("run should succeed");
        let response = build_simulate_response(&input, &run);
        let json = format!(
            "{}\n",
            serde_json::to_string(&response).expect("response should serialize")
        );

        assert_golden_snapshot("tests/golden/zero_capital_response.json", &json);
    }
}
