use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::core::{
    AssetMix, ProjectionError, ProjectionInput, ProjectionResult, assistant, compute_projection,
    format_inr,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    current_age: Option<u32>,
    #[serde(alias = "retireAge")]
    retirement_age: Option<u32>,
    #[serde(alias = "monthly")]
    monthly_contribution: Option<f64>,
    #[serde(alias = "returnRate", alias = "annualReturnRatePercent")]
    annual_return_rate: Option<f64>,
    #[serde(alias = "equityPercent")]
    equity: Option<f64>,
    #[serde(alias = "corporate", alias = "corporateBondPercent")]
    corporate_bonds: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AssistantPayload {
    message: String,
}

#[derive(Parser, Debug)]
#[command(
    name = "nps-calc",
    about = "NPS retirement corpus, pension and tax-saving projector",
    after_help = "Run `nps-calc serve [port]` to start the HTTP API instead."
)]
struct Cli {
    #[arg(long, default_value_t = 30, help = "Current age in years (18-65)")]
    current_age: u32,
    #[arg(long, default_value_t = 60, help = "Retirement age in years (60-70)")]
    retirement_age: u32,
    #[arg(
        long,
        default_value_t = 5_000.0,
        help = "Monthly contribution in rupees (500-50000)"
    )]
    monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Expected annual return in percent, in steps of 0.5"
    )]
    annual_return_rate: f64,
    #[arg(
        long,
        default_value_t = 50.0,
        help = "Equity share in percent (0-75); display only"
    )]
    equity: f64,
    #[arg(
        long,
        default_value_t = 30.0,
        help = "Corporate bond share in percent, clamped to what equity leaves; display only"
    )]
    corporate_bonds: f64,
    #[arg(long, help = "Print the projection as JSON")]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputEcho {
    current_age: u32,
    retirement_age: u32,
    monthly_contribution: f64,
    annual_return_rate: f64,
    equity: f64,
    corporate_bonds: f64,
    government_securities: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DisplaySummary {
    total_corpus: String,
    total_invested: String,
    total_returns: String,
    estimated_monthly_pension: String,
    lump_sum_withdrawal: String,
    total_tax_saved: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    input: InputEcho,
    result: ProjectionResult,
    display: DisplaySummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssistantInfoResponse {
    welcome: &'static str,
    quick_actions: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_input(cli: &Cli) -> Result<ProjectionInput, ProjectionError> {
    Ok(ProjectionInput {
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        monthly_contribution: cli.monthly_contribution,
        annual_return_rate_percent: cli.annual_return_rate,
        asset_mix: AssetMix::new(cli.equity, cli.corporate_bonds)?,
    })
}

/// Runs the projection CLI with the given process arguments.
pub fn run_cli<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let input = build_input(&cli).map_err(|e| e.to_string())?;
    let result = compute_projection(&input).map_err(|e| e.to_string())?;

    if cli.json {
        let response = build_projection_response(&input, result);
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| format!("failed to serialize projection: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", render_report(&input, &result));
    }
    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route(
            "/api/assistant",
            get(assistant_info_handler).post(assistant_post_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "NPS calculator API listening");
    info!("local access: http://127.0.0.1:{}/api/projection", config.port);

    axum::serve(listener, router()).await
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

async fn projection_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    projection_handler_impl(payload)
}

fn projection_handler_impl(payload: ProjectionPayload) -> Response {
    let projected = input_from_payload(payload)
        .and_then(|input| compute_projection(&input).map(|result| (input, result)));

    match projected {
        Ok((input, result)) => {
            debug!(
                years = result.years,
                total_corpus = result.total_corpus,
                "projection computed"
            );
            json_response(StatusCode::OK, build_projection_response(&input, result))
        }
        Err(err) => {
            warn!(field = err.field(), %err, "projection rejected");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

async fn assistant_info_handler() -> Response {
    json_response(
        StatusCode::OK,
        AssistantInfoResponse {
            welcome: assistant::WELCOME_MESSAGE,
            quick_actions: assistant::QUICK_ACTIONS.to_vec(),
        },
    )
}

async fn assistant_post_handler(Json(payload): Json<AssistantPayload>) -> Response {
    assistant_handler_impl(payload)
}

fn assistant_handler_impl(payload: AssistantPayload) -> Response {
    if payload.message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "message must not be empty");
    }
    let answer = assistant::reply(&payload.message);
    debug!(matched = answer.matched, "assistant replied");
    json_response(StatusCode::OK, answer)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
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
fn payload_from_json(json: &str) -> Result<ProjectionPayload, String> {
    serde_json::from_str::<ProjectionPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))
}

fn input_from_payload(payload: ProjectionPayload) -> Result<ProjectionInput, ProjectionError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_return_rate {
        cli.annual_return_rate = v;
    }
    if let Some(v) = payload.equity {
        cli.equity = v;
    }
    if let Some(v) = payload.corporate_bonds {
        cli.corporate_bonds = v;
    }

    build_input(&cli)
}

fn default_cli_for_api() -> Cli {
    let defaults = ProjectionInput::default();
    Cli {
        current_age: defaults.current_age,
        retirement_age: defaults.retirement_age,
        monthly_contribution: defaults.monthly_contribution,
        annual_return_rate: defaults.annual_return_rate_percent,
        equity: defaults.asset_mix.equity_percent,
        corporate_bonds: defaults.asset_mix.corporate_bond_percent,
        json: false,
    }
}

fn build_projection_response(input: &ProjectionInput, result: ProjectionResult) -> ProjectionResponse {
    let display = DisplaySummary {
        total_corpus: format_inr(result.total_corpus),
        total_invested: format_inr(result.total_invested),
        total_returns: format_inr(result.total_returns),
        estimated_monthly_pension: format_inr(result.estimated_monthly_pension),
        lump_sum_withdrawal: format_inr(result.lump_sum_withdrawal),
        total_tax_saved: format_inr(result.total_tax_saved),
    };
    ProjectionResponse {
        input: InputEcho {
            current_age: input.current_age,
            retirement_age: input.retirement_age,
            monthly_contribution: input.monthly_contribution,
            annual_return_rate: input.annual_return_rate_percent,
            equity: result.asset_mix.equity_percent,
            corporate_bonds: result.asset_mix.corporate_bond_percent,
            government_securities: result.asset_mix.government_security_percent,
        },
        result,
        display,
    }
}

fn render_report(input: &ProjectionInput, result: &ProjectionResult) -> String {
    let mix = &result.asset_mix;
    let mut out = String::new();

    out.push_str("NPS pension projection\n");
    out.push_str(&format!(
        "  Age {} to {} ({} years, {} monthly contributions of {})\n",
        input.current_age,
        input.retirement_age,
        result.years,
        result.total_months,
        format_inr(input.monthly_contribution)
    ));
    out.push_str(&format!(
        "  Expected return {:.1}% a year; asset mix E {}% / C {}% / G {}% (display only)\n\n",
        input.annual_return_rate_percent,
        mix.equity_percent,
        mix.corporate_bond_percent,
        mix.government_security_percent
    ));

    for (label, amount) in [
        ("Total corpus at retirement", result.total_corpus),
        ("Total invested", result.total_invested),
        ("Total returns earned", result.total_returns),
        ("Lump sum withdrawal (60%)", result.lump_sum_withdrawal),
        ("Annuity purchase (40%)", result.annuity_corpus),
        ("Estimated monthly pension", result.estimated_monthly_pension),
    ] {
        out.push_str(&format!("  {label:<28}{}\n", format_inr(amount)));
    }
    out.push_str(&format!(
        "  {:<28}{}\n",
        format!("Tax saved ({} years)", result.years),
        format_inr(result.total_tax_saved)
    ));

    out.push_str("\nCorpus growth\n");
    out.push_str(&format!("  {:<6}{:<16}{}\n", "Age", "Corpus", "Invested"));
    for point in &result.growth_series {
        out.push_str(&format!(
            "  {:<6}{:<16}{}\n",
            point.age,
            format_inr(point.corpus),
            format_inr(point.invested)
        ));
    }

    out.push_str("\nWhat-if scenarios\n");
    for (scenario, label) in result
        .what_if_scenarios
        .iter()
        .zip(["Current", "1.5x more", "2x more"])
    {
        out.push_str(&format!(
            "  {:<10}{:>14}/mo  {}\n",
            label,
            format_inr(scenario.monthly_amount),
            format_inr(scenario.corpus_at_retirement)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

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

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn default_cli_matches_calculator_defaults() {
        let input = build_input(&sample_cli()).expect("valid inputs");
        assert_eq!(input, ProjectionInput::default());
    }

    #[test]
    fn build_input_clamps_corporate_share() {
        let mut cli = sample_cli();
        cli.equity = 70.0;
        cli.corporate_bonds = 45.0;

        let input = build_input(&cli).expect("valid inputs");
        assert_approx(input.asset_mix.corporate_bond_percent, 30.0);
        assert_approx(input.asset_mix.government_security_percent, 0.0);
    }

    #[test]
    fn build_input_rejects_equity_above_cap() {
        let mut cli = sample_cli();
        cli.equity = 90.0;

        let err = build_input(&cli).expect_err("must reject equity above cap");
        assert!(err.to_string().contains("equityPercent"));
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::parse_from([
            "nps-calc",
            "--current-age",
            "35",
            "--retirement-age",
            "65",
            "--monthly-contribution",
            "7500",
            "--annual-return-rate",
            "9.5",
            "--json",
        ]);
        assert_eq!(cli.current_age, 35);
        assert_eq!(cli.retirement_age, 65);
        assert_approx(cli.monthly_contribution, 7_500.0);
        assert_approx(cli.annual_return_rate, 9.5);
        assert_approx(cli.equity, 50.0);
        assert!(cli.json);
    }

    #[test]
    fn payload_parses_web_keys_and_aliases() {
        let payload = payload_from_json(
            r#"{
              "currentAge": 28,
              "retireAge": 62,
              "monthly": 12000,
              "returnRate": 8.5,
              "equity": 60,
              "corporate": 25
            }"#,
        )
        .expect("json should parse");
        let input = input_from_payload(payload).expect("valid inputs");

        assert_eq!(input.current_age, 28);
        assert_eq!(input.retirement_age, 62);
        assert_approx(input.monthly_contribution, 12_000.0);
        assert_approx(input.annual_return_rate_percent, 8.5);
        assert_approx(input.asset_mix.equity_percent, 60.0);
        assert_approx(input.asset_mix.corporate_bond_percent, 25.0);
        assert_approx(input.asset_mix.government_security_percent, 15.0);
    }

    #[test]
    fn empty_payload_uses_defaults() {
        let payload = payload_from_json("{}").expect("json should parse");
        let input = input_from_payload(payload).expect("valid inputs");
        assert_eq!(input, ProjectionInput::default());
    }

    #[test]
    fn projection_response_serialization_contains_expected_fields() {
        let input = ProjectionInput::default();
        let result = compute_projection(&input).expect("valid input");
        let response = build_projection_response(&input, result);
        let json = serde_json::to_string(&response).expect("response should serialize");

        for key in [
            "\"input\"",
            "\"annualReturnRate\"",
            "\"totalCorpus\"",
            "\"totalInvested\"",
            "\"totalReturns\"",
            "\"estimatedMonthlyPension\"",
            "\"totalTaxSaved\"",
            "\"growthSeries\"",
            "\"whatIfScenarios\"",
            "\"corpusAtRetirement\"",
            "\"governmentSecurityPercent\"",
            "\"display\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
        assert_eq!(response.display.total_invested, "₹18.00 L");
        assert_eq!(response.display.total_corpus, "₹1.14 Cr");
    }

    #[tokio::test]
    async fn projection_handler_returns_result() {
        let payload = payload_from_json(r#"{"currentAge": 30, "retirementAge": 60}"#)
            .expect("json should parse");
        let response = projection_handler_impl(payload);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
        let body = body_json(response).await;
        assert_eq!(body["result"]["years"], 30);
        assert_eq!(body["result"]["growthSeries"].as_array().map(Vec::len), Some(30));
        assert_eq!(body["result"]["whatIfScenarios"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn input_echo_carries_derived_government_share() {
        let mut cli = sample_cli();
        cli.equity = 70.0;
        cli.corporate_bonds = 45.0;
        let input = build_input(&cli).expect("valid inputs");
        let result = compute_projection(&input).expect("valid input");
        let response = build_projection_response(&input, result);

        assert_approx(response.input.equity, 70.0);
        assert_approx(response.input.corporate_bonds, 30.0);
        assert_approx(response.input.government_securities, 0.0);
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"governmentSecurities\":0.0"), "unexpected {json}");
    }

    #[tokio::test]
    async fn router_serves_projection_from_query_string_aliases() {
        let request = Request::builder()
            .uri("/api/projection?currentAge=35&retireAge=65&monthly=7500&returnRate=9.5&corporate=20")
            .body(Body::empty())
            .expect("valid request");
        let response = router().oneshot(request).await.expect("router is infallible");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["input"]["currentAge"], 35);
        assert_eq!(body["input"]["retirementAge"], 65);
        assert_eq!(body["input"]["monthlyContribution"], 7500.0);
        assert_eq!(body["input"]["annualReturnRate"], 9.5);
        assert_eq!(body["input"]["governmentSecurities"], 30.0);
        assert_eq!(body["result"]["growthSeries"].as_array().map(Vec::len), Some(30));
    }

    #[tokio::test]
    async fn router_rejects_out_of_domain_query() {
        let request = Request::builder()
            .uri("/api/projection?returnRate=3")
            .body(Body::empty())
            .expect("valid request");
        let response = router().oneshot(request).await.expect("router is infallible");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let message = body["error"].as_str().expect("error message");
        assert!(message.contains("annualReturnRatePercent"), "unexpected message {message}");
    }

    #[tokio::test]
    async fn router_falls_back_to_json_404() {
        let request = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .expect("valid request");
        let response = router().oneshot(request).await.expect("router is infallible");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn projection_handler_rejects_non_positive_duration() {
        let payload = payload_from_json(r#"{"currentAge": 62, "retirementAge": 62}"#)
            .expect("json should parse");
        let response = projection_handler_impl(payload);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let message = body["error"].as_str().expect("error message");
        assert!(message.contains("retirementAge"), "unexpected message {message}");
    }

    #[tokio::test]
    async fn assistant_handler_answers_known_questions() {
        let response = assistant_handler_impl(AssistantPayload {
            message: "What is NPS?".to_string(),
        });
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["matched"], true);
    }

    #[tokio::test]
    async fn assistant_handler_rejects_empty_message() {
        let response = assistant_handler_impl(AssistantPayload {
            message: "   ".to_string(),
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn assistant_info_lists_quick_actions() {
        let body = body_json(assistant_info_handler().await).await;
        assert_eq!(body["quickActions"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Not found");
    }

    #[test]
    fn report_lists_every_year_and_scenario() {
        let input = ProjectionInput {
            current_age: 55,
            retirement_age: 60,
            ..ProjectionInput::default()
        };
        let result = compute_projection(&input).expect("valid input");
        let report = render_report(&input, &result);

        for age in 56..=60 {
            assert!(report.contains(&format!("  {age:<6}")), "missing age {age}");
        }
        assert!(report.contains("What-if scenarios"));
        assert!(report.contains("₹10,000"));
        assert!(report.contains("Tax saved (5 years)"));
    }
}
