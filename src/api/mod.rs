use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    Comparison, Compounding, HORIZON_YEARS, Inputs, Regulation, loan_to_value, run_comparison,
};
use crate::error::InputError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCompounding {
    Annual,
    Monthly,
}

impl From<CliCompounding> for Compounding {
    fn from(value: CliCompounding) -> Self {
        match value {
            CliCompounding::Annual => Compounding::Annual,
            CliCompounding::Monthly => Compounding::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiCompounding {
    #[serde(alias = "yearly", alias = "annually")]
    Annual,
    #[serde(alias = "monthly-compounding")]
    Monthly,
}

impl From<ApiCompounding> for CliCompounding {
    fn from(value: ApiCompounding) -> Self {
        match value {
            ApiCompounding::Annual => CliCompounding::Annual,
            ApiCompounding::Monthly => CliCompounding::Monthly,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    property_price: Option<f64>,
    equity: Option<f64>,
    monthly_budget: Option<f64>,
    monthly_rent: Option<f64>,

    interest_rate: Option<f64>,
    appreciation_rate: Option<f64>,

    stock_allocation: Option<f64>,
    stock_return: Option<f64>,
    btc_return: Option<f64>,
    compounding: Option<ApiCompounding>,

    amortization_years: Option<u32>,
    target_ltv: Option<f64>,
    amortization_window: Option<u32>,
    min_equity: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "homeplan",
    about = "Compare renting and investing against three mortgage strategies over 30 years",
    after_help = "Run `homeplan serve [port]` to start the HTTP API instead."
)]
pub struct Cli {
    #[arg(long, default_value_t = 1_000_000.0, help = "Purchase price of the property")]
    property_price: f64,
    #[arg(
        long,
        default_value_t = 200_000.0,
        help = "Own capital: down payment, or starting portfolio when renting"
    )]
    equity: f64,
    #[arg(
        long,
        default_value_t = 3_500.0,
        help = "Monthly amount available for interest, amortization and investing"
    )]
    monthly_budget: f64,
    #[arg(
        long,
        default_value_t = 2_000.0,
        help = "Monthly rent paid in the rent & invest strategy"
    )]
    monthly_rent: f64,
    #[arg(
        long,
        default_value_t = 1.5,
        allow_negative_numbers = true,
        help = "Mortgage interest rate in percent, may be negative"
    )]
    interest_rate: f64,
    #[arg(long, default_value_t = 2.0, help = "Annual property appreciation in percent")]
    appreciation_rate: f64,
    #[arg(
        long,
        default_value_t = 80.0,
        help = "Stock share of the portfolio in percent; the rest is Bitcoin"
    )]
    stock_allocation: f64,
    #[arg(long, default_value_t = 7.0, help = "Expected annual stock return in percent")]
    stock_return: f64,
    #[arg(long, default_value_t = 20.0, help = "Expected annual Bitcoin return in percent")]
    btc_return: f64,
    #[arg(
        long,
        help = "Amortization period in years; forced to the regulatory window when the initial LTV exceeds the target"
    )]
    amortization_years: Option<u32>,
    #[arg(long, default_value_t = 66.7, help = "Regulatory target LTV in percent")]
    target_ltv: f64,
    #[arg(
        long,
        default_value_t = 15,
        help = "Years allowed to amortize down to the target LTV"
    )]
    amortization_window: u32,
    #[arg(long, default_value_t = 20.0, help = "Minimum own equity in percent of the price")]
    min_equity: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliCompounding::Annual,
        help = "Compounding of the investment side of the property strategies"
    )]
    compounding: CliCompounding,
    #[arg(long, default_value_t = false, help = "Pretty-print the JSON report")]
    pretty: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputsEcho {
    property_price: f64,
    equity: f64,
    monthly_budget: f64,
    monthly_rent: f64,
    annual_interest_rate: f64,
    annual_appreciation_rate: f64,
    stock_allocation: f64,
    btc_allocation: f64,
    stock_return: f64,
    btc_return: f64,
    investment_compounding: Compounding,
}

impl From<&Inputs> for InputsEcho {
    fn from(inputs: &Inputs) -> Self {
        Self {
            property_price: inputs.property_price,
            equity: inputs.equity,
            monthly_budget: inputs.monthly_budget,
            monthly_rent: inputs.monthly_rent,
            annual_interest_rate: inputs.annual_interest_rate,
            annual_appreciation_rate: inputs.annual_appreciation_rate,
            stock_allocation: inputs.stock_allocation_pct,
            btc_allocation: 100.0 - inputs.stock_allocation_pct,
            stock_return: inputs.stock_return,
            btc_return: inputs.btc_return,
            investment_compounding: inputs.investment_compounding,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    inputs: InputsEcho,
    #[serde(flatten)]
    comparison: Comparison,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_inputs(cli: Cli) -> Result<Inputs, InputError> {
    for (name, value) in [
        ("--property-price", cli.property_price),
        ("--equity", cli.equity),
        ("--monthly-budget", cli.monthly_budget),
        ("--monthly-rent", cli.monthly_rent),
        ("--interest-rate", cli.interest_rate),
        ("--appreciation-rate", cli.appreciation_rate),
        ("--stock-allocation", cli.stock_allocation),
        ("--stock-return", cli.stock_return),
        ("--btc-return", cli.btc_return),
        ("--target-ltv", cli.target_ltv),
        ("--min-equity", cli.min_equity),
    ] {
        if !value.is_finite() {
            return Err(InputError::NonFinite(name));
        }
    }

    if cli.property_price <= 0.0 {
        return Err(InputError::OutOfRange {
            name: "--property-price",
            expected: "> 0",
        });
    }

    for (name, value) in [
        ("--equity", cli.equity),
        ("--monthly-budget", cli.monthly_budget),
        ("--monthly-rent", cli.monthly_rent),
        ("--appreciation-rate", cli.appreciation_rate),
    ] {
        if value < 0.0 {
            return Err(InputError::OutOfRange {
                name,
                expected: ">= 0",
            });
        }
    }

    if !(0.0..=100.0).contains(&cli.stock_allocation) {
        return Err(InputError::OutOfRange {
            name: "--stock-allocation",
            expected: "between 0 and 100",
        });
    }

    for (name, rate) in [
        ("--interest-rate", cli.interest_rate),
        ("--stock-return", cli.stock_return),
        ("--btc-return", cli.btc_return),
    ] {
        if rate <= -100.0 {
            return Err(InputError::OutOfRange {
                name,
                expected: "> -100",
            });
        }
    }

    for (name, pct) in [
        ("--target-ltv", cli.target_ltv),
        ("--min-equity", cli.min_equity),
    ] {
        if pct <= 0.0 || pct >= 100.0 {
            return Err(InputError::OutOfRange {
                name,
                expected: "strictly between 0 and 100",
            });
        }
    }

    if !(1..=HORIZON_YEARS).contains(&cli.amortization_window) {
        return Err(InputError::YearsOutOfRange {
            name: "--amortization-window",
            max: HORIZON_YEARS,
        });
    }

    let regulation = Regulation {
        amortization_window_years: cli.amortization_window,
        target_ltv: cli.target_ltv / 100.0,
        min_equity_fraction: cli.min_equity / 100.0,
    };

    let initial_ltv = loan_to_value(
        (cli.property_price - cli.equity).max(0.0),
        cli.property_price,
    );
    let amortization_years = if initial_ltv > regulation.target_ltv {
        regulation.amortization_window_years
    } else {
        cli.amortization_years
            .unwrap_or(regulation.amortization_window_years)
    };
    if !(1..=HORIZON_YEARS).contains(&amortization_years) {
        return Err(InputError::YearsOutOfRange {
            name: "--amortization-years",
            max: HORIZON_YEARS,
        });
    }

    Ok(Inputs {
        property_price: cli.property_price,
        equity: cli.equity,
        monthly_budget: cli.monthly_budget,
        monthly_rent: cli.monthly_rent,
        annual_interest_rate: cli.interest_rate / 100.0,
        annual_appreciation_rate: cli.appreciation_rate / 100.0,
        stock_allocation_pct: cli.stock_allocation,
        stock_return: cli.stock_return / 100.0,
        btc_return: cli.btc_return / 100.0,
        amortization_years,
        horizon_years: HORIZON_YEARS,
        investment_compounding: cli.compounding.into(),
        regulation,
    })
}

pub fn run_cli(cli: Cli) -> Result<String, InputError> {
    let pretty = cli.pretty;
    let inputs = build_inputs(cli)?;
    let response = build_simulate_response(&inputs);
    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    Ok(json)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "homeplan HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
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
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(err) => {
            warn!(error = %err, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    debug!(
        property_price = inputs.property_price,
        equity = inputs.equity,
        monthly_budget = inputs.monthly_budget,
        "running strategy comparison"
    );
    json_response(StatusCode::OK, build_simulate_response(&inputs))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
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
fn inputs_from_json(json: &str) -> Result<Inputs, InputError> {
    let payload = serde_json::from_str::<SimulatePayload>(json)?;
    inputs_from_payload(payload)
}

fn inputs_from_payload(payload: SimulatePayload) -> Result<Inputs, InputError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.property_price {
        cli.property_price = v;
    }
    if let Some(v) = payload.equity {
        cli.equity = v;
    }
    if let Some(v) = payload.monthly_budget {
        cli.monthly_budget = v;
    }
    if let Some(v) = payload.monthly_rent {
        cli.monthly_rent = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.appreciation_rate {
        cli.appreciation_rate = v;
    }
    if let Some(v) = payload.stock_allocation {
        cli.stock_allocation = v;
    }
    if let Some(v) = payload.stock_return {
        cli.stock_return = v;
    }
    if let Some(v) = payload.btc_return {
        cli.btc_return = v;
    }
    if let Some(v) = payload.compounding {
        cli.compounding = v.into();
    }
    if payload.amortization_years.is_some() {
        cli.amortization_years = payload.amortization_years;
    }
    if let Some(v) = payload.target_ltv {
        cli.target_ltv = v;
    }
    if let Some(v) = payload.amortization_window {
        cli.amortization_window = v;
    }
    if let Some(v) = payload.min_equity {
        cli.min_equity = v;
    }

    build_inputs(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        property_price: 1_000_000.0,
        equity: 200_000.0,
        monthly_budget: 3_500.0,
        monthly_rent: 2_000.0,
        interest_rate: 1.5,
        appreciation_rate: 2.0,
        stock_allocation: 80.0,
        stock_return: 7.0,
        btc_return: 20.0,
        amortization_years: None,
        target_ltv: 66.7,
        amortization_window: 15,
        min_equity: 20.0,
        compounding: CliCompounding::Annual,
        pretty: false,
    }
}

fn build_simulate_response(inputs: &Inputs) -> SimulateResponse {
    SimulateResponse {
        inputs: InputsEcho::from(inputs),
        comparison: run_comparison(inputs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn build_inputs_normalizes_percentages() {
        let inputs = build_inputs(sample_cli()).expect("valid inputs");
        assert_approx(inputs.annual_interest_rate, 0.015);
        assert_approx(inputs.annual_appreciation_rate, 0.02);
        assert_approx(inputs.stock_return, 0.07);
        assert_approx(inputs.btc_return, 0.20);
        assert_approx(inputs.regulation.target_ltv, 0.667);
        assert_approx(inputs.regulation.min_equity_fraction, 0.20);
        assert_eq!(inputs.horizon_years, 30);
        assert_eq!(inputs.investment_compounding, Compounding::Annual);
    }

    #[test]
    fn clap_defaults_match_api_defaults() {
        let parsed = Cli::try_parse_from(["homeplan"]).expect("defaults parse");
        let from_clap = build_inputs(parsed).expect("valid inputs");
        let from_api = build_inputs(sample_cli()).expect("valid inputs");
        assert_approx(from_clap.property_price, from_api.property_price);
        assert_approx(from_clap.monthly_rent, from_api.monthly_rent);
        assert_approx(from_clap.stock_return, from_api.stock_return);
        assert_eq!(from_clap.amortization_years, from_api.amortization_years);
    }

    #[test]
    fn clap_parses_flags() {
        let parsed = Cli::try_parse_from([
            "homeplan",
            "--property-price",
            "800000",
            "--interest-rate",
            "-0.5",
            "--compounding",
            "monthly",
        ])
        .expect("flags parse");
        let inputs = build_inputs(parsed).expect("valid inputs");
        assert_approx(inputs.property_price, 800_000.0);
        assert_approx(inputs.annual_interest_rate, -0.005);
        assert_eq!(inputs.investment_compounding, Compounding::Monthly);
    }

    #[test]
    fn build_inputs_rejects_non_positive_price() {
        let mut cli = sample_cli();
        cli.property_price = 0.0;
        let err = build_inputs(cli).expect_err("must reject zero price");
        assert!(err.to_string().contains("--property-price"));
    }

    #[test]
    fn build_inputs_rejects_non_finite_values() {
        let mut cli = sample_cli();
        cli.monthly_budget = f64::NAN;
        let err = build_inputs(cli).expect_err("must reject NaN budget");
        assert_eq!(err, InputError::NonFinite("--monthly-budget"));
    }

    #[test]
    fn build_inputs_rejects_allocation_above_hundred() {
        let mut cli = sample_cli();
        cli.stock_allocation = 120.0;
        let err = build_inputs(cli).expect_err("must reject allocation > 100");
        assert!(err.to_string().contains("--stock-allocation"));
    }

    #[test]
    fn build_inputs_rejects_target_ltv_outside_unit_range() {
        let mut cli = sample_cli();
        cli.target_ltv = 100.0;
        let err = build_inputs(cli).expect_err("must reject 100% target");
        assert!(err.to_string().contains("--target-ltv"));
    }

    #[test]
    fn build_inputs_forces_window_when_ltv_above_target() {
        let mut cli = sample_cli();
        cli.amortization_years = Some(25);
        let inputs = build_inputs(cli).expect("valid inputs");
        assert_eq!(inputs.amortization_years, 15);
    }

    #[test]
    fn build_inputs_honors_amortization_years_below_target() {
        let mut cli = sample_cli();
        cli.equity = 400_000.0;
        cli.amortization_years = Some(25);
        let inputs = build_inputs(cli).expect("valid inputs");
        assert_eq!(inputs.amortization_years, 25);
    }

    #[test]
    fn build_inputs_rejects_zero_amortization_years() {
        let mut cli = sample_cli();
        cli.equity = 400_000.0;
        cli.amortization_years = Some(0);
        let err = build_inputs(cli).expect_err("must reject zero years");
        assert!(err.to_string().contains("--amortization-years"));
    }

    #[test]
    fn build_inputs_blames_window_when_it_exceeds_horizon() {
        let mut cli = sample_cli();
        cli.amortization_window = 35;
        let err = build_inputs(cli).expect_err("must reject window beyond horizon");
        assert_eq!(
            err,
            InputError::YearsOutOfRange {
                name: "--amortization-window",
                max: HORIZON_YEARS,
            }
        );
        assert_eq!(
            err.to_string(),
            "--amortization-window must be between 1 and 30 years"
        );
    }

    #[test]
    fn build_inputs_rejects_zero_window() {
        let mut cli = sample_cli();
        cli.amortization_window = 0;
        let err = build_inputs(cli).expect_err("must reject empty window");
        assert!(err.to_string().starts_with("--amortization-window"));
    }

    #[test]
    fn inputs_from_json_parses_web_keys() {
        let json = r#"{
          "propertyPrice": 1500000,
          "equity": 400000,
          "monthlyBudget": 6000,
          "monthlyRent": 2500,
          "interestRate": 2.1,
          "appreciationRate": 1.5,
          "stockAllocation": 60,
          "stockReturn": 6,
          "btcReturn": 15,
          "compounding": "monthly",
          "targetLtv": 65,
          "amortizationWindow": 12,
          "minEquity": 25
        }"#;
        let inputs = inputs_from_json(json).expect("json should parse");

        assert_approx(inputs.property_price, 1_500_000.0);
        assert_approx(inputs.equity, 400_000.0);
        assert_approx(inputs.monthly_budget, 6_000.0);
        assert_approx(inputs.monthly_rent, 2_500.0);
        assert_approx(inputs.annual_interest_rate, 0.021);
        assert_approx(inputs.annual_appreciation_rate, 0.015);
        assert_approx(inputs.stock_allocation_pct, 60.0);
        assert_approx(inputs.stock_return, 0.06);
        assert_approx(inputs.btc_return, 0.15);
        assert_eq!(inputs.investment_compounding, Compounding::Monthly);
        assert_approx(inputs.regulation.target_ltv, 0.65);
        assert_eq!(inputs.regulation.amortization_window_years, 12);
        assert_approx(inputs.regulation.min_equity_fraction, 0.25);
        assert_eq!(inputs.amortization_years, 12);
    }

    #[test]
    fn inputs_from_json_reports_malformed_payload() {
        let err = inputs_from_json(r#"{"propertyPrice": "lots"}"#).expect_err("must reject");
        assert!(matches!(err, InputError::Payload(_)));
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let inputs = build_inputs(sample_cli()).expect("valid inputs");
        let response = build_simulate_response(&inputs);
        let json = serde_json::to_string(&response).expect("response should serialize");
        for key in [
            "\"inputs\"",
            "\"portfolioReturn\"",
            "\"equityCheck\"",
            "\"minimumPayments\"",
            "\"payments\"",
            "\"rentInvest\"",
            "\"fullRepayment\"",
            "\"laterInvest\"",
            "\"minimumInvest\"",
            "\"payoffYear\"",
            "\"yearsToTarget\"",
            "\"ltvProgression\"",
            "\"yearEndLtv\"",
            "\"finalLtv\"",
            "\"finalBalance\"",
            "\"requiredLoanReduction\"",
            "\"initialTotalPayment\"",
            "\"propertyValueProgression\"",
            "\"insights\"",
            "\"recommendations\"",
        ] {
            assert!(json.contains(key), "missing {key}");
        }
    }

    #[test]
    fn run_cli_prints_comparison_json() {
        let json = run_cli(sample_cli()).expect("cli run succeeds");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["rentInvest"].as_array().map(Vec::len), Some(30));
        assert_eq!(value["regulation"]["amortizationWindowYears"], 15);
    }

    #[tokio::test]
    async fn simulate_handler_rejects_invalid_payload() {
        let payload = SimulatePayload {
            property_price: Some(-1.0),
            ..SimulatePayload::default()
        };
        let response = simulate_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("valid json");
        assert!(
            value["error"]
                .as_str()
                .is_some_and(|msg| msg.contains("--property-price"))
        );
    }

    #[tokio::test]
    async fn simulate_handler_defaults_succeed_without_caching() {
        let response = simulate_handler_impl(SimulatePayload::default()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
    }
}
