use serde::Serialize;

use super::insights::Insights;

pub const HORIZON_YEARS: u32 = 30;
pub const MONTHS_PER_YEAR: u32 = 12;

/// Jurisdictional mortgage rules. `Default` is the Swiss regime: loans above
/// 66.7% LTV amortize the excess linearly over 15 years, and at least 20% of
/// the purchase price must come from the buyer's own equity.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Regulation {
    pub amortization_window_years: u32,
    pub target_ltv: f64,
    pub min_equity_fraction: f64,
}

impl Default for Regulation {
    fn default() -> Self {
        Self {
            amortization_window_years: 15,
            target_ltv: 0.667,
            min_equity_fraction: 0.20,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationMode {
    MaxAmortization,
    Hybrid,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LtvStrategy {
    MaxAmortization,
    PureInvest,
    Hybrid,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compounding {
    #[default]
    Annual,
    Monthly,
}

/// Loan and market parameters for the property-backed simulators.
///
/// Preconditions: `property_price > 0`, `horizon_years > 0`, all rates finite
/// and greater than -100%.
#[derive(Copy, Clone, Debug)]
pub struct PropertyScenario {
    pub property_price: f64,
    pub down_payment: f64,
    pub monthly_budget: f64,
    pub annual_interest_rate: f64,
    pub annual_appreciation_rate: f64,
    pub annual_portfolio_return: f64,
    pub amortization_years: u32,
    pub horizon_years: u32,
    pub investment_compounding: Compounding,
}

impl PropertyScenario {
    pub fn initial_loan(&self) -> f64 {
        (self.property_price - self.down_payment).max(0.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityCheck {
    pub is_valid: bool,
    pub required_equity: f64,
    pub shortfall: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimumPayments {
    pub monthly_interest: f64,
    pub monthly_min_amort: f64,
    pub total_min_payment: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub interest: f64,
    pub amortization: f64,
    pub investment: f64,
    pub is_sufficient: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub progression: Vec<f64>,
    pub payoff_year: Option<u32>,
}

/// Loan figures fixed at purchase time, shared by every LTV track of a scenario.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationAnalysis {
    pub initial_loan: f64,
    pub required_loan_reduction: f64,
    pub min_monthly_amort: f64,
    pub initial_monthly_interest: f64,
    pub initial_total_payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LtvProgression {
    pub strategy: LtvStrategy,
    pub analysis: AmortizationAnalysis,
    pub years_to_target: Option<u32>,
    pub final_ltv: f64,
    pub final_balance: f64,
    pub year_end_ltv: Vec<f64>,
    pub ltv_progression: Vec<f64>,
    pub balance_progression: Vec<f64>,
    pub property_value_progression: Vec<f64>,
}

/// Everything one comparison run needs. Rates are fractions (0.015 = 1.5%),
/// allocations are percentages.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub property_price: f64,
    pub equity: f64,
    pub monthly_budget: f64,
    pub monthly_rent: f64,
    pub annual_interest_rate: f64,
    pub annual_appreciation_rate: f64,
    pub stock_allocation_pct: f64,
    pub stock_return: f64,
    pub btc_return: f64,
    pub amortization_years: u32,
    pub horizon_years: u32,
    pub investment_compounding: Compounding,
    pub regulation: Regulation,
}

#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlans {
    pub rent_invest: PaymentBreakdown,
    pub full_repayment: PaymentBreakdown,
    pub hybrid: PaymentBreakdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LtvTracks {
    pub full_repayment: LtvProgression,
    pub later_invest: LtvProgression,
    pub minimum_invest: LtvProgression,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub horizon_years: u32,
    pub portfolio_return: f64,
    pub amortization_years: u32,
    pub regulation: Regulation,
    pub equity_check: EquityCheck,
    pub minimum_payments: MinimumPayments,
    pub payments: PaymentPlans,
    pub rent_invest: Vec<f64>,
    pub full_repayment: StrategyResult,
    pub later_invest: StrategyResult,
    pub minimum_invest: StrategyResult,
    pub ltv: LtvTracks,
    pub insights: Insights,
}
