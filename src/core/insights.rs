use serde::Serialize;

use super::types::{EquityCheck, Inputs, PaymentPlans};

const TIGHT_BUDGET_PRICE_FRACTION: f64 = 0.004;
const HIGH_EQUITY_PRICE_FRACTION: f64 = 0.4;
const RETURN_SPREAD_THRESHOLD: f64 = 0.02;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    RentInvest,
    FullRepayment,
    LaterInvest,
    MinimumInvest,
}

impl Strategy {
    pub fn label(self) -> &'static str {
        match self {
            Strategy::RentInvest => "Rent & Invest",
            Strategy::FullRepayment => "Property Full Repayment",
            Strategy::LaterInvest => "Property + Later Invest",
            Strategy::MinimumInvest => "Property Min + Invest",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "code")]
pub enum Notice {
    InsufficientEquity { shortfall: f64 },
    InsufficientBudgetFullRepayment,
    InsufficientBudgetHybrid,
    RentExceedsBudget,
    TightBudget,
    HighEquity,
    InvestmentsOutpaceProperty,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::InsufficientEquity { shortfall } => format!(
                "Equity is below the legal minimum; {shortfall:.0} more is required."
            ),
            Notice::InsufficientBudgetFullRepayment => "Monthly budget does not cover the minimum \
                 payments of the full repayment strategy."
                .to_string(),
            Notice::InsufficientBudgetHybrid => "Monthly budget does not cover the minimum \
                 payments of the hybrid strategy; nothing is invested until it does."
                .to_string(),
            Notice::RentExceedsBudget => {
                "Monthly rent exceeds the available budget.".to_string()
            }
            Notice::TightBudget => "Monthly budget might be tight for property ownership. \
                 Consider a lower-priced property."
                .to_string(),
            Notice::HighEquity => "High equity position; the excess above the minimum \
                 down payment could be invested instead."
                .to_string(),
            Notice::InvestmentsOutpaceProperty => "Expected investment returns significantly \
                 exceed property appreciation; consider allocating more to investments."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeEntry {
    #[serde(flatten)]
    pub notice: Notice,
    pub message: String,
}

impl From<Notice> for NoticeEntry {
    fn from(notice: Notice) -> Self {
        Self {
            message: notice.message(),
            notice,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySummary {
    pub strategy: Strategy,
    pub label: &'static str,
    pub final_net_worth: f64,
    pub cagr: Option<f64>,
    pub payoff_year: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub summaries: Vec<StrategySummary>,
    pub warnings: Vec<NoticeEntry>,
    pub recommendations: Vec<NoticeEntry>,
}

pub fn cagr(initial_value: f64, final_value: f64, years: u32) -> Option<f64> {
    if initial_value <= 0.0 || final_value < 0.0 || years == 0 {
        return None;
    }
    Some((final_value / initial_value).powf(1.0 / years as f64) - 1.0)
}

pub fn warnings(equity_check: &EquityCheck, payments: &PaymentPlans) -> Vec<Notice> {
    let mut notices = Vec::new();
    if !equity_check.is_valid {
        notices.push(Notice::InsufficientEquity {
            shortfall: equity_check.shortfall,
        });
    }
    if !payments.full_repayment.is_sufficient {
        notices.push(Notice::InsufficientBudgetFullRepayment);
    }
    if !payments.hybrid.is_sufficient {
        notices.push(Notice::InsufficientBudgetHybrid);
    }
    if !payments.rent_invest.is_sufficient {
        notices.push(Notice::RentExceedsBudget);
    }
    notices
}

pub fn recommendations(inputs: &Inputs, portfolio_return: f64) -> Vec<Notice> {
    let mut notices = Vec::new();
    if inputs.monthly_budget < TIGHT_BUDGET_PRICE_FRACTION * inputs.property_price {
        notices.push(Notice::TightBudget);
    }
    if inputs.equity > HIGH_EQUITY_PRICE_FRACTION * inputs.property_price {
        notices.push(Notice::HighEquity);
    }
    if portfolio_return > inputs.annual_appreciation_rate + RETURN_SPREAD_THRESHOLD {
        notices.push(Notice::InvestmentsOutpaceProperty);
    }
    notices
}

pub(crate) fn build_insights(
    inputs: &Inputs,
    portfolio_return: f64,
    equity_check: &EquityCheck,
    payments: &PaymentPlans,
    outcomes: &[(Strategy, &[f64], Option<u32>)],
) -> Insights {
    let summaries = outcomes
        .iter()
        .map(|&(strategy, progression, payoff_year)| {
            let final_net_worth = progression.last().copied().unwrap_or(inputs.equity);
            StrategySummary {
                strategy,
                label: strategy.label(),
                final_net_worth,
                cagr: cagr(inputs.equity, final_net_worth, progression.len() as u32),
                payoff_year,
            }
        })
        .collect();

    Insights {
        summaries,
        warnings: warnings(equity_check, payments)
            .into_iter()
            .map(NoticeEntry::from)
            .collect(),
        recommendations: recommendations(inputs, portfolio_return)
            .into_iter()
            .map(NoticeEntry::from)
            .collect(),
    }
}
