mod engine;
mod insights;
mod ltv;
mod rates;
mod regulation;
mod types;

pub use engine::{
    portfolio_return, property_scenario, run_comparison, simulate_hybrid_strategy,
    simulate_property_strategy, simulate_rent_invest,
};
pub use insights::{
    Insights, Notice, NoticeEntry, Strategy, StrategySummary, cagr, recommendations, warnings,
};
pub use ltv::ltv_progression;
pub use rates::{
    annual_rate_from_monthly, combined_portfolio_return, grow_for_year, monthly_rate_from_annual,
};
pub use regulation::{
    loan_to_value, minimum_annual_amortization, minimum_payments, monthly_payments,
    rent_invest_payments, validate_minimum_equity,
};
pub use types::{
    AllocationMode, AmortizationAnalysis, Comparison, Compounding, EquityCheck, HORIZON_YEARS,
    Inputs, LtvProgression, LtvStrategy, LtvTracks, MONTHS_PER_YEAR, MinimumPayments,
    PaymentBreakdown, PaymentPlans, PropertyScenario, Regulation, StrategyResult,
};
