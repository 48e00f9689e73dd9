use tracing::debug;

use super::insights::{Strategy, build_insights};
use super::ltv::ltv_progression;
use super::rates::{combined_portfolio_return, grow_for_year, monthly_rate_from_annual};
use super::regulation::{
    loan_to_value, minimum_annual_amortization, minimum_payments, monthly_payments,
    rent_invest_payments, validate_minimum_equity,
};
use super::types::{
    AllocationMode, Comparison, Inputs, LtvStrategy, LtvTracks, MONTHS_PER_YEAR, PaymentPlans,
    PropertyScenario, Regulation, StrategyResult,
};

#[derive(Debug)]
struct LoanState {
    balance: f64,
    property_value: f64,
    investment_value: f64,
}

impl LoanState {
    fn new(scenario: &PropertyScenario) -> Self {
        Self {
            balance: scenario.initial_loan(),
            property_value: scenario.property_price,
            investment_value: 0.0,
        }
    }

    fn appreciate(&mut self, annual_rate: f64) {
        self.property_value *= 1.0 + annual_rate;
    }

    fn ltv(&self) -> f64 {
        loan_to_value(self.balance, self.property_value)
    }

    fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }

    fn invest_for_year(&mut self, scenario: &PropertyScenario, monthly_contribution: f64) {
        self.investment_value = grow_for_year(
            self.investment_value,
            scenario.annual_portfolio_return,
            monthly_contribution,
            scenario.investment_compounding,
        );
    }

    fn net_worth(&self) -> f64 {
        self.property_value - self.balance + self.investment_value
    }
}

/// Renting and investing everything left after rent. Compounds monthly and
/// records the portfolio value at the end of every year.
pub fn simulate_rent_invest(
    monthly_budget: f64,
    annual_portfolio_return: f64,
    initial_equity: f64,
    horizon_years: u32,
    monthly_rent: f64,
) -> Vec<f64> {
    let monthly_rate = monthly_rate_from_annual(annual_portfolio_return);
    let monthly_saving = monthly_budget - monthly_rent;
    let mut value = initial_equity;
    let mut progression = Vec::with_capacity(horizon_years as usize);

    for _ in 0..horizon_years {
        for _ in 0..MONTHS_PER_YEAR {
            value = value * (1.0 + monthly_rate) + monthly_saving;
        }
        progression.push(value);
    }

    progression
}

/// Full-repayment (`continue_amortization_after_target = true`) and
/// later-invest (`false`) strategies.
///
/// While the LTV is above target, or while still inside the amortization
/// period when continuing, the whole budget left after interest goes into
/// the loan. Otherwise the surplus is invested, and once the loan is gone
/// the entire budget is.
pub fn simulate_property_strategy(
    scenario: &PropertyScenario,
    rules: &Regulation,
    continue_amortization_after_target: bool,
) -> StrategyResult {
    let min_amort_per_year = minimum_annual_amortization(
        rules,
        scenario.property_price,
        scenario.initial_loan(),
    );
    let annual_budget = scenario.monthly_budget * MONTHS_PER_YEAR as f64;
    let mut state = LoanState::new(scenario);
    let mut payoff_year = None;
    let mut progression = Vec::with_capacity(scenario.horizon_years as usize);

    for year in 0..scenario.horizon_years {
        state.appreciate(scenario.annual_appreciation_rate);
        let interest = state.balance * scenario.annual_interest_rate;
        let current_ltv = state.ltv();

        if state.is_paid_off() {
            state.invest_for_year(scenario, scenario.monthly_budget);
        } else if current_ltv > rules.target_ltv
            || (continue_amortization_after_target && year < scenario.amortization_years)
        {
            let amortization = state
                .balance
                .min(min_amort_per_year.max(annual_budget - interest));
            state.balance -= amortization;
            if state.is_paid_off() {
                state.balance = 0.0;
                if payoff_year.is_none() {
                    payoff_year = Some(year + 1);
                }
            }
        } else {
            let monthly_investment =
                ((annual_budget - interest) / MONTHS_PER_YEAR as f64).max(0.0);
            state.invest_for_year(scenario, monthly_investment);
        }

        progression.push(state.net_worth());
    }

    StrategyResult {
        progression,
        payoff_year,
    }
}

/// Minimum-amortization-plus-investment strategy: pays only the regulatory
/// minimum while above target LTV inside the amortization period and invests
/// the rest of the budget from the first year.
pub fn simulate_hybrid_strategy(scenario: &PropertyScenario, rules: &Regulation) -> StrategyResult {
    let min_amort_per_year = minimum_annual_amortization(
        rules,
        scenario.property_price,
        scenario.initial_loan(),
    );
    let monthly_min_amort = min_amort_per_year / MONTHS_PER_YEAR as f64;
    let mut state = LoanState::new(scenario);
    let mut payoff_year = None;
    let mut progression = Vec::with_capacity(scenario.horizon_years as usize);

    for year in 0..scenario.horizon_years {
        state.appreciate(scenario.annual_appreciation_rate);
        let interest = state.balance * scenario.annual_interest_rate;
        let monthly_interest = interest / MONTHS_PER_YEAR as f64;
        let current_ltv = state.ltv();

        let monthly_investment = if state.is_paid_off() {
            scenario.monthly_budget
        } else if current_ltv > rules.target_ltv && year < scenario.amortization_years {
            state.balance -= min_amort_per_year;
            if state.is_paid_off() && payoff_year.is_none() {
                payoff_year = Some(year + 1);
            }
            (scenario.monthly_budget - monthly_interest - monthly_min_amort).max(0.0)
        } else {
            (scenario.monthly_budget - monthly_interest).max(0.0)
        };

        state.balance = state.balance.max(0.0);
        state.invest_for_year(scenario, monthly_investment);
        progression.push(state.net_worth());
    }

    StrategyResult {
        progression,
        payoff_year,
    }
}

pub fn property_scenario(inputs: &Inputs) -> PropertyScenario {
    PropertyScenario {
        property_price: inputs.property_price,
        down_payment: inputs.equity,
        monthly_budget: inputs.monthly_budget,
        annual_interest_rate: inputs.annual_interest_rate,
        annual_appreciation_rate: inputs.annual_appreciation_rate,
        annual_portfolio_return: portfolio_return(inputs),
        amortization_years: inputs.amortization_years,
        horizon_years: inputs.horizon_years,
        investment_compounding: inputs.investment_compounding,
    }
}

pub fn portfolio_return(inputs: &Inputs) -> f64 {
    let stock_pct = inputs.stock_allocation_pct.clamp(0.0, 100.0);
    combined_portfolio_return(
        stock_pct,
        100.0 - stock_pct,
        inputs.stock_return,
        inputs.btc_return,
    )
}

pub fn run_comparison(inputs: &Inputs) -> Comparison {
    let rules = &inputs.regulation;
    let scenario = property_scenario(inputs);

    let rent_invest = simulate_rent_invest(
        inputs.monthly_budget,
        scenario.annual_portfolio_return,
        inputs.equity,
        inputs.horizon_years,
        inputs.monthly_rent,
    );
    let full_repayment = simulate_property_strategy(&scenario, rules, true);
    let later_invest = simulate_property_strategy(&scenario, rules, false);
    let minimum_invest = simulate_hybrid_strategy(&scenario, rules);

    let outcomes: [(Strategy, &[f64], Option<u32>); 4] = [
        (Strategy::RentInvest, rent_invest.as_slice(), None),
        (
            Strategy::FullRepayment,
            full_repayment.progression.as_slice(),
            full_repayment.payoff_year,
        ),
        (
            Strategy::LaterInvest,
            later_invest.progression.as_slice(),
            later_invest.payoff_year,
        ),
        (
            Strategy::MinimumInvest,
            minimum_invest.progression.as_slice(),
            minimum_invest.payoff_year,
        ),
    ];
    for (strategy, progression, payoff_year) in outcomes {
        debug!(
            strategy = strategy.label(),
            final_net_worth = progression.last().copied().unwrap_or(0.0),
            ?payoff_year,
            "strategy simulated"
        );
    }

    let payments = PaymentPlans {
        rent_invest: rent_invest_payments(inputs.monthly_budget, inputs.monthly_rent),
        full_repayment: monthly_payments(
            rules,
            inputs.property_price,
            inputs.equity,
            inputs.monthly_budget,
            inputs.annual_interest_rate,
            AllocationMode::MaxAmortization,
        ),
        hybrid: monthly_payments(
            rules,
            inputs.property_price,
            inputs.equity,
            inputs.monthly_budget,
            inputs.annual_interest_rate,
            AllocationMode::Hybrid,
        ),
    };

    let ltv = LtvTracks {
        full_repayment: ltv_progression(&scenario, rules, LtvStrategy::MaxAmortization),
        later_invest: ltv_progression(&scenario, rules, LtvStrategy::PureInvest),
        minimum_invest: ltv_progression(&scenario, rules, LtvStrategy::Hybrid),
    };

    let equity_check = validate_minimum_equity(rules, inputs.property_price, inputs.equity);
    let insights = build_insights(
        inputs,
        scenario.annual_portfolio_return,
        &equity_check,
        &payments,
        &outcomes,
    );

    Comparison {
        horizon_years: inputs.horizon_years,
        portfolio_return: scenario.annual_portfolio_return,
        amortization_years: inputs.amortization_years,
        regulation: *rules,
        equity_check,
        minimum_payments: minimum_payments(
            rules,
            inputs.property_price,
            inputs.equity,
            inputs.annual_interest_rate,
        ),
        payments,
        rent_invest,
        full_repayment,
        later_invest,
        minimum_invest,
        ltv,
        insights,
    }
}
