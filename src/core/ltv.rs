use super::rates::monthly_rate_from_annual;
use super::regulation::{loan_to_value, minimum_payments};
use super::types::{
    AmortizationAnalysis, LtvProgression, LtvStrategy, MONTHS_PER_YEAR, PropertyScenario,
    Regulation,
};

/// Month-by-month loan-to-value path for one amortization policy.
///
/// Each month the property appreciates by the monthly-equivalent rate, the
/// LTV is sampled before that month's amortization, and the balance is then
/// reduced according to `strategy`. `years_to_target` is the 1-based year of
/// the first month whose LTV is at or below the regulatory target, and
/// `year_end_ltv` holds the last sample of every year.
pub fn ltv_progression(
    scenario: &PropertyScenario,
    rules: &Regulation,
    strategy: LtvStrategy,
) -> LtvProgression {
    let loan = scenario.initial_loan();
    let minimum = minimum_payments(
        rules,
        scenario.property_price,
        scenario.down_payment,
        scenario.annual_interest_rate,
    );
    let min_monthly_amort = minimum.monthly_min_amort;
    let analysis = AmortizationAnalysis {
        initial_loan: loan,
        required_loan_reduction: (loan - scenario.property_price * rules.target_ltv).max(0.0),
        min_monthly_amort,
        initial_monthly_interest: minimum.monthly_interest,
        initial_total_payment: minimum.total_min_payment,
    };
    let monthly_appreciation = monthly_rate_from_annual(scenario.annual_appreciation_rate);
    let months = scenario.horizon_years * MONTHS_PER_YEAR;

    let mut balance = loan;
    let mut property_value = scenario.property_price;
    let mut years_to_target = None;
    let mut ltv_progression = Vec::with_capacity(months as usize);
    let mut balance_progression = Vec::with_capacity(months as usize);
    let mut property_value_progression = Vec::with_capacity(months as usize);

    for month in 0..months {
        property_value = (property_value * (1.0 + monthly_appreciation)).max(0.0);
        let monthly_interest = balance * scenario.annual_interest_rate / MONTHS_PER_YEAR as f64;
        let current_ltv = loan_to_value(balance, property_value);
        let max_amortization = balance
            .min(min_monthly_amort.max(scenario.monthly_budget - monthly_interest))
            .max(0.0);

        let amortization = if current_ltv <= rules.target_ltv {
            if years_to_target.is_none() {
                years_to_target = Some(month / MONTHS_PER_YEAR + 1);
            }
            match strategy {
                LtvStrategy::MaxAmortization => max_amortization,
                LtvStrategy::PureInvest | LtvStrategy::Hybrid => 0.0,
            }
        } else {
            match strategy {
                LtvStrategy::Hybrid => min_monthly_amort.min(balance),
                LtvStrategy::MaxAmortization | LtvStrategy::PureInvest => max_amortization,
            }
        };

        balance = (balance - amortization).max(0.0);
        ltv_progression.push(current_ltv);
        balance_progression.push(balance);
        property_value_progression.push(property_value);
    }

    let year_end_ltv = ltv_progression
        .chunks(MONTHS_PER_YEAR as usize)
        .filter_map(|year| year.last().copied())
        .collect();

    LtvProgression {
        strategy,
        analysis,
        years_to_target,
        final_ltv: ltv_progression.last().copied().unwrap_or(0.0),
        final_balance: balance_progression.last().copied().unwrap_or(0.0),
        year_end_ltv,
        ltv_progression,
        balance_progression,
        property_value_progression,
    }
}
