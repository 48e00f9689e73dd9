use super::types::{
    AllocationMode, EquityCheck, MONTHS_PER_YEAR, MinimumPayments, PaymentBreakdown, Regulation,
};

pub fn validate_minimum_equity(
    rules: &Regulation,
    property_price: f64,
    equity: f64,
) -> EquityCheck {
    let required_equity = property_price * rules.min_equity_fraction;
    EquityCheck {
        is_valid: equity >= required_equity,
        required_equity,
        shortfall: (required_equity - equity).max(0.0),
    }
}

pub fn loan_to_value(balance: f64, property_value: f64) -> f64 {
    if property_value > 0.0 {
        balance / property_value
    } else {
        0.0
    }
}

/// Yearly amortization required to bring `loan` down to the target LTV of
/// the purchase price within the regulatory window. Zero when the loan
/// already sits at or below the target.
pub fn minimum_annual_amortization(rules: &Regulation, property_price: f64, loan: f64) -> f64 {
    let loan = loan.max(0.0);
    if loan_to_value(loan, property_price) > rules.target_ltv {
        (loan - property_price * rules.target_ltv) / rules.amortization_window_years.max(1) as f64
    } else {
        0.0
    }
}

pub fn minimum_payments(
    rules: &Regulation,
    property_price: f64,
    down_payment: f64,
    annual_interest_rate: f64,
) -> MinimumPayments {
    let loan = (property_price - down_payment).max(0.0);
    let monthly_interest = loan * annual_interest_rate / MONTHS_PER_YEAR as f64;
    let monthly_min_amort =
        minimum_annual_amortization(rules, property_price, loan) / MONTHS_PER_YEAR as f64;

    MinimumPayments {
        monthly_interest,
        monthly_min_amort,
        total_min_payment: monthly_interest + monthly_min_amort,
    }
}

pub fn monthly_payments(
    rules: &Regulation,
    property_price: f64,
    down_payment: f64,
    monthly_budget: f64,
    annual_interest_rate: f64,
    mode: AllocationMode,
) -> PaymentBreakdown {
    let loan = (property_price - down_payment).max(0.0);
    let minimum = minimum_payments(rules, property_price, down_payment, annual_interest_rate);
    let monthly_interest = minimum.monthly_interest;
    let monthly_min_amort = minimum.monthly_min_amort;
    let is_sufficient = monthly_budget >= minimum.total_min_payment;

    // Interest is served first; whatever is left amortizes even below the legal minimum.
    if !is_sufficient {
        return PaymentBreakdown {
            interest: monthly_interest,
            amortization: (monthly_budget - monthly_interest).max(0.0),
            investment: 0.0,
            is_sufficient,
        };
    }

    match mode {
        AllocationMode::Hybrid => PaymentBreakdown {
            interest: monthly_interest,
            amortization: monthly_min_amort,
            investment: monthly_budget - monthly_interest - monthly_min_amort,
            is_sufficient,
        },
        AllocationMode::MaxAmortization => PaymentBreakdown {
            interest: monthly_interest,
            amortization: (loan / MONTHS_PER_YEAR as f64)
                .min(monthly_min_amort.max(monthly_budget - monthly_interest)),
            investment: 0.0,
            is_sufficient,
        },
    }
}

pub fn rent_invest_payments(monthly_budget: f64, monthly_rent: f64) -> PaymentBreakdown {
    PaymentBreakdown {
        interest: 0.0,
        amortization: 0.0,
        investment: (monthly_budget - monthly_rent).max(0.0),
        is_sufficient: monthly_budget >= monthly_rent,
    }
}
