use super::types::{Compounding, MONTHS_PER_YEAR};

pub fn combined_portfolio_return(
    stock_weight_pct: f64,
    btc_weight_pct: f64,
    stock_return: f64,
    btc_return: f64,
) -> f64 {
    stock_weight_pct / 100.0 * stock_return + btc_weight_pct / 100.0 * btc_return
}

// Rates at or below -100% collapse to a total loss instead of going NaN.
pub fn monthly_rate_from_annual(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).max(0.0).powf(1.0 / MONTHS_PER_YEAR as f64) - 1.0
}

pub fn annual_rate_from_monthly(monthly_rate: f64) -> f64 {
    (1.0 + monthly_rate).powi(MONTHS_PER_YEAR as i32) - 1.0
}

/// Applies one year of growth to an investment pot receiving a fixed monthly
/// contribution. `Annual` grows the opening balance once and adds the twelve
/// contributions uncompounded; `Monthly` compounds the equivalent monthly rate
/// and adds each contribution at month end.
pub fn grow_for_year(
    value: f64,
    annual_return: f64,
    monthly_contribution: f64,
    compounding: Compounding,
) -> f64 {
    match compounding {
        Compounding::Annual => {
            value * (1.0 + annual_return) + monthly_contribution * MONTHS_PER_YEAR as f64
        }
        Compounding::Monthly => {
            let monthly_rate = monthly_rate_from_annual(annual_return);
            (0..MONTHS_PER_YEAR).fold(value, |acc, _| {
                acc * (1.0 + monthly_rate) + monthly_contribution
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn combined_return_weights_by_percentage() {
        assert_approx(combined_portfolio_return(80.0, 20.0, 0.07, 0.20), 0.096);
        assert_approx(combined_portfolio_return(100.0, 0.0, 0.07, 0.20), 0.07);
        assert_approx(combined_portfolio_return(0.0, 100.0, 0.07, -0.10), -0.10);
    }

    #[test]
    fn zero_annual_rate_is_zero_monthly_rate() {
        assert_eq!(monthly_rate_from_annual(0.0), 0.0);
    }

    #[test]
    fn total_loss_rate_does_not_produce_nan() {
        assert_approx(monthly_rate_from_annual(-1.0), -1.0);
        assert_approx(monthly_rate_from_annual(-1.5), -1.0);
    }

    #[test]
    fn annual_compounding_adds_contributions_without_growth() {
        let grown = grow_for_year(1_000.0, 0.10, 100.0, Compounding::Annual);
        assert_approx(grown, 1_100.0 + 1_200.0);
    }

    #[test]
    fn monthly_compounding_matches_annual_rate_on_opening_balance() {
        let grown = grow_for_year(1_000.0, 0.10, 0.0, Compounding::Monthly);
        assert!((grown - 1_100.0).abs() <= 1e-6, "got {grown}");
    }

    #[test]
    fn monthly_compounding_earns_more_than_annual_on_contributions() {
        let annual = grow_for_year(0.0, 0.08, 500.0, Compounding::Annual);
        let monthly = grow_for_year(0.0, 0.08, 500.0, Compounding::Monthly);
        assert!(monthly > annual);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_monthly_annual_round_trip(annual_bp in -9_000i32..20_000) {
            let annual = annual_bp as f64 / 10_000.0;
            let recovered = annual_rate_from_monthly(monthly_rate_from_annual(annual));
            prop_assert!((recovered - annual).abs() <= 1e-6, "annual {annual}, recovered {recovered}");
        }
    }
}
