//! Commission calculation.
//!
//! Pure and deterministic: the result depends only on the commission model
//! snapshot, the sale amount and the currency.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::entities::CommissionModel;

/// Currencies without a minor unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];

/// Currencies with three decimal places.
const THREE_DECIMAL_CURRENCIES: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

/// Largest amount a `NUMERIC(18,4)` money column holds: 99999999999999.9999.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, 4);

/// Number of decimal places of the currency's minor unit (ISO 4217).
pub fn minor_units(currency: &str) -> u32 {
    if ZERO_DECIMAL_CURRENCIES.contains(&currency) {
        0
    } else if THREE_DECIMAL_CURRENCIES.contains(&currency) {
        3
    } else {
        2
    }
}

/// Rounds an amount to the currency's minor unit, half-up, keeping exactly
/// that many decimal places.
pub fn round_to_currency(amount: Decimal, currency: &str) -> Decimal {
    let dp = minor_units(currency);
    let mut rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Computes the commission owed for a sale.
///
/// - `PERCENTAGE`: `sale_amount * rate / 100`, rounded half-up to the currency's minor unit
/// - `FIXED`: the fixed amount, whatever the sale amount
///
/// Returns `None` if the multiplication overflows.
pub fn compute_commission(
    model: &CommissionModel,
    sale_amount: Decimal,
    currency: &str,
) -> Option<Decimal> {
    match model {
        CommissionModel::Percentage { rate } => sale_amount
            .checked_mul(*rate)
            .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
            .map(|commission| round_to_currency(commission, currency)),
        CommissionModel::Fixed { amount } => Some(*amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(rate: Decimal) -> CommissionModel {
        CommissionModel::Percentage { rate }
    }

    #[test]
    fn test_percentage_commission() {
        let commission =
            compute_commission(&pct(Decimal::TEN), Decimal::new(25000, 2), "USD").unwrap();
        assert_eq!(commission, Decimal::new(2500, 2));
        assert_eq!(commission.to_string(), "25.00");
    }

    #[test]
    fn test_fixed_commission_ignores_sale_amount() {
        let model = CommissionModel::Fixed {
            amount: Decimal::new(1500, 2),
        };
        for sale in [Decimal::ZERO, Decimal::new(1, 2), Decimal::new(9_999_999, 2)] {
            assert_eq!(
                compute_commission(&model, sale, "USD"),
                Some(Decimal::new(1500, 2))
            );
        }
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 12.5% of 0.20 = 0.025 -> 0.03
        let commission =
            compute_commission(&pct(Decimal::new(125, 1)), Decimal::new(20, 2), "USD");
        assert_eq!(commission, Some(Decimal::new(3, 2)));

        // 7% of 10.07 = 0.7049 -> 0.70
        let commission = compute_commission(&pct(Decimal::new(7, 0)), Decimal::new(1007, 2), "EUR");
        assert_eq!(commission, Some(Decimal::new(70, 2)));
    }

    #[test]
    fn test_rounding_follows_currency_minor_units() {
        // 15% of 1005 JPY = 150.75 -> 151
        let commission = compute_commission(&pct(Decimal::new(15, 0)), Decimal::new(1005, 0), "JPY");
        assert_eq!(commission, Some(Decimal::new(151, 0)));

        // 3% of 10.005 KWD = 0.30015 -> 0.300
        let commission = compute_commission(&pct(Decimal::new(3, 0)), Decimal::new(10005, 3), "KWD");
        assert_eq!(commission, Some(Decimal::new(300, 3)));
    }

    #[test]
    fn test_overflowing_percentage_is_none() {
        let commission = compute_commission(&pct(Decimal::ONE_HUNDRED), Decimal::MAX, "USD");
        assert_eq!(commission, None);
    }

    #[test]
    fn test_max_amount_fits_numeric_column() {
        assert_eq!(MAX_AMOUNT.to_string(), "99999999999999.9999");
        let commission = compute_commission(&pct(Decimal::ONE_HUNDRED), MAX_AMOUNT, "USD");
        assert!(commission.is_some());
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(minor_units("USD"), 2);
        assert_eq!(minor_units("JPY"), 0);
        assert_eq!(minor_units("BHD"), 3);
    }

    #[test]
    fn test_deterministic() {
        let model = pct(Decimal::new(333, 1));
        let sale = Decimal::new(12345, 2);
        assert_eq!(
            compute_commission(&model, sale, "USD"),
            compute_commission(&model, sale, "USD")
        );
    }
}
