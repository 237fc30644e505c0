//! Affiliate earnings ledger and the withdrawal balance derived from it.

use rust_decimal::Decimal;

/// Commission and payout sums for one affiliate in one currency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffiliateLedger {
    /// Commission of `PENDING` conversions.
    pub pending: Decimal,
    /// Commission of `APPROVED` conversions, paid or not.
    pub approved: Decimal,
    /// Amount of `COMPLETED` payment requests.
    pub paid: Decimal,
    /// Amount of `PENDING` and `PROCESSING` payment requests.
    pub in_flight: Decimal,
}

impl AffiliateLedger {
    /// Approved commission not yet paid out nor reserved by an open request.
    ///
    /// Subtracting in-flight requests keeps two concurrent withdrawals from
    /// spending the same approved balance.
    pub fn available_for_withdrawal(&self) -> Decimal {
        (self.approved - self.paid - self.in_flight).max(Decimal::ZERO)
    }
}

/// Earnings breakdown returned to reporting callers.
#[derive(Debug, Clone, PartialEq)]
pub struct EarningsReport {
    pub currency: String,
    pub total_earnings: Decimal,
    pub approved_earnings: Decimal,
    pub paid_earnings: Decimal,
    pub pending_earnings: Decimal,
    pub available_for_withdrawal: Decimal,
}

impl EarningsReport {
    /// Builds a report whose breakdown covers `period` while the withdrawable
    /// balance is always taken from the all-time ledger.
    pub fn new(currency: String, period: &AffiliateLedger, all_time: &AffiliateLedger) -> Self {
        Self {
            currency,
            total_earnings: period.pending + period.approved,
            approved_earnings: period.approved,
            paid_earnings: period.paid,
            pending_earnings: period.pending,
            available_for_withdrawal: all_time.available_for_withdrawal(),
        }
    }
}
