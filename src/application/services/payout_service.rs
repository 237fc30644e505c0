//! Earnings reporting and the payment request lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

use crate::domain::commission::round_to_currency;
use crate::domain::entities::{
    NewPaymentRequest, PaymentOutcome, PaymentRequest, PaymentSettlement, PaymentStatus,
};
use crate::domain::ledger::EarningsReport;
use crate::domain::repositories::PayoutRepository;
use crate::error::AppError;

/// Input for [`PayoutService::create_request`].
#[derive(Debug, Clone)]
pub struct RequestPayout {
    pub affiliate_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

pub struct PayoutService<P: PayoutRepository> {
    repository: Arc<P>,
}

impl<P: PayoutRepository> PayoutService<P> {
    pub fn new(repository: Arc<P>) -> Self {
        Self { repository }
    }

    /// Earnings breakdown for an affiliate in one currency.
    ///
    /// The optional range narrows the breakdown figures; the withdrawable
    /// balance is always computed over all time.
    pub async fn earnings_report(
        &self,
        affiliate_id: i64,
        currency: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<EarningsReport, AppError> {
        let currency = normalize_currency(currency)?;

        if let (Some(from), Some(to)) = (from, to)
            && from >= to
        {
            return Err(AppError::bad_request(
                "Range start must be before range end",
                json!({ "from": from, "to": to }),
            ));
        }

        let period = self
            .repository
            .ledger(affiliate_id, &currency, from, to)
            .await?;

        let all_time = if from.is_none() && to.is_none() {
            period.clone()
        } else {
            self.repository
                .ledger(affiliate_id, &currency, None, None)
                .await?
        };

        Ok(EarningsReport::new(currency, &period, &all_time))
    }

    /// Opens a withdrawal request in `PENDING`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a non-positive amount, an amount
    /// finer than the currency allows, or an empty period.
    /// Returns [`AppError::InsufficientBalance`] if the amount exceeds the
    /// available balance, other open requests included.
    pub async fn create_request(&self, request: RequestPayout) -> Result<PaymentRequest, AppError> {
        let currency = normalize_currency(&request.currency)?;

        if request.amount <= Decimal::ZERO {
            return Err(AppError::bad_request(
                "Amount must be greater than 0",
                json!({ "amount": request.amount }),
            ));
        }
        if round_to_currency(request.amount, &currency) != request.amount {
            return Err(AppError::bad_request(
                "Amount has more decimal places than the currency allows",
                json!({ "amount": request.amount, "currency": currency }),
            ));
        }
        if request.period_end <= request.period_start {
            return Err(AppError::bad_request(
                "Period end must be after period start",
                json!({ "period_start": request.period_start, "period_end": request.period_end }),
            ));
        }

        let created = self
            .repository
            .create_request(NewPaymentRequest {
                affiliate_id: request.affiliate_id,
                amount: request.amount,
                currency,
                period_start: request.period_start,
                period_end: request.period_end,
            })
            .await;

        match &created {
            Ok(payment) => {
                metrics::counter!("payment_requests_total", "status" => "PENDING").increment(1);
                tracing::info!(
                    payment_request_id = payment.id,
                    affiliate_id = payment.affiliate_id,
                    amount = %payment.amount,
                    "Payment request created"
                );
            }
            Err(AppError::InsufficientBalance { requested, available }) => {
                tracing::info!(
                    affiliate_id = request.affiliate_id,
                    %requested,
                    %available,
                    "Payment request refused"
                );
            }
            Err(_) => {}
        }

        created
    }

    /// Applies an administrative outcome to a request.
    ///
    /// Completion claims the approved, unpaid conversions of the request's
    /// period in the same transaction as the status change.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if a completion has no transaction id.
    /// Returns [`AppError::NotFound`] if the request does not exist.
    /// Returns [`AppError::InvalidState`] if the transition is not allowed
    /// from the current status.
    pub async fn process_request(
        &self,
        id: i64,
        outcome: PaymentOutcome,
        actor_id: i64,
    ) -> Result<PaymentSettlement, AppError> {
        let target = outcome.target_status();

        let settled = match outcome {
            PaymentOutcome::Completed { transaction_id } => {
                let transaction_id = transaction_id.trim();
                if transaction_id.is_empty() {
                    return Err(AppError::bad_request(
                        "Transaction id is required to complete a payment",
                        json!({ "payment_request_id": id }),
                    ));
                }
                self.repository
                    .complete(id, transaction_id, actor_id)
                    .await?
            }
            PaymentOutcome::Processing => self
                .repository
                .transition(id, PaymentStatus::Processing, actor_id, None)
                .await?
                .map(unclaimed),
            PaymentOutcome::Failed { reason } => self
                .repository
                .transition(id, PaymentStatus::Failed, actor_id, reason)
                .await?
                .map(unclaimed),
        };

        let Some(settlement) = settled else {
            return Err(self.rejected_transition(id, target).await);
        };

        metrics::counter!("payment_requests_total", "status" => target.as_str()).increment(1);
        tracing::info!(
            payment_request_id = id,
            actor_id,
            status = %target,
            claimed_conversions = settlement.claimed_conversions,
            "Payment request processed"
        );

        Ok(settlement)
    }

    pub async fn get_request(&self, id: i64) -> Result<PaymentRequest, AppError> {
        self.repository.find_by_id(id).await?.ok_or_else(|| {
            AppError::not_found(
                "Payment request not found",
                json!({ "payment_request_id": id }),
            )
        })
    }

    /// Payment request history, newest first, with the total count.
    pub async fn history(
        &self,
        affiliate_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<PaymentRequest>, i64), AppError> {
        let items = self
            .repository
            .list_by_affiliate(affiliate_id, page, page_size)
            .await?;
        let total = self.repository.count_by_affiliate(affiliate_id).await?;
        Ok((items, total))
    }

    async fn rejected_transition(&self, id: i64, requested: PaymentStatus) -> AppError {
        match self.repository.find_by_id(id).await {
            Ok(Some(current)) => AppError::invalid_state(
                "Payment request cannot move to the requested status",
                json!({
                    "payment_request_id": id,
                    "status": current.status,
                    "requested": requested,
                }),
            ),
            Ok(None) => AppError::not_found(
                "Payment request not found",
                json!({ "payment_request_id": id }),
            ),
            Err(e) => e,
        }
    }
}

fn unclaimed(request: PaymentRequest) -> PaymentSettlement {
    PaymentSettlement {
        request,
        claimed_conversions: 0,
        claimed_commission: Decimal::ZERO,
    }
}

fn normalize_currency(currency: &str) -> Result<String, AppError> {
    let currency = currency.trim().to_ascii_uppercase();
    if currency.len() == 3 && currency.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(currency)
    } else {
        Err(AppError::bad_request(
            "Currency must be a 3-letter ISO 4217 code",
            json!({ "currency": currency }),
        ))
    }
}
