//! PostgreSQL implementation of payout repository.
//!
//! Every write that depends on the affiliate's balance takes a transaction
//! scoped advisory lock keyed on the affiliate id, so balance checks and the
//! writes that follow them are serialized per affiliate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;

use super::rows::{PaymentRequestRow, collect};
use crate::domain::entities::{
    NewPaymentRequest, PaymentRequest, PaymentSettlement, PaymentStatus,
};
use crate::domain::ledger::AffiliateLedger;
use crate::domain::repositories::PayoutRepository;
use crate::error::AppError;

pub struct PgPayoutRepository {
    pool: Arc<PgPool>,
}

impl PgPayoutRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

// `pg_advisory_xact_lock` returns `void`, which the checked macros cannot decode.
async fn lock_affiliate(conn: &mut PgConnection, affiliate_id: i64) -> Result<(), AppError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(affiliate_id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Commission sums over `[from, to)` of `converted_at` and payout sums over the
/// same range of `completed_at`. In-flight requests are always counted in full.
async fn read_ledger(
    conn: &mut PgConnection,
    affiliate_id: i64,
    currency: &str,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<AffiliateLedger, AppError> {
    let row = sqlx::query!(
        r#"
        SELECT
            COALESCE(SUM(v.commission) FILTER (WHERE v.status = 'PENDING'), 0) AS "pending!",
            COALESCE(SUM(v.commission) FILTER (WHERE v.status = 'APPROVED'), 0) AS "approved!",
            (SELECT COALESCE(SUM(p.amount), 0)
               FROM payment_requests p
              WHERE p.affiliate_id = $1 AND p.currency = $2 AND p.status = 'COMPLETED'
                AND ($3::timestamptz IS NULL OR p.completed_at >= $3)
                AND ($4::timestamptz IS NULL OR p.completed_at < $4)) AS "paid!",
            (SELECT COALESCE(SUM(p.amount), 0)
               FROM payment_requests p
              WHERE p.affiliate_id = $1 AND p.currency = $2
                AND p.status IN ('PENDING', 'PROCESSING')) AS "in_flight!"
        FROM conversions v
        WHERE v.affiliate_id = $1
          AND v.currency = $2
          AND ($3::timestamptz IS NULL OR v.converted_at >= $3)
          AND ($4::timestamptz IS NULL OR v.converted_at < $4)
        "#,
        affiliate_id,
        currency,
        from,
        to
    )
    .fetch_one(conn)
    .await?;

    Ok(AffiliateLedger {
        pending: row.pending,
        approved: row.approved,
        paid: row.paid,
        in_flight: row.in_flight,
    })
}

#[async_trait]
impl PayoutRepository for PgPayoutRepository {
    async fn ledger(
        &self,
        affiliate_id: i64,
        currency: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<AffiliateLedger, AppError> {
        let mut conn = self.pool.acquire().await?;
        read_ledger(&mut conn, affiliate_id, currency, from, to).await
    }

    async fn create_request(
        &self,
        new_request: NewPaymentRequest,
    ) -> Result<PaymentRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        lock_affiliate(&mut tx, new_request.affiliate_id).await?;

        let ledger = read_ledger(
            &mut tx,
            new_request.affiliate_id,
            &new_request.currency,
            None,
            None,
        )
        .await?;

        let available = ledger.available_for_withdrawal();
        if new_request.amount > available {
            tx.rollback().await?;
            return Err(AppError::InsufficientBalance {
                requested: new_request.amount,
                available,
            });
        }

        let row = sqlx::query_as!(
            PaymentRequestRow,
            r#"
            INSERT INTO payment_requests (affiliate_id, amount, currency, period_start, period_end)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, affiliate_id, amount, currency, period_start, period_end, status,
                      transaction_id, failure_reason, processed_by, requested_at, processed_at,
                      completed_at
            "#,
            new_request.affiliate_id,
            new_request.amount,
            new_request.currency,
            new_request.period_start,
            new_request.period_end
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PaymentRequest>, AppError> {
        let row = sqlx::query_as!(
            PaymentRequestRow,
            r#"
            SELECT id, affiliate_id, amount, currency, period_start, period_end, status,
                   transaction_id, failure_reason, processed_by, requested_at, processed_at,
                   completed_at
            FROM payment_requests
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(PaymentRequest::try_from).transpose()
    }

    async fn transition(
        &self,
        id: i64,
        to: PaymentStatus,
        actor_id: i64,
        failure_reason: Option<String>,
    ) -> Result<Option<PaymentRequest>, AppError> {
        let from: Vec<String> = PaymentStatus::predecessors(to)
            .iter()
            .map(|status| status.as_str().to_string())
            .collect();

        let row = sqlx::query_as!(
            PaymentRequestRow,
            r#"
            UPDATE payment_requests
            SET status = $2,
                processed_by = $3,
                processed_at = NOW(),
                failure_reason = COALESCE($4, failure_reason)
            WHERE id = $1 AND status = ANY($5)
            RETURNING id, affiliate_id, amount, currency, period_start, period_end, status,
                      transaction_id, failure_reason, processed_by, requested_at, processed_at,
                      completed_at
            "#,
            id,
            to.as_str(),
            actor_id,
            failure_reason.as_deref(),
            &from[..]
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(PaymentRequest::try_from).transpose()
    }

    async fn complete(
        &self,
        id: i64,
        transaction_id: &str,
        actor_id: i64,
    ) -> Result<Option<PaymentSettlement>, AppError> {
        let mut tx = self.pool.begin().await?;

        let affiliate_id = sqlx::query_scalar!(
            "SELECT affiliate_id FROM payment_requests WHERE id = $1",
            id
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some(affiliate_id) = affiliate_id else {
            tx.rollback().await?;
            return Ok(None);
        };

        lock_affiliate(&mut tx, affiliate_id).await?;

        let row = sqlx::query_as!(
            PaymentRequestRow,
            r#"
            SELECT id, affiliate_id, amount, currency, period_start, period_end, status,
                   transaction_id, failure_reason, processed_by, requested_at, processed_at,
                   completed_at
            FROM payment_requests
            WHERE id = $1
            FOR UPDATE
            "#,
            id
        )
        .fetch_optional(&mut *tx)
        .await?;

        let request = match row.map(PaymentRequest::try_from).transpose()? {
            Some(request) if request.status == PaymentStatus::Processing => request,
            _ => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        // Every approved, unpaid conversion in the period is settled by this
        // request. Paid earnings come from completed request amounts.
        let claim = sqlx::query!(
            r#"
            WITH claimed AS (
                UPDATE conversions
                SET paid_at = NOW(), payment_request_id = $5
                WHERE affiliate_id = $1
                  AND currency = $2
                  AND status = 'APPROVED'
                  AND paid_at IS NULL
                  AND converted_at >= $3
                  AND converted_at < $4
                RETURNING commission
            )
            SELECT COUNT(*) AS "claimed_conversions!",
                   COALESCE(SUM(commission), 0) AS "claimed_commission!"
            FROM claimed
            "#,
            request.affiliate_id,
            request.currency,
            request.period_start,
            request.period_end,
            request.id
        )
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as!(
            PaymentRequestRow,
            r#"
            UPDATE payment_requests
            SET status = 'COMPLETED',
                transaction_id = $2,
                processed_by = $3,
                processed_at = COALESCE(processed_at, NOW()),
                completed_at = NOW()
            WHERE id = $1
            RETURNING id, affiliate_id, amount, currency, period_start, period_end, status,
                      transaction_id, failure_reason, processed_by, requested_at, processed_at,
                      completed_at
            "#,
            id,
            transaction_id,
            actor_id
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(PaymentSettlement {
            request: row.try_into()?,
            claimed_conversions: claim.claimed_conversions,
            claimed_commission: claim.claimed_commission,
        }))
    }

    async fn list_by_affiliate(
        &self,
        affiliate_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<PaymentRequest>, AppError> {
        let offset = (page - 1).max(0) * page_size;

        let rows = sqlx::query_as!(
            PaymentRequestRow,
            r#"
            SELECT id, affiliate_id, amount, currency, period_start, period_end, status,
                   transaction_id, failure_reason, processed_by, requested_at, processed_at,
                   completed_at
            FROM payment_requests
            WHERE affiliate_id = $1
            ORDER BY requested_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            affiliate_id,
            page_size,
            offset
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        collect(rows)
    }

    async fn count_by_affiliate(&self, affiliate_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar!(
            r#"SELECT COUNT(*) AS "count!" FROM payment_requests WHERE affiliate_id = $1"#,
            affiliate_id
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
