//! Conversion attribution: order events to commission-bearing conversions.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

use crate::domain::commission::{MAX_AMOUNT, compute_commission, round_to_currency};
use crate::domain::entities::{Conversion, NewConversion, ResolvedLink};
use crate::domain::repositories::{ConversionRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::attribution_token::{AttributionSigner, is_signed_token};

use super::link_resolver::LinkResolver;

const DEFAULT_CONVERSION_TYPE: &str = "SALE";
const MAX_ORDER_ID_LEN: usize = 128;

/// An order event to attribute.
#[derive(Debug, Clone)]
pub struct AttributeOrder {
    pub order_id: String,
    pub sale_amount: Decimal,
    /// A tracking code or a signed attribution token.
    pub attribution_ref: String,
    /// Defaults to the campaign currency; must match it when given.
    pub currency: Option<String>,
    pub conversion_type: Option<String>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AttributionResult {
    pub success: bool,
    pub duplicate: bool,
    pub commission: Decimal,
    pub message: String,
    pub conversion: Conversion,
}

/// Turns order events into `PENDING` conversions, once per campaign order id.
pub struct AttributionService<L: LinkRepository, V: ConversionRepository> {
    resolver: LinkResolver<L>,
    conversion_repository: Arc<V>,
    signer: AttributionSigner,
}

impl<L: LinkRepository, V: ConversionRepository> AttributionService<L, V> {
    pub fn new(
        link_repository: Arc<L>,
        conversion_repository: Arc<V>,
        signer: AttributionSigner,
    ) -> Self {
        Self {
            resolver: LinkResolver::new(link_repository),
            conversion_repository,
            signer,
        }
    }

    /// Attributes an order to the link behind `attribution_ref`.
    ///
    /// A repeated `(campaign, order_id)` returns the stored conversion with
    /// `duplicate = true`; counters and commission are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for missing fields, a negative or oversized amount,
    /// a currency mismatch or a forged token.
    /// Returns [`AppError::InvalidState`] if the token's window has elapsed.
    /// Returns [`AppError::LinkUnavailable`] if the link cannot be credited.
    pub async fn attribute(&self, order: AttributeOrder) -> Result<AttributionResult, AppError> {
        let order_id = order.order_id.trim();
        if order_id.is_empty() || order_id.len() > MAX_ORDER_ID_LEN {
            return Err(AppError::bad_request(
                "Order id must be 1-128 characters",
                json!({ "order_id": order.order_id }),
            ));
        }
        if order.sale_amount.is_sign_negative() {
            return Err(AppError::bad_request(
                "Sale amount cannot be negative",
                json!({ "sale_amount": order.sale_amount }),
            ));
        }
        if order.sale_amount > MAX_AMOUNT {
            return Err(sale_amount_too_large(order.sale_amount));
        }

        let (resolved, click_id) = self.resolve_reference(order.attribution_ref.trim()).await?;
        let campaign = &resolved.campaign;

        let currency = match order.currency.as_deref().map(str::trim) {
            Some(given) if !given.eq_ignore_ascii_case(&campaign.currency) => {
                return Err(AppError::bad_request(
                    "Currency does not match campaign currency",
                    json!({ "currency": given, "campaign_currency": campaign.currency }),
                ));
            }
            _ => campaign.currency.clone(),
        };

        let sale_amount = round_to_currency(order.sale_amount, &currency);
        if sale_amount > MAX_AMOUNT {
            return Err(sale_amount_too_large(order.sale_amount));
        }
        let commission = compute_commission(&campaign.commission, sale_amount, &currency)
            .filter(|commission| *commission <= MAX_AMOUNT)
            .ok_or_else(|| {
                AppError::bad_request(
                    "Commission is out of range",
                    json!({ "sale_amount": sale_amount }),
                )
            })?;

        let outcome = self
            .conversion_repository
            .create_if_absent(NewConversion {
                link_id: resolved.link.id,
                campaign_id: campaign.id,
                affiliate_id: resolved.link.affiliate_id,
                click_id,
                order_id: order_id.to_string(),
                sale_amount,
                commission,
                currency,
                conversion_type: order
                    .conversion_type
                    .filter(|t| !t.trim().is_empty())
                    .map(|t| t.trim().to_ascii_uppercase())
                    .unwrap_or_else(|| DEFAULT_CONVERSION_TYPE.to_string()),
                customer_email: order.customer_email,
            })
            .await?;

        let label = if outcome.duplicate { "duplicate" } else { "created" };
        metrics::counter!("conversions_attributed_total", "outcome" => label).increment(1);

        let message = if outcome.duplicate {
            tracing::info!(
                conversion_id = outcome.conversion.id,
                campaign_id = outcome.conversion.campaign_id,
                order_id = %outcome.conversion.order_id,
                "Order already attributed"
            );
            "Order already attributed"
        } else {
            tracing::info!(
                conversion_id = outcome.conversion.id,
                link_id = outcome.conversion.link_id,
                commission = %outcome.conversion.commission,
                "Conversion attributed"
            );
            "Conversion recorded"
        };

        Ok(AttributionResult {
            success: true,
            duplicate: outcome.duplicate,
            commission: outcome.conversion.commission,
            message: message.to_string(),
            conversion: outcome.conversion,
        })
    }

    async fn resolve_reference(
        &self,
        reference: &str,
    ) -> Result<(ResolvedLink, Option<i64>), AppError> {
        if reference.is_empty() {
            return Err(AppError::bad_request(
                "Attribution reference is required",
                json!({}),
            ));
        }

        let now = Utc::now();

        if is_signed_token(reference) {
            let claims = self.signer.verify(reference, now)?;
            let resolved = self.resolver.resolve_id_at(claims.link_id, now).await?;
            Ok((resolved, Some(claims.click_id)))
        } else {
            let resolved = self.resolver.resolve_at(reference, now).await?;
            Ok((resolved, None))
        }
    }
}

fn sale_amount_too_large(amount: Decimal) -> AppError {
    AppError::bad_request(
        "Sale amount is too large",
        json!({ "sale_amount": amount, "max": MAX_AMOUNT }),
    )
}
