//! Core domain entities of the affiliate tracking model.
//!
//! Entities are plain data; state-machine rules live on their status enums.
//! Creation inputs use separate `New*` structs.
//!
//! - [`Campaign`] - commission model, status, validity window and counters
//! - [`AffiliateLink`] - tracking code owned by one affiliate in one campaign
//! - [`Click`] - append-only visit record
//! - [`Conversion`] - attributed sale with immutable commission
//! - [`PaymentRequest`] - withdrawal of approved commission
//! - [`Actor`] - authenticated caller and its [`Role`]

pub mod actor;
pub mod campaign;
pub mod click;
pub mod conversion;
pub mod link;
pub mod payment_request;

pub use actor::{Actor, Role};
pub use campaign::{
    Campaign, CampaignCounters, CampaignSnapshot, CampaignStatus, CommissionModel, NewCampaign,
};
pub use click::{BrowserFamily, Click, DeviceClass, NewClick, RequestMetadata};
pub use conversion::{AttributionOutcome, Conversion, ConversionStatus, NewConversion};
pub use link::{AffiliateLink, NewAffiliateLink, ResolvedLink};
pub use payment_request::{
    PaymentSettlement, NewPaymentRequest, PaymentOutcome, PaymentRequest, PaymentStatus,
};
