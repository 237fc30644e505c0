//! Data Transfer Objects for API requests and responses.
//!
//! Requests are validated with `validator` before they reach a service;
//! responses are flat projections of domain entities.

pub mod campaigns;
pub mod conversions;
pub mod health;
pub mod links;
pub mod pagination;
pub mod payouts;
