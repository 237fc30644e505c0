//! Domain layer containing business entities and rules.
//!
//! Nothing here depends on HTTP or on a particular store. Repository traits
//! define the contracts implemented by the infrastructure layer.
//!
//! - [`entities`] - core business data structures
//! - [`repositories`] - data access trait definitions
//! - [`commission`] - commission calculator and currency rounding
//! - [`ledger`] - earnings sums and the withdrawable balance
//! - [`user_agent`] - device and browser classification
//! - [`click_event`] / [`click_worker`] - asynchronous pixel click recording
//!
//! # Pixel Flow
//!
//! 1. The pixel handler builds a [`click_event::ClickEvent`] and `try_send`s it
//! 2. [`click_worker::run_click_worker`] records it through the click service
//! 3. Store errors are retried with backoff, link validity failures dropped

pub mod click_event;
pub mod click_worker;
pub mod commission;
pub mod entities;
pub mod ledger;
pub mod repositories;
pub mod user_agent;
