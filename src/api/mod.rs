//! HTTP layer: request/response translation for the tracking and API
//! endpoints.
//!
//! # Modules
//!
//! - [`dto`] - Request and response bodies
//! - [`handlers`] - Endpoint handlers
//! - [`middleware`] - Authentication, rate limiting, tracing
//! - [`routes`] - Authenticated API route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
