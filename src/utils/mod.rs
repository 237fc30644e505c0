//! Helpers shared by the services and the HTTP layer.
//!
//! - [`code_generator`] - tracking code generation and alias validation
//! - [`attribution_token`] - signed attribution tokens
//! - [`url_normalizer`] - destination URL normalization
//! - [`client_ip`] - requester address and country extraction

pub mod attribution_token;
pub mod client_ip;
pub mod code_generator;
pub mod url_normalizer;
