//! Per-client rate limiting (token bucket).

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::net::IpAddr;
use std::sync::Arc;
use tower_governor::{
    GovernorError, GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

pub type RateLimitLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Keys requests by client IP.
///
/// Behind a trusted proxy the forwarding headers are honoured
/// ([`SmartIpKeyExtractor`]); otherwise only the socket peer address counts.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor {
    behind_proxy: bool,
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.behind_proxy {
            SmartIpKeyExtractor.extract(req)
        } else {
            PeerIpKeyExtractor.extract(req)
        }
    }
}

fn build(per_second: u64, burst: u32, behind_proxy: bool) -> RateLimitLayer {
    let config = GovernorConfigBuilder::default()
        .per_second(per_second)
        .burst_size(burst)
        .key_extractor(ClientIpKeyExtractor { behind_proxy })
        .finish()
        .expect("rate limit period and burst are non-zero");

    GovernorLayer::new(Arc::new(config))
}

/// Limiter for the public tracking endpoints.
///
/// - **Rate**: 20 requests per second
/// - **Burst**: 200 requests
///
/// Generous because one visitor page may embed several pixels.
pub fn tracking_layer(behind_proxy: bool) -> RateLimitLayer {
    build(20, 200, behind_proxy)
}

/// Limiter for the authenticated API.
///
/// - **Rate**: 5 requests per second
/// - **Burst**: 50 requests
pub fn api_layer(behind_proxy: bool) -> RateLimitLayer {
    build(5, 50, behind_proxy)
}
