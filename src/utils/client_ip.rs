//! Requester address and country extraction.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Returns the client IP for a request.
///
/// When `behind_proxy` is set the first `X-Forwarded-For` hop, then
/// `X-Real-IP`, are trusted before the socket peer address. Without a proxy
/// those headers are attacker-controlled and ignored.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return ip.to_string();
        }
    }

    peer.ip().to_string()
}

/// ISO 3166 alpha-2 country set by an edge proxy (`CF-IPCountry` or
/// `X-Country-Code`), uppercased. Placeholder values such as `XX` are dropped.
pub fn client_country(headers: &HeaderMap) -> Option<String> {
    ["cf-ipcountry", "x-country-code"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_uppercase())
        .find(|v| v.len() == 2 && v.bytes().all(|b| b.is_ascii_alphabetic()) && v.as_str() != "XX")
}
