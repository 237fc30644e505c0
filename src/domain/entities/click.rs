//! Click entity representing a single visit through a tracking link.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Coarse device class derived from the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser family derived from the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserFamily {
    Edge,
    Chrome,
    Firefox,
    Safari,
    Opera,
    Ie,
    Other,
}

impl BrowserFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Safari => "safari",
            Self::Opera => "opera",
            Self::Ie => "ie",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for BrowserFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requester metadata captured by the HTTP layer for a click.
///
/// All fields are optional; missing headers are recorded as `NULL`.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub country: Option<String>,
    pub visitor_id: Option<String>,
}

/// A recorded click. Append-only.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub device: String,
    pub browser: String,
    pub country: Option<String>,
    pub visitor_id: Option<String>,
}

/// Input data for recording a click.
///
/// `campaign_id` is carried so the store can bump the campaign counter in the
/// same transaction as the link counter.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub campaign_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub device: DeviceClass,
    pub browser: BrowserFamily,
    pub country: Option<String>,
    pub visitor_id: Option<String>,
}
