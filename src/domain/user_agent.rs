//! User-agent classification for click analytics.
//!
//! Ordered substring rules over the lowercased header. Device: tablet and
//! mobile patterns are checked before falling back to desktop. Browser: Edge,
//! Chrome, Firefox, Safari (not Chrome), Opera, IE, otherwise `other`.

use crate::domain::entities::{BrowserFamily, DeviceClass};

const TABLET_PATTERNS: &[&str] = &["ipad", "tablet", "playbook", "kindle", "silk/"];
const MOBILE_PATTERNS: &[&str] = &[
    "mobile",
    "iphone",
    "ipod",
    "android",
    "blackberry",
    "opera mini",
    "iemobile",
    "windows phone",
];

pub fn parse_device(user_agent: &str) -> DeviceClass {
    let ua = user_agent.to_ascii_lowercase();

    // Android tablets omit "mobile" from their user agent.
    let android_tablet = ua.contains("android") && !ua.contains("mobile");

    if android_tablet || TABLET_PATTERNS.iter().any(|p| ua.contains(p)) {
        DeviceClass::Tablet
    } else if MOBILE_PATTERNS.iter().any(|p| ua.contains(p)) {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

pub fn parse_browser(user_agent: &str) -> BrowserFamily {
    let ua = user_agent.to_ascii_lowercase();

    if ua.contains("edg/") || ua.contains("edge/") {
        BrowserFamily::Edge
    } else if ua.contains("chrome/") || ua.contains("crios/") {
        BrowserFamily::Chrome
    } else if ua.contains("firefox/") || ua.contains("fxios/") {
        BrowserFamily::Firefox
    } else if ua.contains("safari/") {
        BrowserFamily::Safari
    } else if ua.contains("opera") || ua.contains("opr/") {
        BrowserFamily::Opera
    } else if ua.contains("msie") || ua.contains("trident/") {
        BrowserFamily::Ie
    } else {
        BrowserFamily::Other
    }
}

/// Classifies an optional user agent; a missing header is a desktop `other`.
pub fn classify(user_agent: Option<&str>) -> (DeviceClass, BrowserFamily) {
    match user_agent {
        Some(ua) => (parse_device(ua), parse_browser(ua)),
        None => (DeviceClass::Desktop, BrowserFamily::Other),
    }
}
