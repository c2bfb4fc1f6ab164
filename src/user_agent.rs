//! Shared User-Agent strings for scraping, download, and service API clients.
//!
//! Single source so page fetches and binary downloads present the same browser
//! identity, while first-party API calls identify the service honestly.

/// Browser User-Agent sent on every page and binary fetch.
///
/// The search site serves reduced markup to unknown agents, so scraping and
/// downloads always present as a desktop browser.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// User-Agent for calls to the transactional mail API.
#[must_use]
pub(crate) fn service_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("shelfkeeper/{version}")
}
