//! Validated server configuration.
//!
//! The binary collects raw values from flags and environment variables and
//! hands them over as a [`ServerConfig`]; [`ServerConfig::validate`] rejects
//! anything that would only fail later at request time.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::api::HttpOptions;
use crate::approval::ApprovalSettings;

/// Configuration errors, reported at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A URL setting is not an absolute http(s) URL.
    #[error("{name} is not a valid http(s) URL: {value}")]
    InvalidUrl { name: &'static str, value: String },

    /// A required setting is empty.
    #[error("{name} must not be empty")]
    Empty { name: &'static str },

    /// The admin address is not an email address.
    #[error("ADMIN_EMAIL is not an email address: {0}")]
    InvalidEmail(String),
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Directory holding stored books.
    pub storage_dir: PathBuf,
    /// Public root of the stored books.
    pub public_storage_url: Url,
    /// Public root of this API, used in emailed links.
    pub public_base_url: Url,
    /// Reader app; also the only CORS origin allowed when set.
    pub frontend_url: Option<Url>,
    /// Recipient of signup notifications.
    pub admin_email: String,
    /// Sender of every email.
    pub mail_from: String,
    /// Resend API key.
    pub resend_api_key: String,
    /// Resend API root.
    pub resend_base_url: Url,
    /// Root of the book site to search.
    pub search_base_url: Url,
}

impl ServerConfig {
    /// Checks the settings that cannot be enforced by their types.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resend_api_key.trim().is_empty() {
            return Err(ConfigError::Empty {
                name: "RESEND_API_KEY",
            });
        }
        if self.mail_from.trim().is_empty() {
            return Err(ConfigError::Empty { name: "MAIL_FROM" });
        }
        let admin = self.admin_email.trim();
        if admin.is_empty() {
            return Err(ConfigError::Empty {
                name: "ADMIN_EMAIL",
            });
        }
        match admin.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(ConfigError::InvalidEmail(admin.to_string())),
        }
    }

    /// Browser origin allowed by CORS, derived from the frontend URL.
    #[must_use]
    pub fn cors_origin(&self) -> Option<HeaderValue> {
        let origin = self.frontend_url.as_ref()?.origin().ascii_serialization();
        HeaderValue::from_str(&origin).ok()
    }

    #[must_use]
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            cors_origin: self.cors_origin(),
            files_dir: Some(self.storage_dir.clone()),
        }
    }

    /// Settings for the approval workflow. Login links fall back to this API's
    /// root when no frontend is configured.
    #[must_use]
    pub fn approval_settings(&self) -> ApprovalSettings {
        let frontend = self.frontend_url.as_ref().unwrap_or(&self.public_base_url);
        ApprovalSettings {
            admin_email: self.admin_email.trim().to_string(),
            mail_from: self.mail_from.clone(),
            public_base_url: trimmed(&self.public_base_url),
            frontend_url: trimmed(frontend),
        }
    }
}

/// Parses an absolute http(s) URL setting.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] naming the setting.
pub fn parse_http_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
    };
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    if matches!(url.scheme(), "http" | "https") && url.has_host() {
        Ok(url)
    } else {
        Err(invalid())
    }
}

fn trimmed(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            database_path: PathBuf::from("library.db"),
            storage_dir: PathBuf::from("epubs"),
            public_storage_url: parse_http_url("PUBLIC_STORAGE_URL", "http://localhost:3000/files").unwrap(),
            public_base_url: parse_http_url("PUBLIC_BASE_URL", "https://api.example.org/").unwrap(),
            frontend_url: Some(parse_http_url("FRONTEND_URL", "https://reader.example.io/epub").unwrap()),
            admin_email: "admin@example.org".to_string(),
            mail_from: "Library <noreply@example.org>".to_string(),
            resend_api_key: "re_key".to_string(),
            resend_base_url: parse_http_url("RESEND_BASE_URL", "https://api.resend.com/").unwrap(),
            search_base_url: parse_http_url("SEARCH_BASE_URL", "https://fr.annas-archive.org").unwrap(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert_eq!(config().validate(), Ok(()));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut cfg = config();
        cfg.resend_api_key = "  ".to_string();
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Empty {
                name: "RESEND_API_KEY"
            })
        );
    }

    #[test]
    fn test_admin_email_must_look_like_an_address() {
        let mut cfg = config();
        cfg.admin_email = "admin".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidEmail(_))));
    }

    #[test]
    fn test_cors_origin_drops_path() {
        assert_eq!(
            config().cors_origin().unwrap(),
            HeaderValue::from_static("https://reader.example.io")
        );

        let mut cfg = config();
        cfg.frontend_url = None;
        assert!(cfg.cors_origin().is_none());
    }

    #[test]
    fn test_approval_settings_trim_trailing_slashes() {
        let settings = config().approval_settings();
        assert_eq!(settings.public_base_url, "https://api.example.org");
        assert_eq!(settings.frontend_url, "https://reader.example.io/epub");
    }

    #[test]
    fn test_approval_settings_fall_back_to_api_root() {
        let mut cfg = config();
        cfg.frontend_url = None;
        assert_eq!(cfg.approval_settings().frontend_url, "https://api.example.org");
    }

    #[test]
    fn test_parse_http_url_rejects_other_schemes() {
        assert!(parse_http_url("X", "ftp://example.org").is_err());
        assert!(parse_http_url("X", "not a url").is_err());
        assert!(parse_http_url("X", "https://example.org").is_ok());
    }
}
