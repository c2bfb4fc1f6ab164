//! CLI argument definitions using clap derive macros.
//!
//! Every setting can also come from the environment, which is how the server
//! is configured in deployment.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use shelfkeeper_core::config::{ConfigError, ServerConfig, parse_http_url};
use shelfkeeper_core::notify::{DEFAULT_MAIL_FROM, DEFAULT_RESEND_BASE_URL};
use shelfkeeper_core::scrape::DEFAULT_SITE_URL;

/// EPUB library backend.
///
/// Searches the book site, shelves EPUBs into local storage, and runs the
/// admin approval workflow for new readers.
#[derive(Parser, Debug)]
#[command(name = "shelfkeeper")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Address to bind
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "shelfkeeper.db")]
    pub database_path: PathBuf,

    /// Directory holding stored books
    #[arg(long, env = "STORAGE_DIR", default_value = "epubs")]
    pub storage_dir: PathBuf,

    /// Public root of stored books [default: <public-base-url>/files]
    #[arg(long, env = "PUBLIC_STORAGE_URL")]
    pub public_storage_url: Option<String>,

    /// Public root of this API, used in emailed links [default: http://localhost:<port>]
    #[arg(long, env = "PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,

    /// Reader app URL (CORS origin and login link)
    #[arg(long, env = "FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// Recipient of signup notifications
    #[arg(long, env = "ADMIN_EMAIL")]
    pub admin_email: String,

    /// Resend API key
    #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
    pub resend_api_key: String,

    /// Resend API root
    #[arg(long, env = "RESEND_BASE_URL", default_value = DEFAULT_RESEND_BASE_URL)]
    pub resend_base_url: String,

    /// Sender of every email
    #[arg(long, env = "MAIL_FROM", default_value = DEFAULT_MAIL_FROM)]
    pub mail_from: String,

    /// Root of the book site to search
    #[arg(long, env = "SEARCH_BASE_URL", default_value = DEFAULT_SITE_URL)]
    pub search_base_url: String,
}

impl Args {
    /// Resolves defaults and validates into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let public_base_url = match &self.public_base_url {
            Some(value) => parse_http_url("PUBLIC_BASE_URL", value)?,
            None => parse_http_url("PUBLIC_BASE_URL", &format!("http://localhost:{}", self.port))?,
        };
        let public_storage_url = match &self.public_storage_url {
            Some(value) => parse_http_url("PUBLIC_STORAGE_URL", value)?,
            None => parse_http_url(
                "PUBLIC_STORAGE_URL",
                &format!("{}/files", public_base_url.as_str().trim_end_matches('/')),
            )?,
        };
        let frontend_url = self
            .frontend_url
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_http_url("FRONTEND_URL", v))
            .transpose()?;

        let config = ServerConfig {
            bind_addr: SocketAddr::new(self.host, self.port),
            database_path: self.database_path,
            storage_dir: self.storage_dir,
            public_storage_url,
            public_base_url,
            frontend_url,
            admin_email: self.admin_email,
            mail_from: self.mail_from,
            resend_api_key: self.resend_api_key,
            resend_base_url: parse_http_url("RESEND_BASE_URL", &self.resend_base_url)?,
            search_base_url: parse_http_url("SEARCH_BASE_URL", &self.search_base_url)?,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 5] = [
        "shelfkeeper",
        "--admin-email",
        "admin@example.org",
        "--resend-api-key",
        "re_test",
    ];

    fn parse(extra: &[&str]) -> Args {
        let argv: Vec<&str> = REQUIRED.iter().chain(extra.iter()).copied().collect();
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = parse(&[]);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.port, 3000);
        assert_eq!(args.storage_dir, PathBuf::from("epubs"));
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        assert_eq!(parse(&["-v"]).verbose, 1);
        assert_eq!(parse(&["-vv"]).verbose, 2);
        assert_eq!(parse(&["--verbose", "--verbose"]).verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        assert!(parse(&["-q"]).quiet);
        assert!(parse(&["--quiet"]).quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["shelfkeeper", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["shelfkeeper", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["shelfkeeper", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_port_out_of_range_rejected() {
        let argv: Vec<&str> = REQUIRED.iter().copied().chain(["--port", "70000"]).collect();
        let err = Args::try_parse_from(argv).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_into_config_derives_public_urls_from_port() {
        let config = parse(&["--port", "8080"]).into_config().unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.public_base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.public_storage_url.as_str(), "http://localhost:8080/files");
        assert_eq!(config.search_base_url.as_str(), "https://fr.annas-archive.org/");
    }

    #[test]
    fn test_into_config_rejects_bad_frontend_url() {
        let err = parse(&["--frontend-url", "reader.example.io"])
            .into_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { name: "FRONTEND_URL", .. }));
    }

    #[test]
    fn test_into_config_rejects_bad_admin_email() {
        let argv = [
            "shelfkeeper",
            "--admin-email",
            "nobody",
            "--resend-api-key",
            "re_test",
        ];
        let err = Args::try_parse_from(argv).unwrap().into_config().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEmail(_)));
    }
}
