//! Outbound transactional email.
//!
//! - [`Mailer`] - Send seam; [`ResendMailer`] talks to the Resend HTTP API
//! - [`templates`] - Subject and HTML bodies for the approval workflow

mod resend;
pub mod templates;

pub use resend::{DEFAULT_RESEND_BASE_URL, ResendMailer};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Sender used when none is configured.
pub const DEFAULT_MAIL_FROM: &str = "EpubReader <onboarding@resend.dev>";

/// A fully rendered message ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Transactional mail provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends `email` and returns the provider's message id.
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError>;
}

/// Errors raised while sending email.
#[derive(Debug, Error)]
pub enum MailError {
    /// The HTTP client could not be built.
    #[error("failed to build mail client: {0}")]
    Client(#[source] reqwest::Error),

    /// The provider could not be reached.
    #[error("mail provider unreachable: {0}")]
    Network(#[source] reqwest::Error),

    /// The provider refused the message.
    #[error("mail provider rejected message (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The provider answered with something other than a message id.
    #[error("unexpected mail provider response: {0}")]
    InvalidResponse(String),
}
