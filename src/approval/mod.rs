//! Admin approval of new reader accounts.
//!
//! On signup the admin receives an email with approve and reject links, each
//! carrying the same single token. The first decision is final: later clicks on
//! either link report the original decision and its timestamp without writing
//! anything or sending mail.

mod service;
mod store;
mod token;

pub use service::{ApprovalService, ApprovalSettings};
pub use store::{SqliteUserStore, UserStore};
pub use token::{TOKEN_BYTES, generate_token};

use thiserror::Error;

use crate::notify::MailError;

/// A reader account as stored.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    /// Account id issued by the sign-up flow.
    pub id: String,
    /// Display name shown in emails and pages.
    pub username: String,
    /// Address that receives the decision email.
    pub email: String,
    /// Token embedded in the admin's decision links.
    pub approval_token: Option<String>,
    /// Set once the admin approves.
    pub approved: bool,
    /// Approval time, RFC 3339 UTC.
    pub approved_at: Option<String>,
    /// Set once the admin rejects.
    pub rejected: bool,
    /// Rejection time, RFC 3339 UTC.
    pub rejected_at: Option<String>,
    /// Sign-up time, RFC 3339 UTC.
    pub created_at: String,
}

/// Where a user stands in the approval workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalState {
    /// No decision yet.
    Pending,
    /// Approved at `at`.
    Approved { at: String },
    /// Rejected at `at`.
    Rejected { at: String },
}

impl User {
    /// Derives the workflow state from the stored flags.
    #[must_use]
    pub fn state(&self) -> ApprovalState {
        if self.approved {
            ApprovalState::Approved {
                at: self.approved_at.clone().unwrap_or_default(),
            }
        } else if self.rejected {
            ApprovalState::Rejected {
                at: self.rejected_at.clone().unwrap_or_default(),
            }
        } else {
            ApprovalState::Pending
        }
    }
}

/// Result of following an approve or reject link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The user was pending and is now approved.
    Approved(User),
    /// The user was pending and is now rejected.
    Rejected(User),
    /// The user had already been approved at `at`; nothing changed.
    AlreadyApproved { user: User, at: String },
    /// The user had already been rejected at `at`; nothing changed.
    AlreadyRejected { user: User, at: String },
}

/// Errors raised by the approval workflow.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// No user holds the token.
    #[error("approval link is invalid")]
    InvalidToken,

    /// The user to notify about does not exist.
    #[error("Failed to save approval token: no user with id {user_id}")]
    UnknownUser { user_id: String },

    /// The user store failed.
    #[error("user store error: {0}")]
    Store(#[from] sqlx::Error),

    /// The admin notification could not be sent.
    #[error("Failed to send admin email: {0}")]
    Mail(#[from] MailError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(approved: bool, rejected: bool) -> User {
        User {
            id: "u1".to_string(),
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            approval_token: Some("tok".to_string()),
            approved,
            approved_at: approved.then(|| "2026-01-01T00:00:00.000Z".to_string()),
            rejected,
            rejected_at: rejected.then(|| "2026-01-02T00:00:00.000Z".to_string()),
            created_at: "2025-12-31T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_state_is_derived_from_flags() {
        assert_eq!(user(false, false).state(), ApprovalState::Pending);
        assert_eq!(
            user(true, false).state(),
            ApprovalState::Approved {
                at: "2026-01-01T00:00:00.000Z".to_string()
            }
        );
        assert_eq!(
            user(false, true).state(),
            ApprovalState::Rejected {
                at: "2026-01-02T00:00:00.000Z".to_string()
            }
        );
    }
}
