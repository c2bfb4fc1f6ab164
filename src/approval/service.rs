//! Approval workflow orchestration.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{info, instrument, warn};

use super::{ApprovalError, ApprovalOutcome, ApprovalState, User, UserStore, generate_token};
use crate::notify::templates::{self, MailContent};
use crate::notify::{Mailer, OutgoingEmail};

/// Addresses and URLs the workflow needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalSettings {
    /// Recipient of signup notifications.
    pub admin_email: String,
    /// `From` header of every message.
    pub mail_from: String,
    /// Public root of this API; approve/reject links point here.
    pub public_base_url: String,
    /// Public root of the reader app; the login link points here.
    pub frontend_url: String,
}

impl ApprovalSettings {
    fn decision_url(&self, action: &str, token: &str) -> String {
        format!(
            "{}/api/{action}-user/{token}",
            self.public_base_url.trim_end_matches('/')
        )
    }

    fn login_url(&self) -> String {
        format!("{}/login.html", self.frontend_url.trim_end_matches('/'))
    }
}

/// Runs signup notification and the approve/reject decisions.
#[derive(Clone)]
pub struct ApprovalService {
    store: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    settings: ApprovalSettings,
}

impl std::fmt::Debug for ApprovalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approve,
    Reject,
}

impl ApprovalService {
    #[must_use]
    pub fn new(
        store: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        settings: ApprovalSettings,
    ) -> Self {
        Self {
            store,
            mailer,
            settings,
        }
    }

    /// Issues a fresh token for `user_id` and emails the admin the decision links.
    ///
    /// Returns the mail provider's message id.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::UnknownUser`] if no such user exists,
    /// [`ApprovalError::Store`] or [`ApprovalError::Mail`] on backend failures.
    #[instrument(skip(self, email), fields(user_id = %user_id, username = %username))]
    pub async fn notify_admin(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
    ) -> Result<String, ApprovalError> {
        let token = generate_token();
        if !self.store.set_approval_token(user_id, &token).await? {
            return Err(ApprovalError::UnknownUser {
                user_id: user_id.to_string(),
            });
        }

        let content = templates::admin_signup(
            username,
            email,
            Utc::now(),
            &self.settings.decision_url("approve", &token),
            &self.settings.decision_url("reject", &token),
        );
        let email_id = self
            .mailer
            .send(&self.compose(&self.settings.admin_email, content))
            .await?;

        info!(email_id = %email_id, "admin notified of signup");
        Ok(email_id)
    }

    /// Approves the user holding `token`, if still pending.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::InvalidToken`] if no user holds the token,
    /// [`ApprovalError::Store`] on database failures.
    #[instrument(skip(self, token))]
    pub async fn approve(&self, token: &str) -> Result<ApprovalOutcome, ApprovalError> {
        self.decide(token, Decision::Approve).await
    }

    /// Rejects the user holding `token`, if still pending.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::InvalidToken`] if no user holds the token,
    /// [`ApprovalError::Store`] on database failures.
    #[instrument(skip(self, token))]
    pub async fn reject(&self, token: &str) -> Result<ApprovalOutcome, ApprovalError> {
        self.decide(token, Decision::Reject).await
    }

    async fn decide(&self, token: &str, decision: Decision) -> Result<ApprovalOutcome, ApprovalError> {
        let user = self.lookup(token).await?;
        if let Some(settled) = settled_outcome(&user) {
            info!(user_id = %user.id, "decision already recorded");
            return Ok(settled);
        }

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let applied = match decision {
            Decision::Approve => self.store.mark_approved(&user.id, &now).await?,
            Decision::Reject => self.store.mark_rejected(&user.id, &now).await?,
        };
        if !applied {
            // A concurrent click settled the user between lookup and update.
            let current = self.lookup(token).await?;
            return settled_outcome(&current).ok_or(ApprovalError::InvalidToken);
        }

        let recipient = user.email.clone();
        let (outcome, content) = match decision {
            Decision::Approve => {
                let user = User {
                    approved: true,
                    approved_at: Some(now),
                    ..user
                };
                let content = templates::account_approved(&user.username, &self.settings.login_url());
                (ApprovalOutcome::Approved(user), content)
            }
            Decision::Reject => {
                let user = User {
                    rejected: true,
                    rejected_at: Some(now),
                    ..user
                };
                let content = templates::account_rejected(&user.username);
                (ApprovalOutcome::Rejected(user), content)
            }
        };

        info!(?decision, "decision recorded");
        if let Err(error) = self.mailer.send(&self.compose(&recipient, content)).await {
            warn!(error = %error, ?decision, "decision recorded but user email failed");
        }

        Ok(outcome)
    }

    async fn lookup(&self, token: &str) -> Result<User, ApprovalError> {
        self.store
            .find_by_token(token)
            .await?
            .ok_or(ApprovalError::InvalidToken)
    }

    fn compose(&self, to: &str, content: MailContent) -> OutgoingEmail {
        OutgoingEmail {
            from: self.settings.mail_from.clone(),
            to: vec![to.to_string()],
            subject: content.subject,
            html: content.html,
        }
    }
}

fn settled_outcome(user: &User) -> Option<ApprovalOutcome> {
    match user.state() {
        ApprovalState::Pending => None,
        ApprovalState::Approved { at } => Some(ApprovalOutcome::AlreadyApproved {
            user: user.clone(),
            at,
        }),
        ApprovalState::Rejected { at } => Some(ApprovalOutcome::AlreadyRejected {
            user: user.clone(),
            at,
        }),
    }
}
