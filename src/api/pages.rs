//! HTML pages shown to the admin after following an approve or reject link.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::approval::ApprovalOutcome;
use crate::notify::templates::{escape_html, format_timestamp};

/// Which emailed link was followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionLink {
    Approve,
    Reject,
}

impl DecisionLink {
    fn noun(self) -> &'static str {
        match self {
            Self::Approve => "d'approbation",
            Self::Reject => "de rejet",
        }
    }

    fn failure_text(self) -> &'static str {
        match self {
            Self::Approve => "Impossible d'approuver l'utilisateur.",
            Self::Reject => "Impossible de rejeter l'utilisateur.",
        }
    }
}

fn page(status: StatusCode, title: &str, heading: &str, heading_color: Option<&str>, body: &str) -> Response {
    let style = heading_color.map_or_else(String::new, |c| format!(r#" style="color: {c};""#));
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body style="font-family: Arial; text-align: center; padding: 50px;">
<h1{style}>{heading}</h1>
{body}
</body>
</html>"#
    );
    (status, Html(html)).into_response()
}

/// 404 page for a token no user holds.
#[must_use]
pub fn invalid_link(link: DecisionLink) -> Response {
    page(
        StatusCode::NOT_FOUND,
        "Erreur",
        "Lien invalide",
        None,
        &format!("<p>Ce lien {} n'existe pas ou a déjà été utilisé.</p>", link.noun()),
    )
}

/// 500 page for a failure while recording the decision.
#[must_use]
pub fn failure(link: DecisionLink) -> Response {
    page(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Erreur",
        "Erreur",
        None,
        &format!("<p>{}</p>", link.failure_text()),
    )
}

/// 200 page describing the outcome of a decision link.
#[must_use]
pub fn outcome(link: DecisionLink, outcome: &ApprovalOutcome) -> Response {
    match outcome {
        ApprovalOutcome::Approved(user) => page(
            StatusCode::OK,
            "Utilisateur approuvé",
            "Utilisateur approuvé",
            Some("#27ae60"),
            &format!(
                "<p>L'utilisateur <strong>{}</strong> ({}) a été approuvé avec succès.</p>\n<p>Un email de confirmation lui a été envoyé.</p>",
                escape_html(&user.username),
                escape_html(&user.email)
            ),
        ),
        ApprovalOutcome::Rejected(user) => page(
            StatusCode::OK,
            "Utilisateur rejeté",
            "Utilisateur rejeté",
            Some("#e74c3c"),
            &format!(
                "<p>L'utilisateur <strong>{}</strong> ({}) a été rejeté.</p>\n<p>Un email de notification lui a été envoyé.</p>",
                escape_html(&user.username),
                escape_html(&user.email)
            ),
        ),
        ApprovalOutcome::AlreadyApproved { user, at } => page(
            StatusCode::OK,
            "Déjà approuvé",
            match link {
                DecisionLink::Approve => "Déjà approuvé",
                DecisionLink::Reject => "Impossible de rejeter",
            },
            None,
            &format!(
                "<p>L'utilisateur <strong>{}</strong> a déjà été approuvé le {}.</p>",
                escape_html(&user.username),
                escape_html(&format_timestamp(at))
            ),
        ),
        ApprovalOutcome::AlreadyRejected { user, at } => page(
            StatusCode::OK,
            "Déjà rejeté",
            "Déjà rejeté",
            None,
            &format!(
                "<p>L'utilisateur <strong>{}</strong> a déjà été rejeté le {}.</p>",
                escape_html(&user.username),
                escape_html(&format_timestamp(at))
            ),
        ),
    }
}
