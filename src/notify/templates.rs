//! Email subjects and bodies for the approval workflow.
//!
//! Every interpolated value is HTML-escaped.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Rendered subject and HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailContent {
    pub subject: String,
    pub html: String,
}

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders a stored timestamp as `dd/mm/yyyy hh:mm:ss UTC`; unparseable input is returned as-is.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc()));
    match parsed {
        Ok(dt) => dt.format("%d/%m/%Y %H:%M:%S UTC").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Message asking the admin to approve or reject a new account.
#[must_use]
pub fn admin_signup(
    username: &str,
    email: &str,
    requested_at: DateTime<Utc>,
    approve_url: &str,
    reject_url: &str,
) -> MailContent {
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
<h2 style="color: #2d3436;">Nouvelle inscription sur EpubReader</h2>
<div style="background: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0;">
<p style="margin: 10px 0;"><strong>Nom d'utilisateur :</strong> {username}</p>
<p style="margin: 10px 0;"><strong>Email :</strong> {email}</p>
<p style="margin: 10px 0;"><strong>Date d'inscription :</strong> {requested_at}</p>
</div>
<div style="margin: 30px 0; text-align: center;">
<a href="{approve_url}" style="display: inline-block; padding: 14px 30px; background: #27ae60; color: white; text-decoration: none; border-radius: 8px; font-weight: 600; margin-right: 10px;">Approuver</a>
<a href="{reject_url}" style="display: inline-block; padding: 14px 30px; background: #e74c3c; color: white; text-decoration: none; border-radius: 8px; font-weight: 600;">Rejeter</a>
</div>
<p style="color: #636e72; font-size: 12px; margin-top: 30px;">Ces liens n'expirent pas. Vous pouvez approuver ou rejeter cette inscription à tout moment.</p>
</div>"#,
        username = escape_html(username),
        email = escape_html(email),
        requested_at = requested_at.format("%d/%m/%Y %H:%M:%S UTC"),
        approve_url = escape_html(approve_url),
        reject_url = escape_html(reject_url),
    );
    MailContent {
        subject: "Nouvelle inscription sur EpubReader".to_string(),
        html,
    }
}

/// Confirmation sent to a user whose account was approved.
#[must_use]
pub fn account_approved(username: &str, login_url: &str) -> MailContent {
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
<h2 style="color: #27ae60;">Compte approuvé !</h2>
<p>Bonjour <strong>{username}</strong>,</p>
<p>Votre compte EpubReader a été approuvé par l'administrateur. Vous pouvez maintenant vous connecter et profiter de votre bibliothèque !</p>
<div style="margin: 30px 0; text-align: center;">
<a href="{login_url}" style="display: inline-block; padding: 14px 30px; background: #667eea; color: white; text-decoration: none; border-radius: 8px; font-weight: 600;">Se connecter</a>
</div>
<p>À bientôt sur EpubReader !</p>
</div>"#,
        username = escape_html(username),
        login_url = escape_html(login_url),
    );
    MailContent {
        subject: "Votre compte EpubReader a été approuvé !".to_string(),
        html,
    }
}

/// Notice sent to a user whose account was rejected.
#[must_use]
pub fn account_rejected(username: &str) -> MailContent {
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
<h2 style="color: #e74c3c;">Inscription non approuvée</h2>
<p>Bonjour <strong>{username}</strong>,</p>
<p>Votre demande d'inscription sur EpubReader n'a pas été approuvée par l'administrateur.</p>
<p>Si vous pensez qu'il s'agit d'une erreur, vous pouvez nous contacter.</p>
<p>Cordialement,<br>L'équipe EpubReader</p>
</div>"#,
        username = escape_html(username),
    );
    MailContent {
        subject: "Votre demande d'inscription EpubReader".to_string(),
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn test_format_timestamp_accepts_stored_formats() {
        assert_eq!(format_timestamp("2026-03-01T09:05:00.000Z"), "01/03/2026 09:05:00 UTC");
        assert_eq!(format_timestamp("2026-03-01 09:05:00"), "01/03/2026 09:05:00 UTC");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_admin_signup_contains_both_links_and_escaped_user() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single().unwrap_or_default();
        let mail = admin_signup(
            "<ana>",
            "ana@example.com",
            at,
            "https://api.example/api/approve-user/abc",
            "https://api.example/api/reject-user/abc",
        );

        assert!(mail.html.contains("https://api.example/api/approve-user/abc"));
        assert!(mail.html.contains("https://api.example/api/reject-user/abc"));
        assert!(mail.html.contains("&lt;ana&gt;"));
        assert!(!mail.html.contains("<ana>"));
        assert!(mail.html.contains("02/01/2026 03:04:05 UTC"));
    }

    #[test]
    fn test_account_approved_links_to_login() {
        let mail = account_approved("ana", "https://app.example/login.html");
        assert!(mail.html.contains(r#"href="https://app.example/login.html""#));
        assert!(mail.subject.contains("approuvé"));
    }

    #[test]
    fn test_account_rejected_greets_user() {
        let mail = account_rejected("ana");
        assert!(mail.html.contains("<strong>ana</strong>"));
    }
}
