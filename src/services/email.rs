//! Outgoing email: password reset links and welcome messages.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use super::retry::{retry_with_backoff, RetryPolicy, RetryStrategy, Retryable};

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email API unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Email API returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl Retryable for EmailError {
    fn retry_strategy(&self) -> RetryStrategy {
        match self {
            EmailError::Transport(_) => RetryStrategy::Retry,
            // 429 and 5xx are worth another attempt, other client errors are not
            EmailError::Rejected { status, .. } if *status == 429 || *status >= 500 => {
                RetryStrategy::Retry
            }
            EmailError::Rejected { .. } => RetryStrategy::Fail,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Escapes text for use in HTML content and quoted attribute values
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl EmailMessage {
    pub fn password_reset(to: &str, full_name: &str, reset_link: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Wachtwoord opnieuw instellen".to_string(),
            html: format!(
                "<p>Hallo {name},</p>\
                 <p>Er is gevraagd om je wachtwoord opnieuw in te stellen. \
                 Klik op de link hieronder; hij is één uur geldig.</p>\
                 <p><a href=\"{link}\">{link}</a></p>\
                 <p>Heb je dit niet aangevraagd? Dan mag je deze mail negeren.</p>",
                name = escape_html(full_name),
                link = escape_html(reset_link)
            ),
        }
    }

    pub fn welcome(to: &str, full_name: &str, role: &str, login_url: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Welkom bij de minivoetbalcompetitie".to_string(),
            html: format!(
                "<p>Hallo {name},</p>\
                 <p>Er is een account voor je aangemaakt met de rol <strong>{role}</strong>.</p>\
                 <p>Je kan inloggen via <a href=\"{url}\">{url}</a>.</p>",
                name = escape_html(full_name),
                role = escape_html(role),
                url = escape_html(login_url)
            ),
        }
    }
}

/// Delivers a single message
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Sends a message on a background task and logs the outcome
///
/// The caller's response time then does not depend on the mail API,
/// including its retries.
///
/// # Arguments
/// * `sender` - Delivery backend, shared with the application state
/// * `message` - Message to deliver
///
/// # Returns
/// Handle of the spawned task; callers normally drop it
pub fn send_in_background(
    sender: Arc<dyn EmailSender>,
    message: EmailMessage,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = sender.send(&message).await {
            tracing::error!(to = %message.to, subject = %message.subject, "Failed to send email: {}", e);
        }
    })
}

/// Posts messages as JSON to a transactional email API
pub struct HttpEmailSender {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
    policy: RetryPolicy,
}

#[derive(Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Upper bound on a single call to the email API
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl HttpEmailSender {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            from: from.into(),
            policy: RetryPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn post_once(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let body = OutgoingEmail {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let resp = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(EmailError::Rejected { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        retry_with_backoff(self.policy, move || self.post_once(message)).await?;
        tracing::info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them
///
/// Used when no email API key is configured.
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.html,
            "Email delivery disabled, logging message"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_mail_contains_link() {
        let msg = EmailMessage::password_reset(
            "jan@club.be",
            "Jan",
            "https://portal.test/reset-password?token=abc",
        );
        assert_eq!(msg.to, "jan@club.be");
        assert!(msg.html.contains("https://portal.test/reset-password?token=abc"));
        assert!(msg.html.contains("Hallo Jan"));
    }

    #[test]
    fn welcome_mail_names_role_and_login() {
        let msg = EmailMessage::welcome("ref@club.be", "An", "referee", "https://portal.test/login");
        assert!(msg.html.contains("referee"));
        assert!(msg.html.contains("https://portal.test/login"));
    }

    #[test]
    fn user_supplied_text_is_escaped() {
        let msg = EmailMessage::welcome(
            "x@club.be",
            "<script>alert(1)</script> & \"Co\"",
            "referee",
            "https://portal.test/login?a=1&b=2",
        );
        assert!(!msg.html.contains("<script>"));
        assert!(msg.html.contains("Hallo &lt;script&gt;alert(1)&lt;/script&gt; &amp; &quot;Co&quot;"));
        assert!(msg.html.contains("href=\"https://portal.test/login?a=1&amp;b=2\""));

        let reset = EmailMessage::password_reset("x@club.be", "O'Brien", "https://portal.test/r?token=ab");
        assert!(reset.html.contains("Hallo O&#39;Brien"));
    }

    #[test]
    fn only_transient_rejections_are_retried() {
        let server = EmailError::Rejected { status: 503, body: String::new() };
        let throttled = EmailError::Rejected { status: 429, body: String::new() };
        let invalid = EmailError::Rejected { status: 422, body: String::new() };

        assert!(matches!(server.retry_strategy(), RetryStrategy::Retry));
        assert!(matches!(throttled.retry_strategy(), RetryStrategy::Retry));
        assert!(matches!(invalid.retry_strategy(), RetryStrategy::Fail));
    }

    #[tokio::test]
    async fn log_sender_never_fails() {
        let msg = EmailMessage::welcome("a@b.be", "A", "admin", "http://x/login");
        assert!(LogEmailSender.send(&msg).await.is_ok());
    }
}
