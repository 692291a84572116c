//! Notifications
//!
//! The executor hands at most one notification per check cycle to a
//! [`Notifier`]. Delivery is best effort: failures come back as a
//! `NotifyError` for logging and never abort a check.

use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::config::NotificationSettings;
use crate::error::{MonitorError, Result};

/// Default mail API base
pub const DEFAULT_MAIL_API_URL: &str = "https://api.sendgrid.com";

/// Notification errors
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Notification rejected {status}: {message}")]
    Rejected { status: u16, message: String },
}

pub type NotifyFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<(), NotifyError>> + Send + 'a>>;

/// Sends a message about a target
pub trait Notifier: Send + Sync {
    /// Notifier identifier
    fn id(&self) -> &str;

    /// Send `body` under `subject`
    fn notify<'a>(&'a self, subject: &'a str, body: &'a str) -> NotifyFuture<'a>;
}

/// Email delivery through the SendGrid v3 mail API
pub struct EmailNotifier {
    client: reqwest::Client,
    settings: NotificationSettings,
    endpoint: String,
}

impl EmailNotifier {
    pub fn new(settings: NotificationSettings, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::HttpClient(e.to_string()))?;

        let base = if settings.smtp_url.starts_with("http://") || settings.smtp_url.starts_with("https://") {
            settings.smtp_url.trim_end_matches('/').to_string()
        } else {
            DEFAULT_MAIL_API_URL.to_string()
        };

        Ok(Self {
            client,
            endpoint: format!("{}/v3/mail/send", base),
            settings,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.is_enabled()
    }

    async fn send(&self, subject: &str, body: &str) -> std::result::Result<(), NotifyError> {
        if !self.is_enabled() {
            tracing::debug!("No notification recipient configured, skipping");
            return Ok(());
        }

        tracing::debug!("Sending Notification to {}", self.settings.sms_email);
        let message = MailMessage::new(
            &self.settings.smtp_sender_id,
            &self.settings.sms_email,
            subject,
            body,
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.settings.smtp_sender_apikey)
            .json(&message)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl Notifier for EmailNotifier {
    fn id(&self) -> &str {
        "email"
    }

    fn notify<'a>(&'a self, subject: &'a str, body: &'a str) -> NotifyFuture<'a> {
        Box::pin(self.send(subject, body))
    }
}

#[derive(Debug, Serialize)]
struct MailMessage<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

impl<'a> MailMessage<'a> {
    /// Message with identical plain text and html bodies
    fn new(from: &'a str, to: &'a str, subject: &'a str, body: &'a str) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![Address { email: to }],
            }],
            from: Address { email: from },
            subject,
            content: vec![
                Content {
                    content_type: "text/plain",
                    value: body,
                },
                Content {
                    content_type: "text/html",
                    value: body,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer, recipient: &str) -> NotificationSettings {
        NotificationSettings {
            smtp_url: server.uri(),
            smtp_port: 443,
            smtp_sender_id: "monitor@example.com".to_string(),
            smtp_sender_apikey: "sg-key".to_string(),
            sms_email: recipient.to_string(),
        }
    }

    #[test]
    fn test_default_endpoint() {
        let notifier = EmailNotifier::new(
            NotificationSettings {
                smtp_url: "smtp.gmail.com".to_string(),
                ..Default::default()
            },
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(notifier.endpoint(), "https://api.sendgrid.com/v3/mail/send");
        assert!(!notifier.is_enabled());
    }

    #[tokio::test]
    async fn test_no_recipient_is_noop() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .expect(0)
            .mount(&server)
            .await;

        let notifier = EmailNotifier::new(settings(&server, ""), Duration::from_secs(5)).unwrap();
        assert!(notifier.notify("Website", "down").await.is_ok());
    }

    #[tokio::test]
    async fn test_sends_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(header("Authorization", "Bearer sg-key"))
            .and(body_json(serde_json::json!({
                "personalizations": [{"to": [{"email": "me@example.com"}]}],
                "from": {"email": "monitor@example.com"},
                "subject": "Website",
                "content": [
                    {"type": "text/plain", "value": "Major Service Outage"},
                    {"type": "text/html", "value": "Major Service Outage"}
                ]
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let notifier =
            EmailNotifier::new(settings(&server, "me@example.com"), Duration::from_secs(5)).unwrap();
        notifier
            .notify("Website", "Major Service Outage")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let notifier =
            EmailNotifier::new(settings(&server, "me@example.com"), Duration::from_secs(5)).unwrap();
        let err = notifier.notify("Website", "down").await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { status: 401, .. }));
    }
}
