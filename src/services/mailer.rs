//! Outbound mail
//!
//! The share-by-email feature sends through a `Mailer` so the handlers
//! never touch the SMTP transport directly and tests can record sends
//! instead. Delivery failures are not handled here; they propagate to
//! the caller.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;
use crate::forms::ShareForm;
use crate::models::Post;

/// Mail-delivery interface
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a plain-text email from the fixed sender to one recipient.
    async fn send(&self, subject: &str, body: &str, to: &str) -> Result<()>;
}

/// SMTP mailer over lettre
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, subject: &str, body: &str, to: &str) -> Result<()> {
        if self.config.host.is_empty() {
            return Err(anyhow!("SMTP host not configured"));
        }

        let email = Message::builder()
            .from(
                self.config
                    .from
                    .parse()
                    .map_err(|e| anyhow!("Invalid from address: {}", e))?,
            )
            .to(to.parse().map_err(|e| anyhow!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
            .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
            .port(self.config.port);

        if !self.config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ));
        }

        let mailer = builder.build();
        mailer
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        Ok(())
    }
}

/// Compose the share notification for a post.
///
/// `post_url` is the absolute URL of the post on this site.
pub fn share_email(form: &ShareForm, post: &Post, post_url: &str) -> (String, String) {
    let subject = format!(
        "{} ({}) recommends to read about {}",
        form.name, form.email, post.title
    );
    let body = format!(
        "Hi! There is a new post called \"{}\" \nCheck this out! {}",
        post.title, post_url
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostStatus;
    use chrono::{TimeZone, Utc};

    fn post() -> Post {
        Post {
            id: 7,
            title: "Why borrow checkers matter".to_string(),
            slug: "borrow-checkers".to_string(),
            body: String::new(),
            author: "ann".to_string(),
            publish: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            status: PostStatus::Published,
        }
    }

    #[test]
    fn test_share_email_format() {
        let form = ShareForm {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            to: "bob@example.com".to_string(),
            comments: None,
        };
        let (subject, body) =
            share_email(&form, &post(), "http://localhost:8080/2024/6/1/borrow-checkers");

        assert_eq!(
            subject,
            "Ann (ann@example.com) recommends to read about Why borrow checkers matter"
        );
        assert!(body.contains("\"Why borrow checkers matter\""));
        assert!(body.contains("http://localhost:8080/2024/6/1/borrow-checkers"));
    }

    #[tokio::test]
    async fn test_unconfigured_smtp_is_an_error() {
        let mailer = SmtpMailer::new(SmtpConfig::default());
        let result = mailer.send("subject", "body", "bob@example.com").await;
        assert!(result.is_err());
    }
}
