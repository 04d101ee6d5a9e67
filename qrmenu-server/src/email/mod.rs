//! Marketing mail: relay abstraction, SES implementation and bulk send

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use shared::models::{EmailResult, EmailTemplate};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("mail relay rejected the message: {0}")]
    Relay(String),
}

/// Outbound HTML mail
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

/// Mail relay backed by Amazon SES
pub struct SesMailer {
    ses: SesClient,
    from: String,
}

impl SesMailer {
    pub async fn from_config(config: &Config) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = match &config.ses_region {
            Some(region) => {
                let ses_config = aws_config
                    .to_builder()
                    .region(aws_config::Region::new(region.clone()))
                    .build();
                SesClient::new(&ses_config)
            }
            None => SesClient::new(&aws_config),
        };
        Self {
            ses,
            from: config.mail_from.clone(),
        }
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let subject = Content::builder()
            .data(subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::Build(e.to_string()))?;
        let html = Content::builder()
            .data(html)
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::Build(e.to_string()))?;

        let body = Body::builder().html(html).build();
        let message = Message::builder().subject(subject).body(body).build();

        self.ses
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| MailError::Relay(e.to_string()))?;

        tracing::info!(to = to, "Marketing email sent");
        Ok(())
    }
}

/// Built-in marketing template shown in the CRM composer
pub fn marketing_template() -> EmailTemplate {
    EmailTemplate {
        subject: "QR Menü ile siparişlerinizi hızlandırın".to_string(),
        html: r#"<!DOCTYPE html>
<html lang="tr">
<body style="font-family: Arial, sans-serif; background: #f6f6f6; padding: 24px;">
  <table width="100%" style="max-width: 600px; margin: 0 auto; background: #ffffff; border-radius: 8px;">
    <tr><td style="padding: 32px;">
      <h1 style="color: #c0392b;">QR Menü</h1>
      <p>Masadaki QR kodu okutan misafirleriniz menüye anında ulaşsın, siparişini garson beklemeden versin.</p>
      <ul>
        <li>Mutfak, garson ve kasa ekranları tek panelde</li>
        <li>Yemeksepeti, Trendyol Go ve Getir siparişleri aynı listede</li>
        <li>Günlük, haftalık ve aylık ciro raporları</li>
      </ul>
      <p>Ücretsiz deneme için bu e-postayı yanıtlamanız yeterli.</p>
    </td></tr>
  </table>
</body>
</html>"#
            .to_string(),
    }
}

fn looks_like_email(addr: &str) -> bool {
    shared::models::user::validate_email(addr).is_ok()
}

/// Send one message per recipient, sequentially, without retries.
///
/// A failed recipient is recorded and the batch continues.
pub async fn send_bulk(
    mailer: &dyn Mailer,
    recipients: &[String],
    subject: &str,
    html: &str,
) -> Vec<EmailResult> {
    let mut results = Vec::with_capacity(recipients.len());

    for raw in recipients {
        let email = raw.trim().to_string();
        let outcome = if looks_like_email(&email) {
            mailer.send_html(&email, subject, html).await
        } else {
            Err(MailError::InvalidRecipient(email.clone()))
        };

        match outcome {
            Ok(()) => results.push(EmailResult {
                email,
                success: true,
                error: None,
            }),
            Err(e) => {
                tracing::warn!(to = %email, error = %e, "Marketing email failed");
                results.push(EmailResult {
                    email,
                    success: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    results
}
