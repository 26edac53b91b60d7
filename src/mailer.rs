use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

const SMTP_RELAY: &str = "smtp.gmail.com";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mailbox address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP send failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// -----------------------------
/// Staff Email (Gmail SMTP relay)
/// -----------------------------
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl Mailer {
    /// STARTTLS relay with an app-password login; all notifications go to the
    /// single configured staff recipient.
    pub fn gmail(address: &str, app_password: &str, recipient: &str) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(SMTP_RELAY)?
            .credentials(Credentials::new(
                address.to_string(),
                app_password.to_string(),
            ))
            .build();

        Ok(Self {
            transport,
            from: address.parse()?,
            to: recipient.parse()?,
        })
    }

    pub async fn send(&self, subject: &str, body: &str) -> Result<(), MailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.transport.send(email).await?;
        info!("Email sent: {}", subject);
        Ok(())
    }
}
