//! Thank-you email notifier
//!
//! Sends a bilingual (Hindi and English) HTML confirmation to callers who gave
//! a usable address. Profiles without an `@` in the email are skipped, not
//! failed. SMTP is blocking in lettre, so delivery runs on the blocking pool.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use call_agent_config::EmailConfig;
use call_agent_core::{ProfileSink, Result, UserProfile};

use crate::PersistenceError;

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Thank-you email subject line
pub fn subject(organization: &str) -> String {
    format!("Thank You for Connecting with {}", organization)
}

/// Render the HTML body. The blood group line is omitted when it is empty.
pub fn render_body(profile: &UserProfile, organization: &str) -> String {
    let name = escape_html(&profile.name);
    let email = escape_html(&profile.email);
    let org = escape_html(organization);
    let (blood_hi, blood_en) = if profile.blood_group.is_empty() {
        (String::new(), String::new())
    } else {
        let blood = escape_html(&profile.blood_group);
        (
            format!("<li><strong>रक्त समूह:</strong> {}</li>", blood),
            format!("<li><strong>Blood Group:</strong> {}</li>", blood),
        )
    };

    format!(
        r#"<html>
<head>
<style>
body {{ font-family: Arial, sans-serif; line-height: 1.6; }}
.container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
.header {{ background-color: #4CAF50; color: white; padding: 10px; text-align: center; }}
.content {{ padding: 20px; background-color: #f9f9f9; }}
.footer {{ text-align: center; margin-top: 20px; font-size: 12px; color: #777; }}
</style>
</head>
<body>
<div class="container">
<div class="header"><h2>{org}</h2></div>
<div class="content">
<p>नमस्ते {name} जी,</p>
<p>{org} से जुड़ने के लिए आपका हार्दिक धन्यवाद!</p>
<p>हमने आपकी निम्नलिखित जानकारी सुरक्षित कर ली है:</p>
<ul>
<li><strong>नाम:</strong> {name}</li>
<li><strong>ईमेल:</strong> {email}</li>
{blood_hi}
</ul>
<p>हमारी टीम जल्द ही आपसे संपर्क करेगी। आपके सहयोग के लिए पुनः धन्यवाद।</p>
<hr>
<p>Dear {name},</p>
<p>Thank you for connecting with {org}!</p>
<p>We have securely stored the following information:</p>
<ul>
<li><strong>Name:</strong> {name}</li>
<li><strong>Email:</strong> {email}</li>
{blood_en}
</ul>
<p>Our team will contact you soon. Thank you once again for your cooperation.</p>
</div>
<div class="footer"><p>&copy; {org}. All rights reserved.</p></div>
</div>
</body>
</html>"#
    )
}

/// Sends thank-you emails over SMTP with STARTTLS
pub struct EmailNotifier {
    config: EmailConfig,
    organization: String,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig, organization: impl Into<String>) -> std::result::Result<Self, PersistenceError> {
        if config.username.is_empty() || config.password.is_empty() {
            return Err(PersistenceError::Configuration(
                "persistence.email requires username and password".to_string(),
            ));
        }
        Ok(Self {
            config,
            organization: organization.into(),
        })
    }

    fn sender(&self) -> &str {
        if self.config.from_address.is_empty() {
            &self.config.username
        } else {
            &self.config.from_address
        }
    }

    /// Build the message without sending it
    pub fn build_message(&self, profile: &UserProfile) -> std::result::Result<Message, PersistenceError> {
        let from: Mailbox = format!("{} <{}>", self.organization, self.sender()).parse()?;
        let to: Mailbox = profile.email.parse()?;

        Ok(Message::builder()
            .from(from)
            .to(to)
            .subject(subject(&self.organization))
            .header(ContentType::TEXT_HTML)
            .body(render_body(profile, &self.organization))?)
    }

    async fn send(&self, message: Message) -> std::result::Result<(), PersistenceError> {
        let host = self.config.smtp_host.clone();
        let port = self.config.smtp_port;
        let credentials = Credentials::new(self.config.username.clone(), self.config.password.clone());

        tokio::task::spawn_blocking(move || -> std::result::Result<(), PersistenceError> {
            let mailer = SmtpTransport::starttls_relay(&host)?
                .port(port)
                .credentials(credentials)
                .build();
            mailer.send(&message)?;
            Ok(())
        })
        .await
        .map_err(|e| PersistenceError::Email(format!("Email task failed: {}", e)))?
    }
}

#[async_trait]
impl ProfileSink for EmailNotifier {
    async fn record(&self, profile: &UserProfile) -> Result<()> {
        if !profile.has_deliverable_email() {
            tracing::info!(email = %profile.email, "No deliverable email, thank-you email skipped");
            return Ok(());
        }

        let message = self.build_message(profile)?;
        self.send(message).await?;
        tracing::info!(to = %profile.email, "Thank-you email sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }
}
