//! Completion email delivery client.
//!
//! Sends the finished-videos email through a hosted inbox API. Delivery is
//! reported as a plain boolean: the pipeline only needs to know whether the
//! message went out.

use std::time::Duration;

use serde_json::json;
use tracing::{error, info};

use crate::error::{ClientError, ClientResult};

/// Mailer client configuration.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// API base URL
    pub base_url: String,
    /// API key
    pub api_key: String,
    /// Sender inbox address
    pub from_inbox: String,
    /// Request timeout
    pub timeout: Duration,
}

impl MailerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        let api_key = std::env::var("MAILER_API_KEY")
            .map_err(|_| ClientError::config_error("MAILER_API_KEY not set"))?;

        Ok(Self {
            base_url: std::env::var("MAILER_API_URL")
                .unwrap_or_else(|_| "https://api.agentmail.to/v0".to_string()),
            api_key,
            from_inbox: std::env::var("MAILER_FROM_INBOX")
                .unwrap_or_else(|_| "demo-hunters@agentmail.to".to_string()),
            timeout: Duration::from_secs(30),
        })
    }
}

/// Client for the email delivery service.
#[derive(Clone)]
pub struct MailerClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    from_inbox: String,
}

impl MailerClient {
    /// Create a new mailer client.
    pub fn new(config: MailerConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            from_inbox: config.from_inbox,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(MailerConfig::from_env()?)
    }

    /// Send one HTML email. Returns true on accepted delivery; any failure
    /// (transport or API) is logged and reported as false.
    pub async fn send(&self, to_email: &str, subject: &str, html_body: &str) -> bool {
        let url = format!(
            "{}/inboxes/{}/messages/send",
            self.base_url, self.from_inbox
        );
        let body = json!({
            "to": [to_email],
            "subject": subject,
            "html": html_body,
        });

        let result = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(to_email, subject, "Email sent");
                true
            }
            Ok(response) => {
                error!(
                    to_email,
                    status = response.status().as_u16(),
                    "Email delivery rejected"
                );
                false
            }
            Err(e) => {
                error!(to_email, "Email delivery error: {}", e);
                false
            }
        }
    }

    /// Send the completion email with the long video and the short clips.
    pub async fn send_demo_videos(
        &self,
        to_email: &str,
        product_name: &str,
        description: &str,
        long_video_url: &str,
        short_video_urls: &[String],
    ) -> bool {
        let subject = format!("Your Demo Videos for {} Are Ready", product_name);
        let body = demo_videos_html(product_name, description, long_video_url, short_video_urls);
        self.send(to_email, &subject, &body).await
    }
}

/// Build the HTML body for the completion email.
fn demo_videos_html(
    product_name: &str,
    description: &str,
    long_video_url: &str,
    short_video_urls: &[String],
) -> String {
    let shorts_section = if short_video_urls.is_empty() {
        "<p>No short clips were generated this time.</p>".to_string()
    } else {
        let items: String = short_video_urls
            .iter()
            .enumerate()
            .map(|(i, url)| {
                format!(
                    "<li><a href=\"{url}\" style=\"color: #007bff;\">Short clip {}</a></li>",
                    i + 1
                )
            })
            .collect();
        format!("<ol style=\"line-height: 1.8;\">{items}</ol>")
    };

    let description_block = if description.is_empty() {
        String::new()
    } else {
        format!("<p><strong>Description:</strong><br>{description}</p>")
    };

    format!(
        r#"<html>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2 style="color: #333;">🎬 Your Demo Videos Are Ready!</h2>
    <p>Hi there,</p>
    <p>We finished generating demo videos for <strong>{product_name}</strong>.</p>
    {description_block}
    <h3 style="color: #555;">Full Demo</h3>
    <p><a href="{long_video_url}" style="color: #007bff;">{long_video_url}</a></p>
    <h3 style="color: #555;">Short Clips</h3>
    {shorts_section}
    <p style="margin-top: 20px;">
        Best regards,<br>
        <strong>Demo Hunters Team</strong>
    </p>
</body>
</html>"#
    )
}
