use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::Serialize;

use crate::{config::MailConfig, templates::Email};

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts each message as JSON to a transactional mail API using basic auth.
pub struct HttpMailTransport {
    client: Client,
    api_url: String,
    username: String,
    password: String,
    sender: String,
}

impl HttpMailTransport {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .wrap_err("Failed to build mail http client")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            sender: config.sender(),
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, email: &Email) -> Result<()> {
        let request = SendRequest {
            from: &self.sender,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(&self.api_url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&request)
            .send()
            .await
            .wrap_err("Mail API request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("Mail API error {}: {}", status, body));
        }

        tracing::debug!("Sent mail to {}: {}", email.to, email.subject);
        Ok(())
    }
}
