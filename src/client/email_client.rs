use std::time::Duration;

use anyhow::Context;

use reqwest::Client;

use serde::{Deserialize, Serialize};

use secrecy::Secret;

use url::Url;

use crate::domain::{EmailAddress, Recipients};
use crate::error::{Error, Result};

const POSTMARK_TOKEN_HEADER: &str = "X-Postmark-Server-Token";
/// Postmark rejects messages with more than 50 addresses in a single field
const MAX_RECIPIENTS_PER_MESSAGE: usize = 50;

/// Anything that can deliver an email to a set of recipients
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, recipients: &Recipients, email: &Email) -> Result<DeliveryReceipt>;
}

/// REST client for a Postmark-compatible email API
#[derive(Debug)]
pub struct EmailClient {
    client: Client,
    sender: EmailAddress,

    api_send_email_url: Url,
    api_auth_token: Secret<String>,
}

impl EmailClient {
    pub fn new(
        sender: EmailAddress,
        api_timeout: Duration,
        api_base_url: Url,
        api_auth_token: Secret<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(api_timeout)
            .build()
            .context("Failed to build http client")?;

        let api_send_email_url = api_base_url
            .join("email")
            .context("Failed to create send email endpoint URL")?;

        Ok(Self {
            client,
            sender,
            api_send_email_url,
            api_auth_token,
        })
    }

    async fn post(&self, body: &SendEmailRequest<'_>) -> Result<SendEmailResponse> {
        use secrecy::ExposeSecret;

        self.client
            .post(self.api_send_email_url.clone())
            .header(POSTMARK_TOKEN_HEADER, self.api_auth_token.expose_secret())
            .json(body)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(Error::SendEmailError)?
            .json()
            .await
            .map_err(Error::SendEmailError)
    }
}

#[async_trait::async_trait]
impl Mailer for EmailClient {
    #[tracing::instrument(
        name = "Send an email via API",
        skip(self, recipients, email),
        fields(recipient_count = recipients.len())
    )]
    async fn send(&self, recipients: &Recipients, email: &Email) -> Result<DeliveryReceipt> {
        let batches = match recipients {
            Recipients::Single(_) => vec![recipients.clone()],
            Recipients::Batched(emails) => emails
                .chunks(MAX_RECIPIENTS_PER_MESSAGE)
                .map(|chunk| Recipients::Batched(chunk.to_vec()))
                .collect(),
        };

        let mut message_id = None;
        for batch in &batches {
            let response = self.post(&email.as_request(&self.sender, batch)).await?;
            message_id = message_id.or(response.message_id);
        }

        Ok(DeliveryReceipt {
            message_id,
            recipients: recipients.len(),
        })
    }
}

/// Content of an outgoing email
#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl Email {
    fn as_request<'e>(
        &'e self,
        sender: &'e EmailAddress,
        recipients: &'e Recipients,
    ) -> SendEmailRequest<'e> {
        // Batched mail is addressed to the sender so subscribers only appear in Bcc
        let (to, bcc) = match recipients {
            Recipients::Single(recipient) => (recipient.as_ref(), None),
            Recipients::Batched(emails) => (
                sender.as_ref(),
                Some(
                    emails
                        .iter()
                        .map(AsRef::as_ref)
                        .collect::<Vec<&str>>()
                        .join(","),
                ),
            ),
        };

        SendEmailRequest {
            to,
            bcc,
            from: sender.as_ref(),
            subject: &self.subject,
            html_body: &self.html_body,
            text_body: &self.text_body,
        }
    }
}

/// Confirmation that the email API accepted a message
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReceipt {
    pub message_id: Option<String>,
    pub recipients: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<String>,
    from: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    #[serde(rename = "MessageID", default)]
    message_id: Option<String>,
}
