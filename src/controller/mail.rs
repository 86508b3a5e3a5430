use actix_web::dev::HttpServiceFactory;
use actix_web::{post, web, HttpResponse, Responder};

use serde::{Deserialize, Serialize};

use crate::auth::Administrator;
use crate::client::Email;
use crate::error::{RestError, RestResult};
use crate::notifier::Notifier;

#[derive(Debug, Deserialize)]
pub struct MailBody {
    subject: String,
    content: MailBodyContent,
}

#[derive(Debug, Deserialize)]
pub struct MailBodyContent {
    text: String,
    html: String,
}

impl TryFrom<MailBody> for Email {
    type Error = RestError;

    fn try_from(body: MailBody) -> RestResult<Self> {
        if body.subject.trim().is_empty() {
            return Err(RestError::ParseError("Subject cannot be empty".into()));
        }
        if body.content.text.trim().is_empty() && body.content.html.trim().is_empty() {
            return Err(RestError::ParseError("Content cannot be empty".into()));
        }

        Ok(Self {
            subject: body.subject,
            text_body: body.content.text,
            html_body: body.content.html,
        })
    }
}

#[derive(Debug, Serialize)]
struct MailSent {
    recipients: usize,
}

/// Send an ad-hoc message to every subscriber
#[tracing::instrument(name = "Send a message to subscribers", skip(body, notifier))]
#[post("")]
async fn send(
    admin: Administrator, // Administrator guard
    body: web::Json<MailBody>,
    notifier: web::Data<Notifier>,
) -> RestResult<impl Responder> {
    let email: Email = body.into_inner().try_into()?;

    let recipients = notifier.broadcast(&email).await?;

    Ok(HttpResponse::Ok().json(MailSent { recipients }))
}

/// Mail API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/mail").service(send)
}
