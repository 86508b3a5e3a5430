use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, post, web, HttpResponse, Responder};

use serde::{Deserialize, Serialize};

use crate::domain::EmailAddress;
use crate::error::RestResult;
use crate::notifier::Notifier;

/// Form deserialization wrapper for subscription requests
#[derive(Debug, Deserialize)]
pub struct SubscriptionForm {
    email: String,
}

#[derive(Debug, Serialize)]
struct SubscriptionBody {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    removed: Option<bool>,
}

/// Create endpoint for new subscriptions
#[tracing::instrument(name = "Add a new subscriber", skip(notifier))]
#[post("")]
async fn create(
    notifier: web::Data<Notifier>,
    form: web::Form<SubscriptionForm>,
) -> RestResult<impl Responder> {
    let email: EmailAddress = form.0.email.parse()?;

    notifier.subscribers().add(&email).await?;

    Ok(HttpResponse::Created().json(SubscriptionBody {
        email: email.to_string(),
        removed: None,
    }))
}

/// Unsubscribe endpoint, succeeds even if the email was not subscribed
#[tracing::instrument(name = "Remove a subscriber", skip(notifier))]
#[delete("")]
async fn remove(
    notifier: web::Data<Notifier>,
    form: web::Form<SubscriptionForm>,
) -> RestResult<impl Responder> {
    let email: EmailAddress = form.0.email.parse()?;

    let removed = notifier.subscribers().remove(&email).await?;
    if !removed {
        tracing::info!("{} was not subscribed", email);
    }

    Ok(HttpResponse::Ok().json(SubscriptionBody {
        email: email.to_string(),
        removed: Some(removed),
    }))
}

/// Subscriptions API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/subscriptions")
        .service(create)
        .service(remove)
}
