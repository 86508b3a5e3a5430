use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, get, web, HttpResponse, Responder};

use serde::Serialize;

use crate::auth::Administrator;
use crate::domain::HistoryEntry;
use crate::error::RestResult;
use crate::notifier::Notifier;

#[derive(Debug, Serialize)]
struct LatestEntry {
    latest: Option<HistoryEntry>,
}

#[derive(Debug, Serialize)]
struct RemovedEntry {
    removed: Option<HistoryEntry>,
}

#[tracing::instrument(name = "Fetch latest announced game", skip(notifier))]
#[get("/latest")]
async fn latest(notifier: web::Data<Notifier>) -> RestResult<impl Responder> {
    let latest = notifier.history().find_latest().await?;

    Ok(HttpResponse::Ok().json(LatestEntry { latest }))
}

/// Forget the latest announcement so the next check can announce it again
#[tracing::instrument(name = "Remove latest announced game", skip(notifier))]
#[delete("/latest")]
async fn remove_latest(
    admin: Administrator, // Administrator guard
    notifier: web::Data<Notifier>,
) -> RestResult<impl Responder> {
    let removed = notifier.history().remove_latest().await?;

    Ok(HttpResponse::Ok().json(RemovedEntry { removed }))
}

/// Game history API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/history").service(latest).service(remove_latest)
}
