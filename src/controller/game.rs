use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use serde::Serialize;

use crate::domain::GameRecord;
use crate::error::RestResult;
use crate::notifier::Notifier;

#[derive(Debug, Serialize)]
struct CurrentGame {
    game: Option<GameRecord>,
}

/// Look up the game that is free right now, without recording it
#[tracing::instrument(name = "Check current free game", skip(notifier))]
#[get("")]
async fn current(notifier: web::Data<Notifier>) -> RestResult<impl Responder> {
    let game = notifier.catalog().fetch_current_free_game().await?;

    Ok(HttpResponse::Ok().json(CurrentGame { game }))
}

/// Compare the catalog with the last announced game and notify subscribers on change
#[tracing::instrument(name = "Trigger free game check", skip(notifier))]
#[post("/check")]
async fn check(notifier: web::Data<Notifier>) -> RestResult<impl Responder> {
    let outcome = notifier.run_cycle().await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Free game API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/game").service(current).service(check)
}
