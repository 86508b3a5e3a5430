use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use tracing_actix_web::TracingLogger;

use crate::controller::{game, history, mail, subscriptions};
use crate::error::RestError;
use crate::notifier::Notifier;
use crate::settings::AdminSettings;

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().finish()
}

/// Form bodies that fail to deserialize are rejected with the JSON error body
fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _| RestError::ParseError(err.to_string()).into())
}

/// JSON bodies that fail to deserialize are rejected with the JSON error body
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _| RestError::ParseError(err.to_string()).into())
}

/// Run the application on a specified TCP listener
pub fn run(listener: TcpListener, notifier: Notifier, admin: AdminSettings) -> anyhow::Result<Server> {
    // Wrap application data
    let notifier = web::Data::new(notifier);
    let admin = web::Data::new(admin);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(notifier.clone())
            .app_data(admin.clone())
            .app_data(form_config())
            .app_data(json_config())
            .service(health_check)
            .service(game::scope())
            .service(subscriptions::scope())
            .service(mail::scope())
            .service(history::scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
