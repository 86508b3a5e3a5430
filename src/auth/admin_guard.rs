use std::future::Future;
use std::pin::Pin;

use actix_web::{dev, web, FromRequest, HttpRequest};

use argon2::{Argon2, PasswordHash, PasswordVerifier};

use anyhow::Context;

use secrecy::Secret;

use crate::error::{RestError, RestResult};
use crate::settings::AdminSettings;
use crate::telemetry::spawn_blocking_with_tracing;

use super::Credentials;

/// Request guard for endpoints that only the administrator may call
#[derive(Debug)]
pub struct Administrator(String);

impl FromRequest for Administrator {
    type Error = RestError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let admin = req
                .app_data::<web::Data<AdminSettings>>()
                .context("Admin settings not registered for application")?
                .get_ref()
                .clone();
            // Pull the credentials from the headers
            let creds = Credentials::from_headers(req.headers())
                .map_err(RestError::FailedToAuthenticate)?;

            let username = creds.username.clone();
            validate_credentials(admin, creds).await?;

            Ok(Administrator(username))
        })
    }
}

impl AsRef<str> for Administrator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[tracing::instrument("Validate credentials", skip(admin, credentials))]
async fn validate_credentials(admin: AdminSettings, credentials: Credentials) -> RestResult<()> {
    if credentials.username != admin.username {
        return Err(RestError::FailedToAuthenticate(anyhow::anyhow!(
            "Unknown username"
        )));
    }

    let password = credentials.password;
    let password_hash = admin.password_hash;

    spawn_blocking_with_tracing(move || verify_password_hash(password, password_hash))
        .await
        .context("Failed to spawn blocking task")??;

    Ok(())
}

#[tracing::instrument("Verify password hash", skip(password, password_hash))]
fn verify_password_hash(password: Secret<String>, password_hash: Secret<String>) -> RestResult<()> {
    use secrecy::ExposeSecret;

    let password_hash = PasswordHash::new(password_hash.expose_secret())
        .context("Failed to parse stored password hash")?;

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &password_hash)
        .context("Failed to verify password hash")
        .map_err(RestError::FailedToAuthenticate)?;

    Ok(())
}
