use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};

use reqwest::{Client, Method, Response};

use secrecy::Secret;

use serde::Serialize;

use sqlx::PgPool;

use url::Url;

use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

use freegames::app;
use freegames::client::{CatalogClient, EmailClient};
use freegames::notifier::Notifier;
use freegames::repo::{PgGameHistoryRepo, PgSubscriptionRepo};
use freegames::settings::AdminSettings;

pub const SENDER: &str = "freegames@test.com";

#[derive(Debug, Serialize)]
pub struct SubscriptionForm {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MailContent {
    pub text: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Mail {
    pub subject: Option<String>,
    pub content: Option<MailContent>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub struct TestApp {
    addr: String,

    pub client: Client,
    pub feed_server: MockServer,
    pub email_server: MockServer,
    pub admin: Credentials,
}

impl TestApp {
    pub async fn spawn(pool: &PgPool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);

        let feed_server = MockServer::start().await;
        let email_server = MockServer::start().await;

        let catalog_client = {
            let url = Url::parse(&feed_server.uri())
                .and_then(|url| url.join("freeGamesPromotions"))
                .expect("Failed to parse mock feed uri");

            CatalogClient::new(url, Duration::from_secs(2)).expect("Failed to create catalog client")
        };

        let email_client = {
            let sender = SENDER.parse().expect("Failed to parse sender email address");
            let api_base_url =
                Url::parse(&email_server.uri()).expect("Failed to parse mock server uri");
            let api_auth_token = Secret::new("TestAuthorization".into());
            let api_timeout = Duration::from_secs(2);

            EmailClient::new(sender, api_timeout, api_base_url, api_auth_token)
                .expect("Failed to create email client")
        };

        let (admin_settings, admin) = admin_credentials();

        let notifier = Notifier::new(
            catalog_client,
            Arc::new(PgGameHistoryRepo::new(pool.clone())),
            Arc::new(PgSubscriptionRepo::new(pool.clone())),
            Arc::new(email_client),
        );

        let server =
            app::run(listener, notifier, admin_settings).expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let client = Client::new();

        Self {
            addr,
            client,
            feed_server,
            email_server,
            admin,
        }
    }

    pub fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", &self.addr, url);
        self.client.request(method, url)
    }

    pub fn authorized_request(
        &self,
        method: Method,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> reqwest::RequestBuilder {
        let req = self.request(method, url);
        if let Some(creds) = credentials {
            req.basic_auth(creds.username.clone(), Some(creds.password.clone()))
        } else {
            req
        }
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "health_check").send().await
    }

    pub async fn current_game(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "game").send().await
    }

    pub async fn check_game(&self) -> reqwest::Result<Response> {
        self.request(Method::POST, "game/check").send().await
    }

    pub async fn subscribe(&self, email: Option<&str>) -> reqwest::Result<Response> {
        self.request(Method::POST, "subscriptions")
            .form(&SubscriptionForm {
                email: email.map(String::from),
            })
            .send()
            .await
    }

    pub async fn unsubscribe(&self, email: Option<&str>) -> reqwest::Result<Response> {
        self.request(Method::DELETE, "subscriptions")
            .form(&SubscriptionForm {
                email: email.map(String::from),
            })
            .send()
            .await
    }

    pub async fn send_mail(
        &self,
        credentials: Option<&Credentials>,
        mail: &Mail,
    ) -> reqwest::Result<Response> {
        self.authorized_request(Method::POST, "mail", credentials)
            .json(mail)
            .send()
            .await
    }

    pub async fn latest_history(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "history/latest").send().await
    }

    pub async fn remove_latest_history(
        &self,
        credentials: Option<&Credentials>,
    ) -> reqwest::Result<Response> {
        self.authorized_request(Method::DELETE, "history/latest", credentials)
            .send()
            .await
    }

    /// Replace the feed so that `title` is the only promotion, running from yesterday to tomorrow
    pub async fn serve_free_game(&self, title: &str) {
        self.feed_server.reset().await;

        let yesterday = Utc::now() - ChronoDuration::days(1);
        let tomorrow = Utc::now() + ChronoDuration::days(1);

        Mock::given(method("GET"))
            .and(path("/freeGamesPromotions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "Catalog": { "searchStore": { "elements": [
                    { "title": title, "effectiveDate": yesterday, "expiryDate": tomorrow }
                ]}}}
            })))
            .mount(&self.feed_server)
            .await;
    }

    /// Accept every send-email request
    pub async fn accept_emails(&self) {
        Mock::given(path("/email"))
            .and(method("POST"))
            .respond_with(accepted_email())
            .mount(&self.email_server)
            .await;
    }

    /// JSON bodies of every send-email request received so far
    pub async fn sent_emails(&self) -> Vec<serde_json::Value> {
        self.email_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|req| serde_json::from_slice(&req.body).unwrap())
            .collect()
    }
}

pub fn accepted_email() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "MessageID": "0a129aee-e1cd-480d-b08d-4f48548ff48d",
        "ErrorCode": 0,
        "Message": "OK"
    }))
}

fn admin_credentials() -> (AdminSettings, Credentials) {
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};
    use rand::{distributions::Alphanumeric, Rng};

    let password: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();

    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("Failed to hash admin password")
        .to_string();

    let settings = AdminSettings {
        username: "admin".into(),
        password_hash: Secret::new(password_hash),
    };
    let credentials = Credentials {
        username: "admin".into(),
        password,
    };
    (settings, credentials)
}
