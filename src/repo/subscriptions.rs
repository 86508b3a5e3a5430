use chrono::Utc;

use sqlx::PgPool;

use uuid::Uuid;

use crate::domain::EmailAddress;
use crate::error::{Error, Result};

/// Subscriber store, implemented for each database used.
/// NOTE: Intended to facilitate easier testing/mocking
#[async_trait::async_trait]
pub trait SubscriberStore: Send + Sync {
    /// All subscribed email addresses, oldest subscription first
    async fn list_all(&self) -> Result<Vec<EmailAddress>>;

    /// Check whether an email address is subscribed
    async fn exists(&self, email: &EmailAddress) -> Result<bool>;

    /// Subscribe a new email address, failing with `Error::Duplicate` if it is present
    async fn add(&self, email: &EmailAddress) -> Result<Uuid>;

    /// Unsubscribe an email address, returns `false` if it was not subscribed
    async fn remove(&self, email: &EmailAddress) -> Result<bool>;
}

/// Postgres subscriber repository
#[derive(Debug, Clone)]
pub struct PgSubscriptionRepo {
    pool: PgPool,
}

impl PgSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SubscriberStore for PgSubscriptionRepo {
    #[tracing::instrument(name = "Fetch all subscribers", skip(self))]
    async fn list_all(&self) -> Result<Vec<EmailAddress>> {
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as("select id, email from subscriptions order by subscribed_at, email")
                .fetch_all(&self.pool)
                .await?;

        let emails = rows
            .into_iter()
            .filter_map(|(id, email)| match email.parse() {
                Ok(email) => Some(email),
                Err(error) => {
                    tracing::warn!(
                        error.cause_chain = ?error,
                        "Skipping a stored subscription (id: {}, email: {})",
                        id,
                        email
                    );
                    None
                }
            })
            .collect();

        Ok(emails)
    }

    #[tracing::instrument(name = "Check if subscriber exists", skip(self))]
    async fn exists(&self, email: &EmailAddress) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("select exists(select 1 from subscriptions where email=$1)")
                .bind(email.as_ref())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    #[tracing::instrument(name = "Insert subscriber", skip(self))]
    async fn add(&self, email: &EmailAddress) -> Result<Uuid> {
        let id: Option<Uuid> = sqlx::query_scalar(
            "insert into subscriptions(id, email, subscribed_at) values ($1, $2, $3) \
             on conflict (email) do nothing returning id",
        )
        .bind(Uuid::new_v4())
        .bind(email.as_ref())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        id.ok_or_else(|| Error::Duplicate(email.to_string()))
    }

    #[tracing::instrument(name = "Delete subscriber", skip(self))]
    async fn remove(&self, email: &EmailAddress) -> Result<bool> {
        let result = sqlx::query("delete from subscriptions where email=$1")
            .bind(email.as_ref())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
