use std::sync::Arc;

use serde::Serialize;

use crate::client::{CatalogClient, Email, Mailer};
use crate::domain::{decide, notification, Action, GameRecord, Recipients};
use crate::error::Result;
use crate::repo::{GameHistoryStore, SubscriberStore};

/// Result of one fetch, decide, notify cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "CycleSummary")]
pub enum CycleOutcome {
    /// Nothing new to announce
    Unchanged { game: Option<GameRecord> },
    /// A new game was recorded and announced
    Notified { game: GameRecord, recipients: usize },
}

/// Flat `{ status, game, recipients }` rendering of a [`CycleOutcome`]
#[derive(Debug, Serialize)]
struct CycleSummary {
    status: &'static str,
    game: Option<GameRecord>,
    recipients: usize,
}

impl From<CycleOutcome> for CycleSummary {
    fn from(outcome: CycleOutcome) -> Self {
        match outcome {
            CycleOutcome::Unchanged { game } => Self {
                status: "unchanged",
                game,
                recipients: 0,
            },
            CycleOutcome::Notified { game, recipients } => Self {
                status: "notified",
                game: Some(game),
                recipients,
            },
        }
    }
}

/// Ties the catalog feed, the stores and the mailer together
pub struct Notifier {
    catalog: CatalogClient,
    history: Arc<dyn GameHistoryStore>,
    subscribers: Arc<dyn SubscriberStore>,
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(
        catalog: CatalogClient,
        history: Arc<dyn GameHistoryStore>,
        subscribers: Arc<dyn SubscriberStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            catalog,
            history,
            subscribers,
            mailer,
        }
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn history(&self) -> &dyn GameHistoryStore {
        self.history.as_ref()
    }

    pub fn subscribers(&self) -> &dyn SubscriberStore {
        self.subscribers.as_ref()
    }

    /// Fetch the catalog and announce the free game if it changed since the last announcement.
    ///
    /// The game is recorded before any mail goes out. A failed send is not
    /// retried on the next cycle.
    #[tracing::instrument(name = "Run notification cycle", skip(self))]
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let latest = self.catalog.fetch_current_free_game().await?;
        let last = self.history.current().await?;

        let game = match decide(latest.as_ref(), last.as_ref()) {
            Action::NoAction => {
                tracing::info!("Free game unchanged");
                return Ok(CycleOutcome::Unchanged { game: latest });
            }
            Action::Notify(game) => game,
        };

        if !self.history.compare_and_append(last.as_ref(), &game).await? {
            tracing::info!(
                "Current game changed concurrently, skipping announcement of {}",
                game.title
            );
            return Ok(CycleOutcome::Unchanged { game: Some(game) });
        }

        tracing::info!("New free game {}, notifying subscribers", game.title);
        let recipients = self.broadcast(&notification::render(&game)).await?;

        Ok(CycleOutcome::Notified { game, recipients })
    }

    /// Send an email to every subscriber, returns the number of recipients reached
    #[tracing::instrument(name = "Broadcast email", skip(self, email), fields(subject = %email.subject))]
    pub async fn broadcast(&self, email: &Email) -> Result<usize> {
        let emails = self.subscribers.list_all().await?;

        let Some(recipients) = Recipients::select(emails) else {
            tracing::info!("No subscribers, nothing to send");
            return Ok(0);
        };

        let receipt = self.mailer.send(&recipients, email).await?;
        tracing::debug!(message_id = ?receipt.message_id, "Email accepted for delivery");

        Ok(receipt.recipients)
    }
}
