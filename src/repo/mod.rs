mod games;
mod subscriptions;

pub use games::{GameHistoryStore, PgGameHistoryRepo};
pub use subscriptions::{PgSubscriptionRepo, SubscriberStore};
