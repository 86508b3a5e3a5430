mod catalog_client;
mod email_client;

pub use catalog_client::{current_free_game, CatalogClient, CatalogEntry};
pub use email_client::{DeliveryReceipt, Email, EmailClient, Mailer};
