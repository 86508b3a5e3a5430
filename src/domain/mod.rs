mod decision;
mod email_address;
mod game;
mod recipients;

pub mod notification;

pub use decision::{decide, Action};
pub use email_address::EmailAddress;
pub use game::{GameRecord, HistoryEntry};
pub use recipients::Recipients;
