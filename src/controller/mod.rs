pub mod game;
pub mod history;
pub mod mail;
pub mod subscriptions;
