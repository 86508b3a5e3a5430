/// Basic application code
pub mod app;
/// Administrator authentication
pub mod auth;
/// REST clients for outside services
pub mod client;
/// Controllers for REST endpoints
pub mod controller;
/// Domain objects and the notification decision
pub mod domain;
/// Error enums
pub mod error;
/// Fetch, decide and notify cycle
pub mod notifier;
/// Repositories
pub mod repo;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
