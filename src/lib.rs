/// Basic application code
pub mod app;
/// Application authorization
pub mod auth;
/// Initial data seeding
pub mod bootstrap;
/// Controllers for REST endpoints
pub mod controller;
/// Domain objects
pub mod domain;
/// Error enums
pub mod error;
/// Repositories
pub mod repo;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
