//! JSON-over-HTTP API for HOHM households, accounts and comment emails.

pub mod config;
pub mod error;
pub mod mail;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use mail::ResendMailer;
pub use routes::build_router;
pub use state::AppState;
