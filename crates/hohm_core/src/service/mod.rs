//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep HTTP/CLI layers decoupled from storage and provider details.

pub mod account_service;
pub mod household_service;
pub mod notify_service;
