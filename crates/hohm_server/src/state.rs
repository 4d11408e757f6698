//! Shared application state.

use crate::error::ApiError;
use hohm_core::service::account_service::PASSWORD_HASH_COST;
use hohm_core::{Mailer, NotifyService};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Process-wide handles, built once at startup and cloned into handlers.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    notify: Arc<NotifyService>,
    password_cost: u32,
}

impl AppState {
    pub fn new(conn: Connection, mailer: Arc<dyn Mailer>, mail_from: impl Into<String>) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            notify: Arc::new(NotifyService::new(mailer, mail_from)),
            password_cost: PASSWORD_HASH_COST,
        }
    }

    /// Overrides the bcrypt cost for new password hashes.
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    pub fn password_cost(&self) -> u32 {
        self.password_cost
    }

    /// Runs `f` against the shared connection on the blocking pool.
    pub async fn with_conn<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| ApiError::unexpected("database mutex poisoned"))?;
            f(&conn)
        })
        .await
        .map_err(ApiError::unexpected)?
    }

    /// Runs `f` against the notification service on the blocking pool.
    pub async fn with_notify<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&NotifyService) -> Result<T, ApiError> + Send + 'static,
    {
        let notify = Arc::clone(&self.notify);
        tokio::task::spawn_blocking(move || f(&notify))
            .await
            .map_err(ApiError::unexpected)?
    }
}
