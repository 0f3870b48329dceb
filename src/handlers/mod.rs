use std::sync::Arc;

use crate::db::CredentialStore;
use crate::error::{AppError, Result};

pub mod admin;
pub mod auth;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

/// Absent and empty values both count as missing
fn required(value: Option<String>, field: &'static str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(AppError::MissingField(field))
}
