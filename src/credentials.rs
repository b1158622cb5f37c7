//! Credential selection for paid capabilities (video generation).

use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn has_selected_key(&self) -> Result<bool>;
    /// Open the key picker. Completion does not imply a key was chosen.
    async fn open_select_key(&self) -> Result<()>;
}

/// Credential backed by the configured API key; there is nothing to pick.
pub struct EnvCredentialStore {
    api_key: Option<String>,
}

impl EnvCredentialStore {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl CredentialStore for EnvCredentialStore {
    async fn has_selected_key(&self) -> Result<bool> {
        Ok(self.api_key.as_deref().is_some_and(|k| !k.is_empty()))
    }

    async fn open_select_key(&self) -> Result<()> {
        tracing::warn!("No interactive key picker; set GEMINI_API_KEY in the environment or .env");
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockCredentialStore {
    selected: Arc<Mutex<bool>>,
    select_on_open: Arc<Mutex<bool>>,
    open_count: Arc<Mutex<usize>>,
}

impl MockCredentialStore {
    pub fn new(selected: bool) -> Self {
        Self {
            selected: Arc::new(Mutex::new(selected)),
            select_on_open: Arc::new(Mutex::new(true)),
            open_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Whether opening the picker results in a selected key.
    pub fn with_select_on_open(self, select: bool) -> Self {
        *self.select_on_open.lock().unwrap() = select;
        self
    }

    pub fn get_open_count(&self) -> usize {
        *self.open_count.lock().unwrap()
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn has_selected_key(&self) -> Result<bool> {
        Ok(*self.selected.lock().unwrap())
    }

    async fn open_select_key(&self) -> Result<()> {
        *self.open_count.lock().unwrap() += 1;
        if *self.select_on_open.lock().unwrap() {
            *self.selected.lock().unwrap() = true;
        }
        Ok(())
    }
}
