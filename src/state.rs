use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::config::{AppConfig, ProviderConfig};
use crate::provider::{
    CredentialProvider, HttpCredentialProvider, HttpRecordStore, ProviderHttp, RecordStore,
};

/// Collaborators shared by every handler. Built once at startup and never
/// mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialProvider>,
    pub store: Arc<dyn RecordStore>,
    pub clock: Arc<dyn Clock + Send + Sync>,
    pub publications_table: String,
}

impl AppState {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            credentials,
            store,
            clock,
            publications_table: ProviderConfig::DEFAULT_PUBLICATIONS_TABLE.to_string(),
        }
    }

    pub fn with_publications_table(mut self, table: impl Into<String>) -> Self {
        self.publications_table = table.into();
        self
    }

    /// Wire the HTTP adapters for the configured provider
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = ProviderHttp::new(&config.provider)?;
        Ok(Self::new(
            Arc::new(HttpCredentialProvider::new(http.clone())),
            Arc::new(HttpRecordStore::new(http)),
            Arc::new(DefaultClock),
        )
        .with_publications_table(config.provider.publications_table.clone()))
    }
}
