use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::db::PgStore;
use crate::store::{MemoryStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects to Postgres and applies migrations when `database_url` is
    /// set, otherwise falls back to the in-memory store.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = match config.database_url.as_deref() {
            Some(url) => {
                let pg = PgStore::connect(url, config.max_connections).await?;
                if let Err(e) = pg.migrate().await {
                    warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(pg) as Arc<dyn Store>
            }
            None => {
                warn!("DATABASE_URL not set; records are kept in memory only");
                Arc::new(MemoryStore::new()) as Arc<dyn Store>
            }
        };
        info!(backend = store.backend(), "store initialised");

        Ok(Self { store, config })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            config: Arc::new(AppConfig::default()),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}
