#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string. Without one the in-memory store is used.
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 10,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let max_connections = match std::env::var("DB_MAX_CONNECTIONS") {
            Ok(v) => v
                .parse::<u32>()
                .map_err(|e| anyhow::anyhow!("DB_MAX_CONNECTIONS={v:?}: {e}"))?,
            Err(_) => 10,
        };
        Ok(Self {
            database_url,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_database() {
        let config = AppConfig::default();
        assert!(config.database_url.is_none());
        assert_eq!(config.max_connections, 10);
    }
}
