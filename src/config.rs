use std::path::PathBuf;
use std::str::FromStr;

/// Which record store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!(
                "RECORD_STORE must be one of firestore, postgres, memory (got {:?})",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store_backend: StoreBackend,
    /// Service-account key file for Firestore. Never served, never logged.
    pub credentials_path: PathBuf,
    pub firestore_project_id: Option<String>,
    pub firestore_emulator_host: Option<String>,
    pub database_url: Option<String>,
}

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CREDENTIALS_PATH: &str = "serviceAccountKey.json";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parses configuration from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            port: match var("PORT") {
                Some(port) => port
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
                None => DEFAULT_PORT,
            },
            store_backend: match var("RECORD_STORE") {
                Some(backend) => backend.parse()?,
                None => StoreBackend::Firestore,
            },
            credentials_path: var("GOOGLE_APPLICATION_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            firestore_project_id: var("FIRESTORE_PROJECT_ID"),
            firestore_emulator_host: var("FIRESTORE_EMULATOR_HOST"),
            database_url: var("DATABASE_URL")
                .map(|url| {
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })
                .transpose()?,
        };

        if config.store_backend == StoreBackend::Postgres && config.database_url.is_none() {
            anyhow::bail!("DATABASE_URL environment variable required when RECORD_STORE=postgres");
        }

        // Log without sensitive values
        tracing::debug!("Record store: {:?}", config.store_backend);
        tracing::debug!("Credentials path: {}", config.credentials_path.display());
        if let Some(ref host) = config.firestore_emulator_host {
            tracing::info!("Firestore emulator configured: {}", host);
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
