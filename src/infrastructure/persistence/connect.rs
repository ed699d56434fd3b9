//! Opens the configured entry store.

use anyhow::{Context, Result};
use mongodb::Client;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, StoreBackend};
use crate::domain::repositories::EntryRepository;
use crate::infrastructure::persistence::{
    MemoryEntryRepository, MongoEntryRepository, PgEntryRepository,
};

/// Connects to the backend named in `config` and returns it as a shared repository.
///
/// - **memory**: a fresh, empty [`MemoryEntryRepository`]
/// - **postgres**: a connection pool, with pending migrations applied
/// - **mongodb**: a client on `config.mongodb_database`; the url index is
///   created on first use
///
/// # Errors
///
/// Returns an error if the connection string is missing, the database is
/// unreachable, or migrations fail.
pub async fn connect_repository(config: &Config) -> Result<Arc<dyn EntryRepository>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryEntryRepository::new()))
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the postgres backend")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .connect(url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to migrate")?;

            Ok(Arc::new(PgEntryRepository::new(Arc::new(pool))))
        }
        StoreBackend::MongoDb => {
            let uri = config
                .mongodb_uri
                .as_deref()
                .context("MONGODB_URI must be set for the mongodb backend")?;

            let client = Client::with_uri_str(uri)
                .await
                .context("Failed to connect to MongoDB")?;
            tracing::info!(database = %config.mongodb_database, "Connected to MongoDB");

            let database = client.database(&config.mongodb_database);
            Ok(Arc::new(MongoEntryRepository::new(&database)))
        }
    }
}
