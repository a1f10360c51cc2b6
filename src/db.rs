use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    /// Builds the pool without opening a connection; connections are made on
    /// first use so a database outage at startup does not take the process down.
    pub fn connect_lazy(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }
}
