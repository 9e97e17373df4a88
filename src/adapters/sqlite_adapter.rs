//! SQLite strategy store.
//!
//! Strategy configs are stored as JSON text keyed by a unique name.

use crate::domain::error::AlgoblocksError;
use crate::domain::strategy::{StoredStrategy, StrategyConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::strategy_store_port::StrategyStorePort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, ErrorCode, OptionalExtension};

const DEFAULT_POOL_SIZE: i64 = 4;

pub struct SqliteStrategyStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStrategyStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AlgoblocksError> {
        let db_path =
            config
                .get_string("store", "path")
                .ok_or_else(|| AlgoblocksError::SettingsMissing {
                    section: "store".into(),
                    key: "path".into(),
                })?;

        let pool_size = config
            .get_int("store", "pool_size")?
            .unwrap_or(DEFAULT_POOL_SIZE);
        let pool_size = u32::try_from(pool_size)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                AlgoblocksError::settings_invalid("store", "pool_size", "pool_size must be positive")
            })?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| AlgoblocksError::Database {
                    reason: e.to_string(),
                })?;

        tracing::debug!(path = %db_path, pool_size, "opened strategy store");
        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Single-connection in-memory store; every pooled handle sees the same database.
    pub fn in_memory() -> Result<Self, AlgoblocksError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| AlgoblocksError::Database {
                reason: e.to_string(),
            })?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn initialize_schema(&self) -> Result<(), AlgoblocksError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS strategies (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    config TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                );",
            )
            .map_err(query_error)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, AlgoblocksError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| AlgoblocksError::Database {
                reason: e.to_string(),
            })
    }
}

impl StrategyStorePort for SqliteStrategyStore {
    fn create(&self, name: &str, config: &StrategyConfig) -> Result<(), AlgoblocksError> {
        let name = validate_name(name)?;
        config.validate()?;
        let json = serde_json::to_string(config)?;

        self.conn()?
            .execute(
                "INSERT INTO strategies (name, config) VALUES (?1, ?2)",
                params![name, json],
            )
            .map_err(|e| unique_violation(e, name))?;

        tracing::info!(name, "strategy saved");
        Ok(())
    }

    fn list(&self) -> Result<Vec<StoredStrategy>, AlgoblocksError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT name, config FROM strategies ORDER BY id")
            .map_err(query_error)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(query_error)?;

        let mut strategies = Vec::new();
        for row in rows {
            let (name, json) = row.map_err(query_error)?;
            strategies.push(StoredStrategy {
                config: StrategyConfig::from_json_str(&json)?,
                name,
            });
        }
        Ok(strategies)
    }

    fn get(&self, name: &str) -> Result<Option<StoredStrategy>, AlgoblocksError> {
        let json: Option<String> = self
            .conn()?
            .query_row(
                "SELECT config FROM strategies WHERE name = ?1",
                params![name.trim()],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error)?;

        match json {
            Some(json) => Ok(Some(StoredStrategy {
                name: name.trim().to_string(),
                config: StrategyConfig::from_json_str(&json)?,
            })),
            None => Ok(None),
        }
    }

    fn rename(&self, name: &str, new_name: &str) -> Result<(), AlgoblocksError> {
        let new_name = validate_name(new_name)?;
        let updated = self
            .conn()?
            .execute(
                "UPDATE strategies SET name = ?2 WHERE name = ?1",
                params![name.trim(), new_name],
            )
            .map_err(|e| unique_violation(e, new_name))?;

        if updated == 0 {
            return Err(AlgoblocksError::StrategyNotFound {
                name: name.trim().to_string(),
            });
        }
        tracing::info!(from = name.trim(), to = new_name, "strategy renamed");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), AlgoblocksError> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM strategies WHERE name = ?1", params![name.trim()])
            .map_err(query_error)?;

        if deleted == 0 {
            return Err(AlgoblocksError::StrategyNotFound {
                name: name.trim().to_string(),
            });
        }
        tracing::info!(name = name.trim(), "strategy deleted");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str, AlgoblocksError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AlgoblocksError::invalid_config("name", "must not be empty"));
    }
    Ok(name)
}

fn query_error(e: rusqlite::Error) -> AlgoblocksError {
    AlgoblocksError::Database {
        reason: e.to_string(),
    }
}

fn unique_violation(e: rusqlite::Error, name: &str) -> AlgoblocksError {
    match e {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            AlgoblocksError::StrategyExists {
                name: name.to_string(),
            }
        }
        other => query_error(other),
    }
}
