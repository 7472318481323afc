use log::{error, info};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use diesel::connection::{Connection, SimpleConnection};
use diesel::r2d2;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::errors::{DatabaseError, Error, Result};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub fn init(app_data_dir: &str) -> Result<String> {
    let db_path = get_db_path(app_data_dir);

    // 1. Ensure directory exists
    if let Some(db_dir) = Path::new(&db_path).parent() {
        if !db_dir.exists() {
            fs::create_dir_all(db_dir).map_err(DatabaseError::Io)?;
        }
    }

    {
        let mut conn =
            SqliteConnection::establish(&db_path).map_err(DatabaseError::ConnectionFailed)?;
        conn.batch_execute(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 30000;
            PRAGMA synchronous  = NORMAL;
        ",
        )
        .map_err(DatabaseError::QueryFailed)?;
    }

    Ok(db_path)
}

pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = r2d2::Pool::builder()
        .max_size(8)
        .min_idle(Some(1)) // Keep at least one connection ready
        .connection_timeout(std::time::Duration::from_secs(30))
        .connection_customizer(Box::new(ConnectionCustomizer {}))
        .build(manager)
        .map_err(DatabaseError::PoolCreationFailed)?;
    Ok(Arc::new(pool))
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    info!("Initializing database schema");
    let mut connection = get_connection(pool)?;

    let result = connection.run_pending_migrations(MIGRATIONS).map_err(|e| {
        error!("Schema initialization failed: {}", e);
        Error::Database(DatabaseError::SchemaInitFailed(e.to_string()))
    })?;

    if result.is_empty() {
        info!("Schema already up to date.");
    } else {
        for migration_version in &result {
            info!("Applied schema migration: {}", migration_version);
        }
    }

    Ok(())
}

pub fn get_db_path(app_data_dir: &str) -> String {
    // Try to get the database URL from the environment variable
    std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        Path::new(app_data_dir)
            .join("goals.db")
            .to_string_lossy()
            .to_string()
    })
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection> {
    pool.get()
        .map_err(|e| Error::Database(DatabaseError::PoolCreationFailed(e)))
}

/// Owns the store location and hands out the shared connection pool.
///
/// The pool is created and the schema initialized on the first successful
/// `acquire`; later calls return the cached pool. Initialization is
/// mutex-guarded so concurrent first callers cannot race schema creation,
/// and a failed attempt leaves the handle empty so the next call retries.
pub struct Store {
    db_path: String,
    pool: Mutex<Option<Arc<DbPool>>>,
}

impl Store {
    /// Prepares the store under `app_data_dir` without opening the pool yet.
    pub fn new(app_data_dir: &str) -> Result<Self> {
        let db_path = init(app_data_dir)?;
        Ok(Store {
            db_path,
            pool: Mutex::new(None),
        })
    }

    /// Returns the shared pool, running schema initialization exactly once.
    pub fn acquire(&self) -> Result<Arc<DbPool>> {
        let mut guard = self.pool.lock().map_err(|_| {
            Error::Database(DatabaseError::SchemaInitFailed(
                "store initialization lock poisoned".to_string(),
            ))
        })?;

        if let Some(pool) = guard.as_ref() {
            return Ok(Arc::clone(pool));
        }

        let pool = create_pool(&self.db_path)?;
        run_migrations(&pool)?;
        *guard = Some(Arc::clone(&pool));
        Ok(pool)
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }
}

#[derive(Debug)]
struct ConnectionCustomizer;

impl r2d2::CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), r2d2::Error> {
        conn.batch_execute(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 30000;
        ",
        )
        .map_err(r2d2::Error::QueryError)
    }
}
