//! Local persistence for cart, wishlist and session records.
//!
//! Each record is stored under its own key and rewritten in full after every
//! mutation. Writes are fire-and-forget: stores hand the serialized record to a
//! [`Persister`], whose single background task applies them in order. Failures
//! are logged, never returned to the caller.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::sync::{Mutex, mpsc, oneshot};

pub const CART_KEY: &str = "cart-storage";
pub const WISHLIST_KEY: &str = "wishlist-storage";
pub const SESSION_KEY: &str = "auth-storage";

/// Schema version written into every record.
pub const RECORD_VERSION: u32 = 1;

/// On-disk shape of a record: `{"version":1,"items":[...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord<T> {
    pub version: u32,
    pub items: Vec<T>,
}

#[derive(Serialize)]
struct RecordRef<'a, T> {
    version: u32,
    items: &'a [T],
}

/// Durable key/value storage for records.
#[async_trait]
pub trait StateBackend: Send + Sync + 'static {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn store(&self, key: &str, payload: &str) -> anyhow::Result<()>;
}

/// SQLite-backed record storage.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create state directory at {parent:?}"))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open state database at {path:?}"))?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database; contents vanish with the backend.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options: SqliteConnectOptions = "sqlite::memory:"
            .parse()
            .context("invalid in-memory SQLite options")?;

        // One connection that never idles out, or the database goes with it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open in-memory state database")?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS state_records (
                key       TEXT PRIMARY KEY,
                data      TEXT NOT NULL,
                saved_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create state_records table")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StateBackend for SqliteBackend {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT data
            FROM state_records
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to fetch state record '{key}'"))?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let data: String = row.try_get("data")?;
        Ok(Some(data))
    }

    async fn store(&self, key: &str, payload: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO state_records (key, data, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key)
            DO UPDATE SET
                data = excluded.data,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(key)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to upsert state record '{key}'"))?;

        Ok(())
    }
}

/// Process-local record storage, mainly for tests.
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateBackend for MemoryBackend {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn store(&self, key: &str, payload: &str) -> anyhow::Result<()> {
        self.records
            .lock()
            .await
            .insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

/// Load the items of one record.
///
/// Missing, unreadable or foreign-version records come back empty; the
/// reason is logged.
pub async fn load_record<T: DeserializeOwned>(backend: &dyn StateBackend, key: &str) -> Vec<T> {
    let data = match backend.load(key).await {
        Ok(Some(data)) => data,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::error!(key, "failed to load state record: {err:?}");
            return Vec::new();
        }
    };

    match serde_json::from_str::<PersistedRecord<T>>(&data) {
        Ok(record) if record.version == RECORD_VERSION => record.items,
        Ok(record) => {
            tracing::warn!(key, version = record.version, "ignoring state record with unknown version");
            Vec::new()
        }
        Err(err) => {
            tracing::warn!(key, "ignoring unreadable state record: {err}");
            Vec::new()
        }
    }
}

enum WriteOp {
    Write { key: &'static str, payload: String },
    Flush(oneshot::Sender<()>),
}

/// Handle for fire-and-forget record writes.
///
/// Cheap to clone. Writes reach the backend in the order they were issued.
#[derive(Debug, Clone)]
pub struct Persister {
    tx: Option<mpsc::UnboundedSender<WriteOp>>,
}

impl core::fmt::Debug for WriteOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WriteOp::Write { key, payload } => f
                .debug_struct("Write")
                .field("key", key)
                .field("bytes", &payload.len())
                .finish(),
            WriteOp::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl Persister {
    /// Start the background writer. Must be called inside a Tokio runtime.
    pub fn spawn(backend: Arc<dyn StateBackend>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(backend, rx));
        Self { tx: Some(tx) }
    }

    /// A persister that discards every write.
    pub fn detached() -> Self {
        Self { tx: None }
    }

    /// Serialize `items` as the record under `key` and queue the write.
    pub fn persist<T: Serialize>(&self, key: &'static str, items: &[T]) {
        let Some(tx) = &self.tx else {
            return;
        };

        let record = RecordRef {
            version: RECORD_VERSION,
            items,
        };
        let payload = match serde_json::to_string(&record) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(key, "failed to serialize state record: {err}");
                return;
            }
        };

        if tx.send(WriteOp::Write { key, payload }).is_err() {
            tracing::warn!(key, "persistence writer has stopped; dropping write");
        }
    }

    /// Wait until every write queued before this call has been applied.
    pub async fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };

        let (done, wait) = oneshot::channel();
        if tx.send(WriteOp::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

async fn run_writer(backend: Arc<dyn StateBackend>, mut rx: mpsc::UnboundedReceiver<WriteOp>) {
    while let Some(op) = rx.recv().await {
        match op {
            WriteOp::Write { key, payload } => match backend.store(key, &payload).await {
                Ok(()) => tracing::debug!(key, bytes = payload.len(), "persisted state record"),
                Err(err) => tracing::error!(key, "failed to persist state record: {err:?}"),
            },
            WriteOp::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("persistence writer stopped");
}
