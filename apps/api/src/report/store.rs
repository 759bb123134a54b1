//! Report Store — bounded, newest-first history of generated reports.
//!
//! The store is a cheap `Clone` handle over a pluggable backend:
//! - `MemoryBackend`: one mutex around a deque; used when no Redis URL is configured
//!   and in tests.
//! - `RedisBackend`: a Redis list of JSON records, pushed and trimmed in one MULTI.
//!
//! Either way append/list/clear are serialized, so the capacity and ordering hold
//! under concurrent appends. There is no content dedup: regenerating the same tier from
//! the same file yields two entries.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::report::GeneratedReport;

/// Maximum number of reports kept.
pub const STORE_CAPACITY: usize = 20;
pub const DEFAULT_STORE_KEY: &str = "stratahelix_reports_v1";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Stored report is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Storage backend. Implementations must keep at most `capacity` entries, newest first.
#[async_trait]
pub trait ReportBackend: Send + Sync {
    async fn push_front(&self, report: &GeneratedReport, capacity: usize) -> Result<(), StoreError>;

    /// All entries, newest first.
    async fn load(&self) -> Result<Vec<GeneratedReport>, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct ReportStore {
    backend: Arc<dyn ReportBackend>,
    capacity: usize,
}

impl ReportStore {
    pub fn new(backend: Arc<dyn ReportBackend>) -> Self {
        Self {
            backend,
            capacity: STORE_CAPACITY,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()))
    }

    /// Inserts at the front, evicting the oldest entries beyond capacity.
    pub async fn append(&self, report: &GeneratedReport) -> Result<(), StoreError> {
        self.backend.push_front(report, self.capacity).await
    }

    pub async fn list(&self) -> Result<Vec<GeneratedReport>, StoreError> {
        self.backend.load().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<GeneratedReport>, StoreError> {
        Ok(self.list().await?.into_iter().find(|r| r.id == id))
    }

    /// Empties the store. Irreversible.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.backend.clear().await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryBackend {
    reports: Mutex<VecDeque<GeneratedReport>>,
}

#[async_trait]
impl ReportBackend for MemoryBackend {
    async fn push_front(&self, report: &GeneratedReport, capacity: usize) -> Result<(), StoreError> {
        let mut reports = self.reports.lock().await;
        reports.push_front(report.clone());
        reports.truncate(capacity);
        Ok(())
    }

    async fn load(&self) -> Result<Vec<GeneratedReport>, StoreError> {
        Ok(self.reports.lock().await.iter().cloned().collect())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.reports.lock().await.clear();
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Redis backend
// ────────────────────────────────────────────────────────────────────────────

/// Reports live in one Redis list at `key`, index 0 being the newest.
pub struct RedisBackend {
    client: redis::Client,
    conn: OnceCell<MultiplexedConnection>,
    key: String,
}

impl RedisBackend {
    pub fn new(client: redis::Client, key: impl Into<String>) -> Self {
        let key = key.into();
        info!("Report store backed by Redis list '{key}'");
        Self {
            client,
            conn: OnceCell::new(),
            key,
        }
    }

    /// Opened on first use, then shared; clones multiplex over the same socket.
    async fn connection(&self) -> Result<MultiplexedConnection, StoreError> {
        let conn = self
            .conn
            .get_or_try_init(|| self.client.get_multiplexed_async_connection())
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl ReportBackend for RedisBackend {
    async fn push_front(&self, report: &GeneratedReport, capacity: usize) -> Result<(), StoreError> {
        let payload = serde_json::to_string(report)?;
        let mut conn = self.connection().await?;

        let stop = capacity as isize - 1;
        redis::pipe()
            .atomic()
            .lpush(&self.key, payload)
            .ignore()
            .ltrim(&self.key, 0, stop)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn load(&self) -> Result<Vec<GeneratedReport>, StoreError> {
        let mut conn = self.connection().await?;
        let raw: Vec<String> = conn.lrange(&self.key, 0, -1).await?;
        Ok(decode_entries(&self.key, &raw))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(&self.key).await?;
        Ok(())
    }
}

/// Parses stored entries, skipping (and logging) any that no longer decode.
fn decode_entries(key: &str, raw: &[String]) -> Vec<GeneratedReport> {
    raw.iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_str(entry) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Skipping unreadable report at {key}[{i}]: {e}");
                None
            }
        })
        .collect()
}
