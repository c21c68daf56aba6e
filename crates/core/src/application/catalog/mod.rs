// Catalog Service - queue creation, discovery and operator views

pub mod create;

pub use create::CreateQueueRequest;

use crate::domain::{ArchivedEntry, Queue, QueueEntry, QueueId, ShortId};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, QueueFilter, QueueRepository, TimeProvider};
use serde::Serialize;
use std::sync::Arc;

/// Default number of archived entries returned to the operator
pub const DEFAULT_ARCHIVE_LIMIT: i64 = 50;
const MAX_ARCHIVE_LIMIT: i64 = 500;

/// Public view of one queue
#[derive(Debug, Clone, Serialize)]
pub struct QueueView {
    pub queue: Queue,
    pub roster_size: i64,
    /// The caller's own entry, when the caller is identified and waiting
    pub my_entry: Option<QueueEntry>,
}

/// Operator view: queue and full ordered roster
#[derive(Debug, Clone, Serialize)]
pub struct QueueManagement {
    pub queue: Queue,
    pub roster: Vec<QueueEntry>,
}

/// Catalog Service
pub struct CatalogService {
    repo: Arc<dyn QueueRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl CatalogService {
    pub fn new(
        repo: Arc<dyn QueueRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            id_provider,
            time_provider,
        }
    }

    /// Active queues matching the filter, busiest first
    pub async fn list(&self, filter: &QueueFilter) -> Result<Vec<Queue>> {
        self.repo.list_queues(filter).await
    }

    /// Create a queue operated by `owner_id`
    pub async fn create(&self, owner_id: &str, req: CreateQueueRequest) -> Result<Queue> {
        create::execute(
            self.repo.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            owner_id,
            req,
        )
        .await
    }

    pub async fn find_by_short_id(&self, short_id: &str) -> Result<Queue> {
        let short_id = ShortId::parse(short_id)?;
        self.repo
            .find_queue_by_short_id(short_id.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No queue with short id {}", short_id)))
    }

    pub async fn view(&self, queue_id: &QueueId, caller: Option<&str>) -> Result<QueueView> {
        let queue = self.load(queue_id).await?;
        let my_entry = match caller {
            Some(user_id) => self.repo.find_entry_for_user(&queue.id, user_id).await?,
            None => None,
        };
        Ok(QueueView {
            roster_size: queue.current_queue,
            queue,
            my_entry,
        })
    }

    pub async fn manage(&self, queue_id: &QueueId, operator: &str) -> Result<QueueManagement> {
        let queue = self.load_owned(queue_id, operator).await?;
        let roster = self.repo.list_roster(&queue.id).await?;
        Ok(QueueManagement { queue, roster })
    }

    /// Most recent departures, newest first
    pub async fn archive(
        &self,
        queue_id: &QueueId,
        operator: &str,
        limit: Option<i64>,
    ) -> Result<Vec<ArchivedEntry>> {
        let queue = self.load_owned(queue_id, operator).await?;
        let limit = limit
            .unwrap_or(DEFAULT_ARCHIVE_LIMIT)
            .clamp(1, MAX_ARCHIVE_LIMIT);
        self.repo.list_archive(&queue.id, limit).await
    }

    async fn load(&self, queue_id: &QueueId) -> Result<Queue> {
        self.repo
            .find_queue(queue_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", queue_id)))
    }

    async fn load_owned(&self, queue_id: &QueueId, operator: &str) -> Result<Queue> {
        let queue = self.load(queue_id).await?;
        crate::application::roster::ensure_owner(&queue, operator)?;
        Ok(queue)
    }
}
