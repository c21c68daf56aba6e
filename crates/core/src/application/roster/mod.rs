// Roster Service - every mutation of a queue's live roster
//
// Each use case runs in one roster transaction: the aggregates on the queue
// row, the live entries, the archive and the staged notifications change
// together or not at all.

pub mod add_known;
pub mod depart;
pub mod join;
pub mod service_time;
mod staging;

pub use depart::{DepartureRequest, DepartureTarget};

use crate::domain::{
    DepartureReason, EntryId, Queue, QueueEntry, QueueId, DEFAULT_MAX_ATTEMPTS,
};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TimeProvider, TransactionalRosterRepository};
use serde::Serialize;
use std::sync::Arc;

/// Result of a join (self-service or add-known)
#[derive(Debug, Clone, Serialize)]
pub struct JoinOutcome {
    pub entry: QueueEntry,
    /// Queue after the join
    pub queue: Queue,
    pub position: i64,
    pub estimated_wait_time: i64,
    pub notification_staged: bool,
}

/// Result of a leave / no-show / serve
#[derive(Debug, Clone, Serialize)]
pub struct DepartureOutcome {
    pub queue_id: QueueId,
    pub entry_id: EntryId,
    pub reason: DepartureReason,
    pub archived: bool,
    pub current_queue: i64,
    pub total_served: i64,
    pub total_estimated_time: i64,
    /// Entry that was told it is approaching the front, if any
    pub notified_entry: Option<EntryId>,
}

/// Borrowed collaborators for one use case
#[derive(Clone, Copy)]
pub struct RosterDeps<'a> {
    pub repo: &'a dyn TransactionalRosterRepository,
    pub id_provider: &'a dyn IdProvider,
    pub time_provider: &'a dyn TimeProvider,
    /// Delivery attempts stamped on staged notifications
    pub max_attempts: i32,
}

pub(crate) fn ensure_owner(queue: &Queue, user_id: &str) -> Result<()> {
    if queue.is_owned_by(user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "User {} does not operate queue {}",
            user_id, queue.id
        )))
    }
}

/// Roster Service
pub struct RosterService {
    repo: Arc<dyn TransactionalRosterRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    max_attempts: i32,
}

impl RosterService {
    pub fn new(
        repo: Arc<dyn TransactionalRosterRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            id_provider,
            time_provider,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: i32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    fn deps(&self) -> RosterDeps<'_> {
        RosterDeps {
            repo: self.repo.as_ref(),
            id_provider: self.id_provider.as_ref(),
            time_provider: self.time_provider.as_ref(),
            max_attempts: self.max_attempts,
        }
    }

    /// Append the user to the back of the queue
    pub async fn join(&self, queue_id: &QueueId, user_id: &str) -> Result<JoinOutcome> {
        join::execute(self.deps(), queue_id, user_id).await
    }

    /// Remove the user's own entry
    pub async fn leave(&self, queue_id: &QueueId, user_id: &str) -> Result<DepartureOutcome> {
        self.depart(DepartureRequest {
            queue_id: queue_id.clone(),
            target: DepartureTarget::User(user_id.to_string()),
            reason: DepartureReason::Left,
            operator: None,
        })
        .await
    }

    /// Operator removes a customer who did not turn up
    pub async fn no_show(
        &self,
        queue_id: &QueueId,
        entry_id: &EntryId,
        operator: &str,
    ) -> Result<DepartureOutcome> {
        self.depart(DepartureRequest {
            queue_id: queue_id.clone(),
            target: DepartureTarget::Entry(entry_id.clone()),
            reason: DepartureReason::NoShow,
            operator: Some(operator.to_string()),
        })
        .await
    }

    /// Operator marks a customer as served
    pub async fn serve(
        &self,
        queue_id: &QueueId,
        entry_id: &EntryId,
        operator: &str,
    ) -> Result<DepartureOutcome> {
        self.depart(DepartureRequest {
            queue_id: queue_id.clone(),
            target: DepartureTarget::Entry(entry_id.clone()),
            reason: DepartureReason::Served,
            operator: Some(operator.to_string()),
        })
        .await
    }

    pub async fn depart(&self, req: DepartureRequest) -> Result<DepartureOutcome> {
        depart::execute(self.deps(), req).await
    }

    /// Operator enqueues a registered user by short id
    pub async fn add_known(
        &self,
        queue_id: &QueueId,
        operator: &str,
        short_id: &str,
    ) -> Result<JoinOutcome> {
        add_known::execute(self.deps(), queue_id, operator, short_id).await
    }

    pub async fn update_service_time(
        &self,
        queue_id: &QueueId,
        operator: &str,
        minutes: i64,
    ) -> Result<Queue> {
        service_time::execute(self.deps(), queue_id, operator, minutes).await
    }
}
