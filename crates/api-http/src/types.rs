//! HTTP Request and Response Types

use dontq_core::application::{DepartureOutcome, JoinOutcome};
use dontq_core::domain::{DepartureReason, Queue, QueueEntry};
use dontq_core::port::QueueFilter;
use serde::{Deserialize, Serialize};

/// `GET /queues` query
#[derive(Debug, Default, Deserialize)]
pub struct ListQueuesParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl From<ListQueuesParams> for QueueFilter {
    fn from(p: ListQueuesParams) -> Self {
        QueueFilter {
            category: p.category,
            search: p.search,
            limit: p.limit,
        }
    }
}

/// `GET /queues/{id}/archive` query
#[derive(Debug, Default, Deserialize)]
pub struct ArchiveParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddKnownRequest {
    pub short_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ServiceTimeRequest {
    #[serde(alias = "estTimeToServe")]
    pub est_time_to_serve: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub message: &'static str,
    pub queue_entry: QueueEntry,
    pub updated_queue: Queue,
    pub user_position: i64,
    pub est_wait_time: i64,
}

impl From<JoinOutcome> for JoinResponse {
    fn from(outcome: JoinOutcome) -> Self {
        Self {
            message: "Successfully joined the queue",
            queue_entry: outcome.entry,
            updated_queue: outcome.queue,
            user_position: outcome.position,
            est_wait_time: outcome.estimated_wait_time,
        }
    }
}

/// Queue aggregates after a departure
#[derive(Debug, Serialize)]
pub struct DepartureResponse {
    pub message: &'static str,
    pub current_queue: i64,
    pub total_served: i64,
    pub total_estimated_time: i64,
}

impl From<DepartureOutcome> for DepartureResponse {
    fn from(outcome: DepartureOutcome) -> Self {
        let message = match outcome.reason {
            DepartureReason::Left => "Successfully left the queue",
            DepartureReason::NoShow => "Customer marked as no-show and removed from queue",
            DepartureReason::Served => "Customer marked as served",
        };
        Self {
            message,
            current_queue: outcome.current_queue,
            total_served: outcome.total_served,
            total_estimated_time: outcome.total_estimated_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
