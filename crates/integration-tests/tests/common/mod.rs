//! Shared fixtures: full services over a real SQLite store

#![allow(dead_code)]

use dontq_core::application::{
    CatalogService, CreateQueueRequest, ProfileService, ProfileUpdate, RosterService,
};
use dontq_core::domain::{Queue, UserProfile};
use dontq_core::port::id_provider::mocks::SequentialIdProvider;
use dontq_core::port::time_provider::mocks::ManualClock;
use dontq_core::port::IdProvider;
use dontq_infra_sqlite::{create_pool, run_migrations, SqliteQueueStore};
use std::sync::Arc;
use tempfile::TempDir;

pub const OWNER: &str = "owner-1";
pub const START_MILLIS: i64 = 1_700_000_000_000;

pub struct Harness {
    pub store: Arc<SqliteQueueStore>,
    pub clock: Arc<ManualClock>,
    pub catalog: CatalogService,
    pub roster: Arc<RosterService>,
    pub profiles: ProfileService,
    _dir: Option<TempDir>,
}

impl Harness {
    pub async fn in_memory() -> Self {
        Self::build("sqlite::memory:", None, Arc::new(SequentialIdProvider::new())).await
    }

    /// File-backed database, for tests with concurrent writers
    pub async fn on_disk() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dontq.db");
        Self::build(
            path.to_str().unwrap(),
            Some(dir),
            Arc::new(SequentialIdProvider::new()),
        )
        .await
    }

    pub async fn with_ids(ids: Arc<dyn IdProvider>) -> Self {
        Self::build("sqlite::memory:", None, ids).await
    }

    async fn build(url: &str, dir: Option<TempDir>, ids: Arc<dyn IdProvider>) -> Self {
        let pool = create_pool(url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = Arc::new(SqliteQueueStore::new(pool));
        let clock = Arc::new(ManualClock::new(START_MILLIS));

        Self {
            catalog: CatalogService::new(store.clone(), ids.clone(), clock.clone()),
            roster: Arc::new(RosterService::new(store.clone(), ids.clone(), clock.clone())),
            profiles: ProfileService::new(store.clone(), ids, clock.clone()),
            store,
            clock,
            _dir: dir,
        }
    }

    pub async fn queue(&self, max_capacity: i64, minutes: i64) -> Queue {
        self.catalog
            .create(
                OWNER,
                CreateQueueRequest {
                    name: "City Clinic".to_string(),
                    max_capacity,
                    est_time_to_serve: minutes,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    /// Profile with a phone number, so the user receives messages
    pub async fn register(&self, user_id: &str, phone: &str) -> UserProfile {
        self.profiles
            .upsert_profile(
                user_id,
                ProfileUpdate {
                    name: Some(user_id.to_string()),
                    phone_number: Some(phone.to_string()),
                },
            )
            .await
            .unwrap()
    }

    /// Drop a table behind the services' back, so writes to it fail
    pub async fn break_table(&self, table: &str) {
        sqlx::query(&format!("DROP TABLE {}", table))
            .execute(self.store.pool())
            .await
            .unwrap();
    }

    /// Join `count` users named `user-1`, `user-2`, ...
    pub async fn fill(&self, queue: &Queue, count: usize) {
        for i in 1..=count {
            self.roster
                .join(&queue.id, &format!("user-{}", i))
                .await
                .unwrap();
        }
    }
}
