// SQLite User Directory

use crate::error::map_sqlx_error;
use crate::queries::{SELECT_PROFILE, SELECT_PROFILE_BY_SHORT_ID};
use crate::rows::ProfileRow;
use crate::SqliteQueueStore;
use async_trait::async_trait;
use dontq_core::domain::UserProfile;
use dontq_core::error::Result;
use dontq_core::port::UserDirectory;

#[async_trait]
impl UserDirectory for SqliteQueueStore {
    async fn find_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(UserProfile::from))
    }

    async fn find_profile_by_short_id(&self, short_id: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE_BY_SHORT_ID)
            .bind(short_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(UserProfile::from))
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserProfile> {
        // short_id and created_at are fixed on first insert
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO user_profiles (user_id, name, phone_number, short_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                name = excluded.name,
                phone_number = excluded.phone_number,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(&profile.user_id)
        .bind(&profile.name)
        .bind(&profile.phone_number)
        .bind(&profile.short_id)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(UserProfile::from(row))
    }
}
