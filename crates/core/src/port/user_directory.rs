// User Directory Port

use crate::domain::UserProfile;
use crate::error::Result;
use async_trait::async_trait;

/// Profile storage
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;

    async fn find_profile_by_short_id(&self, short_id: &str) -> Result<Option<UserProfile>>;

    /// Insert or update a profile, returning the stored row
    ///
    /// An existing row keeps its short id and creation time. Fails with
    /// `AppError::Conflict` if the short id belongs to another user.
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserProfile>;
}
