// Profile Service - contact details and short ids

use crate::application::catalog::create::MAX_SHORT_ID_ATTEMPTS;
use crate::domain::profile::normalize_phone;
use crate::domain::UserProfile;
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TimeProvider, UserDirectory};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

const MAX_NAME_LEN: usize = 100;

/// Profile update; absent fields are left unchanged, empty strings clear
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Profile Service
pub struct ProfileService {
    directory: Arc<dyn UserDirectory>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ProfileService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            directory,
            id_provider,
            time_provider,
        }
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        self.directory
            .find_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No profile for user {}", user_id)))
    }

    /// Create or update the caller's profile
    ///
    /// A short id is assigned on first write and never changes afterwards.
    pub async fn upsert_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<UserProfile> {
        let name = clean_name(update.name)?;
        let phone_number = match update.phone_number.as_deref().map(str::trim) {
            None => None,
            Some("") => Some(None),
            Some(raw) => Some(Some(normalize_phone(raw)?)),
        };

        let now = self.time_provider.now_millis();
        let existing = self.directory.find_profile(user_id).await?;
        let is_new = existing.is_none();

        let mut profile = existing.unwrap_or_else(|| UserProfile {
            user_id: user_id.to_string(),
            name: None,
            phone_number: None,
            short_id: self.id_provider.generate_short_id().as_str().to_string(),
            created_at: now,
            updated_at: now,
        });
        if let Some(name) = name {
            profile.name = name;
        }
        if let Some(phone_number) = phone_number {
            profile.phone_number = phone_number;
        }
        profile.updated_at = now;

        for attempt in 1..=MAX_SHORT_ID_ATTEMPTS {
            match self.directory.upsert_profile(&profile).await {
                Ok(stored) => {
                    info!(
                        user_id = %user_id,
                        short_id = %stored.short_id,
                        created = is_new,
                        "Profile saved"
                    );
                    return Ok(stored);
                }
                Err(AppError::Conflict(msg)) if is_new => {
                    warn!(
                        short_id = %profile.short_id,
                        attempt = attempt,
                        error = %msg,
                        "Short id collision, drawing another"
                    );
                    profile.short_id = self.id_provider.generate_short_id().as_str().to_string();
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Internal(format!(
            "Could not allocate a unique short id after {} attempts",
            MAX_SHORT_ID_ATTEMPTS
        )))
    }
}

/// `None` leaves the name alone, `Some(None)` clears it
fn clean_name(name: Option<String>) -> Result<Option<Option<String>>> {
    let Some(name) = name else {
        return Ok(None);
    };
    let name = name.trim();
    if name.is_empty() {
        return Ok(Some(None));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Name too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }
    Ok(Some(Some(name.to_string())))
}
