// ID Provider Port (for deterministic testing)

use crate::domain::ShortId;
use rand::Rng;

/// ID provider interface (allows deterministic IDs in tests)
pub trait IdProvider: Send + Sync {
    /// Generate a new unique record ID
    fn generate_id(&self) -> String;

    /// Generate a 6-digit public code (uniqueness is checked by the caller)
    fn generate_short_id(&self) -> ShortId;
}

/// UUID v4 provider (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn generate_short_id(&self) -> ShortId {
        ShortId::from_number(rand::thread_rng().gen_range(0..1_000_000))
    }
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

    /// Deterministic provider: ids `id-1`, `id-2`, ... and short ids
    /// `100001`, `100002`, ...
    pub struct SequentialIdProvider {
        next_id: AtomicU64,
        next_short: AtomicU32,
    }

    impl SequentialIdProvider {
        pub fn new() -> Self {
            Self {
                next_id: AtomicU64::new(1),
                next_short: AtomicU32::new(100_001),
            }
        }
    }

    impl Default for SequentialIdProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdProvider for SequentialIdProvider {
        fn generate_id(&self) -> String {
            format!("id-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
        }

        fn generate_short_id(&self) -> ShortId {
            ShortId::from_number(self.next_short.fetch_add(1, Ordering::SeqCst))
        }
    }

    /// Always hands out the same short id (for collision tests)
    pub struct FixedShortIdProvider {
        inner: SequentialIdProvider,
        short_id: ShortId,
    }

    impl FixedShortIdProvider {
        pub fn new(short_id: ShortId) -> Self {
            Self {
                inner: SequentialIdProvider::new(),
                short_id,
            }
        }
    }

    impl IdProvider for FixedShortIdProvider {
        fn generate_id(&self) -> String {
            self.inner.generate_id()
        }

        fn generate_short_id(&self) -> ShortId {
            self.short_id.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::SequentialIdProvider;
    use super::*;

    #[test]
    fn test_uuid_provider_short_id_is_valid() {
        let provider = UuidProvider;
        for _ in 0..100 {
            let short = provider.generate_short_id();
            assert!(ShortId::parse(short.as_str()).is_ok());
        }
        assert_ne!(provider.generate_id(), provider.generate_id());
    }

    #[test]
    fn test_sequential_provider() {
        let provider = SequentialIdProvider::new();
        assert_eq!(provider.generate_id(), "id-1");
        assert_eq!(provider.generate_id(), "id-2");
        assert_eq!(provider.generate_short_id().as_str(), "100001");
    }
}
