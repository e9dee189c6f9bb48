use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use snip_core::repository::{ReadRepository, Repository, Result, UrlMapping};
use snip_core::{ShortCode, StorageError};
use std::sync::Arc;

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<DashMap<String, String>>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Arc::new(DashMap::with_capacity(capacity)),
        }
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<String>> {
        Ok(self
            .storage
            .get(code.as_str())
            .map(|entry| entry.value().clone()))
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.contains_key(code.as_str()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, mapping: &UrlMapping) -> Result<()> {
        // The entry guard holds the shard lock, so check-and-insert is atomic.
        match self.storage.entry(mapping.short_code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(mapping.short_code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(mapping.long_url.clone());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn mapping(c: &str, url: &str) -> UrlMapping {
        UrlMapping {
            short_code: code(c),
            long_url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_get() {
        let repo = InMemoryRepository::new();

        repo.insert(&mapping("abc123", "https://example.com"))
            .await
            .unwrap();

        let result = repo.get(&code("abc123")).await.unwrap();
        assert_eq!(result.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let repo = InMemoryRepository::new();

        let result = repo.get(&code("nope")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn insert_conflict_keeps_original() {
        let repo = InMemoryRepository::new();

        repo.insert(&mapping("abc123", "https://example.com"))
            .await
            .unwrap();

        let err = repo
            .insert(&mapping("abc123", "https://other.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(ref c) if c == "abc123"));
        assert_eq!(
            repo.get(&code("abc123")).await.unwrap().as_deref(),
            Some("https://example.com")
        );
    }

    #[tokio::test]
    async fn keys_are_case_sensitive() {
        let repo = InMemoryRepository::new();

        repo.insert(&mapping("AbC123", "https://upper.example"))
            .await
            .unwrap();
        repo.insert(&mapping("abc123", "https://lower.example"))
            .await
            .unwrap();

        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn same_url_under_many_codes() {
        let repo = InMemoryRepository::new();

        repo.insert(&mapping("one111", "https://example.com"))
            .await
            .unwrap();
        repo.insert(&mapping("two222", "https://example.com"))
            .await
            .unwrap();

        assert!(repo.exists(&code("one111")).await.unwrap());
        assert!(repo.exists(&code("two222")).await.unwrap());
    }

    #[tokio::test]
    async fn exists_checks() {
        let repo = InMemoryRepository::new();

        assert!(!repo.exists(&code("abc123")).await.unwrap());

        repo.insert(&mapping("abc123", "https://example.com"))
            .await
            .unwrap();

        assert!(repo.exists(&code("abc123")).await.unwrap());
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let repo = InMemoryRepository::new();
        let other = repo.clone();

        repo.insert(&mapping("abc123", "https://example.com"))
            .await
            .unwrap();

        assert!(other.exists(&code("abc123")).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_inserts_of_one_code_admit_exactly_one() {
        let repo = InMemoryRepository::new();
        let mut handles = vec![];

        for i in 0..16u32 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.insert(&mapping("race00", &format!("https://example{}.com", i)))
                    .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => successes += 1,
                Err(err) => assert!(matches!(err, StorageError::Conflict(_))),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(repo.len(), 1);
    }
}
