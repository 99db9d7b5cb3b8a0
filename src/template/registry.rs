//! Tag catalog synchronization

use futures::future::try_join_all;

use crate::store::{StoreResult, TagCatalog};

/// Make sure every extracted tag exists in the catalog.
///
/// Each occurrence is ensured independently and all of them run
/// concurrently. The first failing store call fails the whole call; tags
/// created before it stay in the catalog. On success the names are handed
/// back unchanged, duplicates included.
pub async fn sync_tags<C>(catalog: &C, names: Vec<String>) -> StoreResult<Vec<String>>
where
    C: TagCatalog + ?Sized,
{
    try_join_all(names.iter().map(|name| catalog.ensure_tag(name))).await?;

    tracing::debug!(count = names.len(), "Tags synchronized with catalog");

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::store::{MemoryStore, StoreError, Tag};

    /// Catalog whose writes always fail
    struct UnavailableCatalog;

    #[async_trait]
    impl TagCatalog for UnavailableCatalog {
        async fn find_tag_by_name(&self, _name: &str) -> StoreResult<Option<Tag>> {
            Ok(None)
        }

        async fn create_tag(&self, _name: &str) -> StoreResult<Tag> {
            Err(StoreError::Unavailable("catalog offline".to_string()))
        }

        async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
            Ok(vec![])
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_sync_creates_missing_tags() {
        let store = MemoryStore::new();

        let synced = sync_tags(&store, names(&["name", "order_id"])).await.unwrap();
        assert_eq!(synced, vec!["name", "order_id"]);

        let labels: Vec<String> = store
            .list_tags()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.label)
            .collect();
        assert_eq!(labels.len(), 2);
        assert!(labels.contains(&"name".to_string()));
        assert!(labels.contains(&"order_id".to_string()));
    }

    #[tokio::test]
    async fn test_sync_returns_duplicates_but_catalog_dedups() {
        let store = MemoryStore::new();

        let synced = sync_tags(&store, names(&["a", "b", "a", "a"])).await.unwrap();
        assert_eq!(synced, vec!["a", "b", "a", "a"]);
        assert_eq!(store.list_tags().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let store = MemoryStore::new();

        sync_tags(&store, names(&["x", "y"])).await.unwrap();
        let before = store.list_tags().await.unwrap();

        sync_tags(&store, names(&["x", "y"])).await.unwrap();
        let after = store.list_tags().await.unwrap();

        assert_eq!(before.len(), after.len());
        assert_eq!(
            before.iter().map(|t| t.id).collect::<Vec<_>>(),
            after.iter().map(|t| t.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_sync_empty_is_noop() {
        let store = MemoryStore::new();

        let synced = sync_tags(&store, Vec::new()).await.unwrap();
        assert!(synced.is_empty());
        assert!(store.list_tags().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_propagates_store_failure() {
        let result = sync_tags(&UnavailableCatalog, names(&["name"])).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_concurrent_syncs_create_single_row() {
        let store = std::sync::Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { sync_tags(store.as_ref(), names(&["shared"])).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.list_tags().await.unwrap().len(), 1);
    }
}
