use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use jiff::Timestamp;
use pinhole_core::repository::{ReadRepository, Repository, Result};
use pinhole_core::{
    LinkId, LinkPage, LinkQuery, NewShortLink, NormalizedUrl, ShortCode, ShortLink, StorageError,
};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// In-memory storage entry for a short link.
#[derive(Debug)]
struct Entry {
    id: LinkId,
    target_url: NormalizedUrl,
    owner_id: Option<String>,
    created_at: Timestamp,
    clicks: AtomicU64,
}

impl Entry {
    fn from_link(link: &ShortLink) -> Self {
        Self {
            id: link.id,
            target_url: link.target_url.clone(),
            owner_id: link.owner_id.clone(),
            created_at: link.created_at,
            clicks: AtomicU64::new(link.click_count),
        }
    }

    fn to_link(&self, code: &str) -> ShortLink {
        ShortLink {
            id: self.id,
            code: ShortCode::new_unchecked(code),
            target_url: self.target_url.clone(),
            owner_id: self.owner_id.clone(),
            click_count: self.clicks.load(Ordering::Relaxed),
            created_at: self.created_at,
        }
    }
}

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Inserts go through the entry API, which holds
/// the shard's write lock across the existence check and the insert.
#[derive(Debug)]
pub struct InMemoryRepository {
    storage: DashMap<String, Entry>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        let key = code.as_str();
        Ok(self.storage.get(key).map(|entry| entry.to_link(key)))
    }

    async fn list(&self, query: &LinkQuery) -> Result<LinkPage> {
        let mut matching: Vec<ShortLink> = self
            .storage
            .iter()
            .map(|item| item.value().to_link(item.key()))
            .filter(|link| query.matches(link))
            .collect();

        matching.sort_by(|a, b| {
            Reverse(a.created_at)
                .cmp(&Reverse(b.created_at))
                .then_with(|| a.code.as_str().cmp(b.code.as_str()))
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.effective_limit()).unwrap_or(usize::MAX);
        let links = matching.into_iter().skip(offset).take(limit).collect();

        Ok(LinkPage { links, total })
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert_if_absent(&self, link: NewShortLink) -> Result<ShortLink> {
        match self.storage.entry(link.code.as_str().to_owned()) {
            MapEntry::Occupied(_) => Err(StorageError::Conflict(link.code.into_inner())),
            MapEntry::Vacant(slot) => {
                let stored = link.into_link(LinkId::new(), Timestamp::now());
                slot.insert(Entry::from_link(&stored));
                trace!(code = %stored.code, "inserted short link");
                Ok(stored)
            }
        }
    }

    async fn increment_clicks(&self, code: &ShortCode) -> Result<()> {
        if let Some(entry) = self.storage.get(code.as_str()) {
            entry.clicks.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}
