use crate::error::StorageError;
use crate::normalize::NormalizedUrl;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Opaque identifier of a stored [`ShortLink`], assigned by the repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(Uuid);

impl LinkId {
    /// Creates a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LinkId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A persisted short link.
///
/// Everything except `click_count` is fixed once the record is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: LinkId,
    pub code: ShortCode,
    /// The normalized URL the code redirects to.
    pub target_url: NormalizedUrl,
    /// Identity of the creator as issued by the external identity provider.
    /// `None` for anonymous links.
    pub owner_id: Option<String>,
    pub click_count: u64,
    pub created_at: Timestamp,
}

/// The caller-supplied part of a [`ShortLink`].
///
/// The repository fills in `id`, `click_count` and `created_at` on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub code: ShortCode,
    pub target_url: NormalizedUrl,
    pub owner_id: Option<String>,
}

impl NewShortLink {
    /// Builds the full record as it is stored at creation time.
    pub fn into_link(self, id: LinkId, created_at: Timestamp) -> ShortLink {
        ShortLink {
            id,
            code: self.code,
            target_url: self.target_url,
            owner_id: self.owner_id,
            click_count: 0,
            created_at,
        }
    }
}

/// Page size used when a listing does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Largest page a single listing returns.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Filter and paging for [`ReadRepository::list`].
///
/// `search` is matched case-insensitively as a substring of either the
/// target URL or the code. Results are ordered newest first, ties broken by
/// code, and `offset`/`limit` select a window of that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkQuery {
    pub search: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

impl Default for LinkQuery {
    fn default() -> Self {
        Self {
            search: None,
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl LinkQuery {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_page(mut self, offset: u64, limit: u64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// The lowercased search term, or `None` when there is nothing to filter on.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    /// `limit` capped at [`MAX_PAGE_LIMIT`].
    pub fn effective_limit(&self) -> u64 {
        self.limit.min(MAX_PAGE_LIMIT)
    }

    /// Whether `link` passes the search filter.
    pub fn matches(&self, link: &ShortLink) -> bool {
        match self.search_term() {
            None => true,
            Some(term) => {
                link.target_url.as_str().to_lowercase().contains(&term)
                    || link.code.as_str().to_lowercase().contains(&term)
            }
        }
    }
}

/// One page of a listing plus the number of links matching the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPage {
    pub links: Vec<ShortLink>,
    pub total: u64,
}

/// A read-only view of a repository.
///
/// This trait provides only the read operations from [`Repository`],
/// for collaborators such as admin listings that never write.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the link stored under `code`.
    /// Returns `None` if the code does not exist.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<ShortLink>>;

    /// Lists stored links matching `query`, one page at a time.
    ///
    /// `total` counts every match, not just the returned page.
    async fn list(&self, query: &LinkQuery) -> Result<LinkPage>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Atomically inserts a new link unless its code is already taken.
    ///
    /// Returns `Err(StorageError::Conflict)` if the code exists. The check
    /// and the insert happen inside the backend, so of two concurrent
    /// callers with the same code exactly one succeeds.
    async fn insert_if_absent(&self, link: NewShortLink) -> Result<ShortLink>;

    /// Adds one to the click counter of `code`.
    ///
    /// Unknown codes are ignored. Callers treat the counter as advisory.
    async fn increment_clicks(&self, code: &ShortCode) -> Result<()>;
}
