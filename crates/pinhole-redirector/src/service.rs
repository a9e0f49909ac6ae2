use std::sync::Arc;

use crate::error::{RedirectorError, Result};
use crate::redirector::Redirector;
use async_trait::async_trait;
use pinhole_core::{NormalizedUrl, Repository, ShortCode};
use tokio::runtime::Handle;
use tracing::{debug, instrument, trace, warn};

/// Service for handling URL redirects.
///
/// Looks up the target of a short code and bumps its click counter as a
/// detached task, so the redirect never waits on the counter write.
#[derive(Debug)]
pub struct RedirectorService<R> {
    repository: Arc<R>,
}

impl<R> Clone for RedirectorService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: Repository> RedirectorService<R> {
    /// Creates a new RedirectorService backed by the given repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Schedules a click increment for `code` without awaiting it.
    fn record_click(&self, code: ShortCode) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(code = %code, "no async runtime available, click not recorded");
            return;
        };

        let repository = Arc::clone(&self.repository);
        runtime.spawn(async move {
            match repository.increment_clicks(&code).await {
                Ok(()) => trace!(code = %code, "recorded click"),
                Err(e) => warn!(code = %code, error = %e, "failed to record click"),
            }
        });
    }
}

#[async_trait]
impl<R: Repository> Redirector for RedirectorService<R> {
    #[instrument(skip(self))]
    async fn resolve(&self, code: &str) -> Result<NormalizedUrl> {
        // A code that fails validation was never stored.
        let Ok(short_code) = ShortCode::new(code) else {
            trace!("malformed short code");
            return Err(RedirectorError::NotFound(code.to_string()));
        };

        match self.repository.find_by_code(&short_code).await? {
            Some(link) => {
                debug!(url = %link.target_url, "resolved short code");
                self.record_click(short_code);
                Ok(link.target_url)
            }
            None => {
                trace!("short code not found");
                Err(RedirectorError::NotFound(code.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use awaitility::at_most;
    use pinhole_core::repository::Result as StorageResult;
    use pinhole_core::{
        LinkPage, LinkQuery, NewShortLink, ReadRepository, ShortLink, StorageError,
    };
    use pinhole_storage::InMemoryRepository;
    use std::time::Duration;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    async fn setup_with_link(
        c: &str,
        url: &str,
    ) -> (RedirectorService<InMemoryRepository>, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        repo.insert_if_absent(NewShortLink {
            code: code(c),
            target_url: NormalizedUrl::new_unchecked(url),
            owner_id: None,
        })
        .await
        .unwrap();
        (RedirectorService::new(Arc::clone(&repo)), repo)
    }

    async fn wait_for_clicks(repo: &Arc<InMemoryRepository>, c: &str, expected: u64) {
        let repo = Arc::clone(repo);
        let c = code(c);
        at_most(Duration::from_secs(5))
            .poll_interval(Duration::from_millis(10))
            .until_async(move || {
                let repo = Arc::clone(&repo);
                let c = c.clone();
                async move {
                    let link = repo.find_by_code(&c).await.unwrap().unwrap();
                    link.click_count == expected
                }
            })
            .await;
    }

    /// Lookups work, click increments always fail.
    struct BrokenCounterRepository {
        inner: InMemoryRepository,
    }

    #[async_trait]
    impl ReadRepository for BrokenCounterRepository {
        async fn find_by_code(&self, code: &ShortCode) -> StorageResult<Option<ShortLink>> {
            self.inner.find_by_code(code).await
        }

        async fn list(&self, query: &LinkQuery) -> StorageResult<LinkPage> {
            self.inner.list(query).await
        }
    }

    #[async_trait]
    impl Repository for BrokenCounterRepository {
        async fn insert_if_absent(&self, link: NewShortLink) -> StorageResult<ShortLink> {
            self.inner.insert_if_absent(link).await
        }

        async fn increment_clicks(&self, _code: &ShortCode) -> StorageResult<()> {
            Err(StorageError::Unavailable("counter store down".into()))
        }
    }

    /// Every operation fails.
    struct UnavailableRepository;

    #[async_trait]
    impl ReadRepository for UnavailableRepository {
        async fn find_by_code(&self, _code: &ShortCode) -> StorageResult<Option<ShortLink>> {
            Err(StorageError::Unavailable("down".into()))
        }

        async fn list(&self, _query: &LinkQuery) -> StorageResult<LinkPage> {
            Err(StorageError::Unavailable("down".into()))
        }
    }

    #[async_trait]
    impl Repository for UnavailableRepository {
        async fn insert_if_absent(&self, _link: NewShortLink) -> StorageResult<ShortLink> {
            Err(StorageError::Unavailable("down".into()))
        }

        async fn increment_clicks(&self, _code: &ShortCode) -> StorageResult<()> {
            Err(StorageError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn resolve_existing_code() {
        let (service, _repo) = setup_with_link("abc123", "https://example.com").await;

        let url = service.resolve("abc123").await.unwrap();
        assert_eq!(url.as_str(), "https://example.com");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn resolve_counts_click() {
        let (service, repo) = setup_with_link("abc123", "https://example.com").await;

        service.resolve("abc123").await.unwrap();

        wait_for_clicks(&repo, "abc123", 1).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn repeated_resolution_returns_same_target() {
        let (service, repo) = setup_with_link("abc123", "https://example.com/a?b=c").await;

        for _ in 0..10 {
            let url = service.resolve("abc123").await.unwrap();
            assert_eq!(url.as_str(), "https://example.com/a?b=c");
        }

        wait_for_clicks(&repo, "abc123", 10).await;
    }

    #[tokio::test]
    async fn resolve_nonexistent_code() {
        let (service, repo) = setup_with_link("abc123", "https://example.com").await;

        let err = service.resolve("doesnotexist").await.unwrap_err();
        assert!(matches!(err, RedirectorError::NotFound(ref c) if c == "doesnotexist"));

        tokio::time::sleep(Duration::from_millis(50)).await;
        let link = repo.find_by_code(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(link.click_count, 0);
    }

    #[tokio::test]
    async fn resolve_malformed_code_is_not_found() {
        let service = RedirectorService::new(Arc::new(UnavailableRepository));

        // Never reaches the (broken) repository.
        let err = service.resolve("not/a/code").await.unwrap_err();
        assert!(matches!(err, RedirectorError::NotFound(_)));

        let err = service.resolve("").await.unwrap_err();
        assert!(matches!(err, RedirectorError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_click_increment_does_not_fail_redirect() {
        let inner = InMemoryRepository::new();
        inner
            .insert_if_absent(NewShortLink {
                code: code("abc123"),
                target_url: NormalizedUrl::new_unchecked("https://example.com"),
                owner_id: None,
            })
            .await
            .unwrap();
        let service = RedirectorService::new(Arc::new(BrokenCounterRepository { inner }));

        let url = service.resolve("abc123").await.unwrap();
        assert_eq!(url.as_str(), "https://example.com");
    }

    #[tokio::test]
    async fn lookup_failure_is_propagated() {
        let service = RedirectorService::new(Arc::new(UnavailableRepository));

        let err = service.resolve("abc123").await.unwrap_err();
        assert!(matches!(
            err,
            RedirectorError::Storage(StorageError::Unavailable(_))
        ));
    }
}
