use crate::Result;
use async_trait::async_trait;
use pinhole_core::NormalizedUrl;

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to the URL it redirects to.
    /// Returns `Err(NotFound)` if the code does not exist.
    async fn resolve(&self, code: &str) -> Result<NormalizedUrl>;
}
