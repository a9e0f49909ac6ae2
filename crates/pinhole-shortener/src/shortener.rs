use crate::error::Result;
use async_trait::async_trait;
use pinhole_core::ShortLink;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortenParams {
    /// The URL as the user typed it; normalized before storing.
    pub raw_url: String,
    /// Optional custom code. An empty string counts as absent.
    pub custom_code: Option<String>,
    /// Identity of the requesting user, if signed in.
    pub owner_id: Option<String>,
}

impl ShortenParams {
    pub fn new(raw_url: impl Into<String>) -> Self {
        Self {
            raw_url: raw_url.into(),
            ..Self::default()
        }
    }

    pub fn with_custom_code(mut self, code: impl Into<String>) -> Self {
        self.custom_code = Some(code.into());
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a short link for the given URL and returns the persisted record.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortLink>;
}
