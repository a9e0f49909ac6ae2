use crate::error::{Result, ShortenerError};
use crate::shortener::{ShortenParams, Shortener};
use async_trait::async_trait;
use pinhole_core::{
    normalize, NewShortLink, NormalizedUrl, Repository, ShortCode, ShortLink, StorageError,
};
use pinhole_generator::Generator;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Tuning knobs for [`ShortenerService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct ShortenerSettings {
    /// How many generated codes to try before giving up. Values below 1
    /// are treated as 1.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - URL normalization
/// - Custom code validation
/// - Generated codes, retried on collision up to `max_attempts` times
///
/// Uniqueness is decided by [`Repository::insert_if_absent`]; the service
/// never checks for existence before inserting.
#[derive(Debug)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    settings: ShortenerSettings,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            settings: self.settings,
        }
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a service with the default settings.
    pub fn new(repository: Arc<R>, generator: G) -> Self {
        Self::with_settings(repository, generator, ShortenerSettings::default())
    }

    pub fn with_settings(repository: Arc<R>, generator: G, settings: ShortenerSettings) -> Self {
        Self {
            repository,
            generator: Arc::new(generator),
            settings: ShortenerSettings {
                max_attempts: settings.max_attempts.max(1),
            },
        }
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    async fn insert_custom(
        &self,
        code: ShortCode,
        target_url: NormalizedUrl,
        owner_id: Option<String>,
    ) -> Result<ShortLink> {
        let link = NewShortLink {
            code,
            target_url,
            owner_id,
        };

        match self.repository.insert_if_absent(link).await {
            Ok(link) => Ok(link),
            Err(StorageError::Conflict(code)) => Err(ShortenerError::CustomCodeTaken(code)),
            Err(e) => Err(ShortenerError::Storage(e)),
        }
    }

    async fn insert_generated(
        &self,
        target_url: NormalizedUrl,
        owner_id: Option<String>,
    ) -> Result<ShortLink> {
        let max_attempts = self.settings.max_attempts;

        for attempt in 1..=max_attempts {
            let code: ShortCode = self.generator.generate().into();
            let link = NewShortLink {
                code,
                target_url: target_url.clone(),
                owner_id: owner_id.clone(),
            };

            match self.repository.insert_if_absent(link).await {
                Ok(link) => return Ok(link),
                Err(StorageError::Conflict(code)) => {
                    warn!(code = %code, attempt, max_attempts, "generated short code collided");
                }
                Err(e) => return Err(ShortenerError::Storage(e)),
            }
        }

        Err(ShortenerError::ExhaustedRetries {
            attempts: max_attempts,
        })
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    #[instrument(skip_all, fields(custom = params.custom_code.is_some()))]
    async fn shorten(&self, params: ShortenParams) -> Result<ShortLink> {
        let target_url = normalize(&params.raw_url)?;

        let custom_code = params.custom_code.filter(|code| !code.is_empty());

        let link = match custom_code {
            Some(code) => {
                let code = ShortCode::new(code)?;
                self.insert_custom(code, target_url, params.owner_id).await?
            }
            None => self.insert_generated(target_url, params.owner_id).await?,
        };

        debug!(code = %link.code, url = %link.target_url, "created short link");
        Ok(link)
    }
}
