use std::sync::Arc;

use pinhole_core::{ReadRepository, Repository, ShortCode};
use pinhole_generator::Generator;
use pinhole_redirector::{Redirector, RedirectorService};
use pinhole_shortener::{Shortener, ShortenerService, ShortenerSettings};

/// Services shared by all request handlers.
///
/// The shortener, the redirector and the read-only lookups all sit on the
/// same repository handle.
#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    redirector: Arc<dyn Redirector>,
    links: Arc<dyn ReadRepository>,
    base_url: String,
}

impl AppState {
    pub fn new<R: Repository, G: Generator>(
        repository: Arc<R>,
        generator: G,
        settings: ShortenerSettings,
        public_base_url: impl Into<String>,
    ) -> Self {
        let shortener =
            ShortenerService::with_settings(Arc::clone(&repository), generator, settings);
        let redirector = RedirectorService::new(Arc::clone(&repository));

        Self {
            shortener: Arc::new(shortener),
            redirector: Arc::new(redirector),
            links: repository,
            base_url: public_base_url.into(),
        }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn redirector(&self) -> &dyn Redirector {
        self.redirector.as_ref()
    }

    pub fn links(&self) -> &dyn ReadRepository {
        self.links.as_ref()
    }

    /// Public URL that redirects to the target of `code`.
    pub fn short_url(&self, code: &ShortCode) -> String {
        code.to_url(&format!("{}/r", self.base_url.trim_end_matches('/')))
    }
}
