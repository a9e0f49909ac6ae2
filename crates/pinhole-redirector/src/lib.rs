//! Redirect resolution.
//!
//! [`RedirectorService`] maps a short code back to its target URL and
//! records the click in the background. Click counts are advisory: a
//! failed increment is logged and never fails the redirect.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pinhole_redirector::{Redirector, RedirectorService};
//! use pinhole_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RedirectorService::new(Arc::new(InMemoryRepository::new()));
//!
//! match service.resolve("abc123").await {
//!     Ok(url) => println!("Redirect to: {}", url),
//!     Err(e) => println!("{}", e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod redirector;
pub mod service;

pub use error::{RedirectorError, Result};
pub use redirector::Redirector;
pub use service::RedirectorService;
