//! Short-code allocation.
//!
//! This crate turns a raw URL (plus an optional custom code and owner) into
//! a persisted [`ShortLink`](pinhole_core::ShortLink). Random codes come
//! from a [`Generator`](pinhole_generator::Generator); collisions are
//! retried a bounded number of times.

pub mod error;
pub mod service;
pub mod shortener;

pub use error::ShortenerError;
pub use service::{ShortenerService, ShortenerSettings, DEFAULT_MAX_ATTEMPTS};
pub use shortener::{ShortenParams, Shortener};
