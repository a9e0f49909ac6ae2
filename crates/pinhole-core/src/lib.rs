//! Core types and traits for the Pinhole URL shortener.
//!
//! This crate provides the shared vocabulary used by the allocation
//! (shortener) and resolution (redirector) services: validated short codes,
//! normalized target URLs, the persisted [`ShortLink`] record and the
//! repository contract every storage backend implements.

pub mod error;
pub mod normalize;
pub mod repository;
pub mod shortcode;

pub use error::{CoreError, ErrorKind, StorageError};
pub use normalize::{normalize, NormalizedUrl};
pub use repository::{
    LinkId, LinkPage, LinkQuery, NewShortLink, ReadRepository, Repository, ShortLink,
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use shortcode::ShortCode;
