use jiff::Timestamp;
use pinhole_core::{ErrorKind, LinkId, LinkQuery, ShortLink, DEFAULT_PAGE_LIMIT};
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/urls`. The owner comes from the identity header, so
/// any other field, `owner_id` included, is rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUrlRequest {
    pub url: String,
    #[serde(default)]
    pub custom_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateUrlResponse {
    pub id: LinkId,
    pub code: String,
    pub short_url: String,
    pub target_url: String,
    pub owner_id: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUrlsParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_LIMIT
}

impl From<ListUrlsParams> for LinkQuery {
    fn from(params: ListUrlsParams) -> Self {
        LinkQuery {
            search: params.search,
            offset: params.offset,
            limit: params.limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListUrlsResponse {
    pub links: Vec<ShortLink>,
    pub total: u64,
}
