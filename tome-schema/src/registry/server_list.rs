use serde::{Deserialize, Serialize};

/// Page size the registry UI requests; also reported by the empty result.
pub const DEFAULT_PAGE_SIZE: u32 = 24;

/// `GET /servers` response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerList {
    #[serde(default)]
    pub servers: Vec<CompactServer>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl ServerList {
    /// The "nothing found" shape, used when the registry answers with an absent or
    /// unparseable body.
    pub fn empty(page_size: u32) -> Self {
        Self {
            servers: Vec::new(),
            pagination: Pagination::empty(page_size),
        }
    }
}

impl Default for ServerList {
    fn default() -> Self {
        Self::empty(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

impl Pagination {
    /// First page of nothing.
    pub fn empty(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size,
            total_pages: 0,
            total_count: 0,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::empty(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactServer {
    pub qualified_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub use_count: u64,
    #[serde(default)]
    pub is_deployed: bool,
    #[serde(default)]
    pub created_at: String,
}
