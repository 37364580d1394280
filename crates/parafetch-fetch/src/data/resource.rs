use std::path::{Path, PathBuf};

/// Raw response headers of a metadata-only request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadInfo {
    pub content_length:      Option<u64>,
    pub accept_ranges:       Option<String>,
    pub content_disposition: Option<String>,
}

/// What probing tells us about a remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub total_len:      u64,
    pub supports_range: bool,
    pub suggested_name: Option<String>,
}

/// A probed resource bound to its destination. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    url:            String,
    total_len:      u64,
    supports_range: bool,
    destination:    PathBuf,
}

impl DownloadJob {
    pub fn new(url: impl Into<String>, info: &ResourceInfo, destination: impl Into<PathBuf>) -> Self {
        Self {
            url:            url.into(),
            total_len:      info.total_len,
            supports_range: info.supports_range,
            destination:    destination.into(),
        }
    }

    pub fn url(&self) -> &str { &self.url }

    pub fn total_len(&self) -> u64 { self.total_len }

    pub fn supports_range(&self) -> bool { self.supports_range }

    pub fn destination(&self) -> &Path { &self.destination }
}
