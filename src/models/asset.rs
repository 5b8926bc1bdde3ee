use base64::{Engine, engine::general_purpose::STANDARD};
use std::sync::Arc;

/// Shared handle to a fetched asset. Every load of the same locator returns
/// a clone of the same `Arc`.
pub type AssetHandle = Arc<Asset>;

/// A remote image materialised as a self-contained `data:` URL.
#[derive(Debug, PartialEq, Eq)]
pub struct Asset {
    pub locator: String,
    pub content_type: String,
    pub data_url: String,
    pub byte_len: usize,
}

impl Asset {
    pub fn from_bytes(
        locator: impl Into<String>,
        content_type: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        let content_type = content_type.into();
        let data_url = format!("data:{};base64,{}", content_type, STANDARD.encode(bytes));
        Self {
            locator: locator.into(),
            content_type,
            data_url,
            byte_len: bytes.len(),
        }
    }
}
