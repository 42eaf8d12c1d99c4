use std::path::Path;

use anyhow::Result;
use tokio::fs;

/// Decodes file bytes as UTF-8, falling back to Latin-1 where every byte maps
/// to the code point of the same value.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|byte| char::from(*byte)).collect(),
    }
}

pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}
