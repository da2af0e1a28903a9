//! Snapshot Module
//!
//! Text form of the cache used for persistence. Content is carried as
//! standard base64 inside a versioned JSON document:
//!
//! ```json
//! { "version": 1, "entries": [ { "source_url": "...", "content": "...",
//!   "created_at": 0, "expires_at": 0 } ] }
//! ```

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::CachedImage;

/// Current snapshot layout. Snapshots with any other version are ignored.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    source_url: String,
    content: String,
    created_at: u64,
    expires_at: u64,
}

#[derive(Serialize)]
struct SnapshotOut {
    version: u32,
    entries: Vec<PersistedEntry>,
}

// Entries stay as raw JSON here so one bad entry cannot sink the rest.
#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    #[serde(default)]
    entries: Vec<serde_json::Value>,
}

impl From<&CachedImage> for PersistedEntry {
    fn from(image: &CachedImage) -> Self {
        Self {
            source_url: image.source_url.clone(),
            content: general_purpose::STANDARD.encode(&image.content),
            created_at: image.created_at,
            expires_at: image.expires_at,
        }
    }
}

impl TryFrom<PersistedEntry> for CachedImage {
    type Error = base64::DecodeError;

    fn try_from(entry: PersistedEntry) -> Result<Self, Self::Error> {
        let content = general_purpose::STANDARD.decode(entry.content)?;
        Ok(CachedImage {
            source_url: entry.source_url,
            content: Bytes::from(content),
            created_at: entry.created_at,
            expires_at: entry.expires_at,
        })
    }
}

// == Encode ==
/// Serializes entries into the persisted text form.
pub fn encode<'a>(entries: impl IntoIterator<Item = &'a CachedImage>) -> serde_json::Result<String> {
    let snapshot = SnapshotOut {
        version: SNAPSHOT_VERSION,
        entries: entries.into_iter().map(PersistedEntry::from).collect(),
    };
    serde_json::to_string(&snapshot)
}

// == Decode ==
/// Parses a persisted snapshot.
///
/// Never fails: an unparsable document or a foreign version yields no
/// entries, and individual entries that do not decode are skipped.
pub fn decode(raw: &str) -> Vec<CachedImage> {
    let snapshot: SnapshotIn = match serde_json::from_str(raw) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(error = %err, "Persisted image cache is unreadable, starting empty");
            return Vec::new();
        }
    };

    if snapshot.version != SNAPSHOT_VERSION {
        warn!(
            found = snapshot.version,
            expected = SNAPSHOT_VERSION,
            "Persisted image cache has a different version, ignoring it"
        );
        return Vec::new();
    }

    let total = snapshot.entries.len();
    let images: Vec<CachedImage> = snapshot
        .entries
        .into_iter()
        .filter_map(|value| {
            let entry: PersistedEntry = serde_json::from_value(value)
                .map_err(|err| warn!(error = %err, "Skipping malformed cache entry"))
                .ok()?;
            let url = entry.source_url.clone();
            CachedImage::try_from(entry)
                .map_err(|err| warn!(url = %url, error = %err, "Skipping cache entry with bad content"))
                .ok()
        })
        .collect();

    if images.len() < total {
        warn!(skipped = total - images.len(), "Some persisted cache entries were dropped");
    }

    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn image(url: &str, body: &'static [u8], at: u64) -> CachedImage {
        CachedImage::new(url, Bytes::from_static(body), at, Duration::from_secs(60))
    }

    #[test]
    fn test_encode_then_decode_keeps_entries() {
        let images = vec![image("https://a/1.jpg", b"\x00\xffbinary", 10), image("https://a/2.jpg", b"two", 20)];

        let raw = encode(&images).unwrap();
        assert!(raw.contains("\"version\":1"));

        assert_eq!(decode(&raw), images);
    }

    #[test]
    fn test_decode_garbage_is_empty() {
        assert!(decode("not json at all").is_empty());
        assert!(decode("").is_empty());
        assert!(decode("[1,2,3]").is_empty());
    }

    #[test]
    fn test_decode_other_version_is_empty() {
        let raw = r#"{"version":2,"entries":[{"source_url":"u","content":"aGk=","created_at":0,"expires_at":10}]}"#;
        assert!(decode(raw).is_empty());
    }

    #[test]
    fn test_decode_skips_bad_entries() {
        let raw = r#"{"version":1,"entries":[
            {"source_url":"good","content":"aGk=","created_at":0,"expires_at":10},
            {"source_url":"bad-base64","content":"@@@","created_at":0,"expires_at":10},
            {"unexpected":"shape"},
            42
        ]}"#;

        let images = decode(raw);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].source_url, "good");
        assert_eq!(&images[0].content[..], b"hi");
    }
}
