//! The row type produced by the record query engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A single row of the `record` table.
///
/// `uri` is the primary key; `cid` is unique system-wide (content
/// addressing — identical content produces identical `cid` regardless of
/// `uri`). `uri`, `cid`, `did`, `collection`, `rkey` are always non-empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub uri: String,
    pub cid: String,
    pub did: String,
    pub collection: String,
    pub json: JsonValue,
    pub indexed_at: DateTime<Utc>,
    pub rkey: String,
}

impl Record {
    /// Look up a dotted JSON path (`"user.name"`) inside `self.json`.
    ///
    /// Returns `None` if any segment is missing, mirroring the cursor
    /// stringification rule that a missing path renders as the literal
    /// string `"NULL"` rather than erroring.
    pub fn json_path(&self, path: &str) -> Option<&JsonValue> {
        let mut current = &self.json;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Record {
        Record {
            uri: "at://did:plc:abc/app.bsky.feed.post/1".into(),
            cid: "bafyabc".into(),
            did: "did:plc:abc".into(),
            collection: "app.bsky.feed.post".into(),
            json: json!({"user": {"name": "Alice"}, "age": 30}),
            indexed_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            rkey: "1".into(),
        }
    }

    #[test]
    fn resolves_nested_json_path() {
        let r = sample();
        assert_eq!(r.json_path("user.name").unwrap(), "Alice");
        assert_eq!(r.json_path("age").unwrap(), 30);
    }

    #[test]
    fn missing_path_is_none() {
        let r = sample();
        assert!(r.json_path("user.missing").is_none());
        assert!(r.json_path("nope").is_none());
    }
}
