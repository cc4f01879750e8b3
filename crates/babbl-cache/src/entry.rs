use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Record of one rendered source file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// SHA-256 of the source bytes when it was rendered.
    pub source_hash: String,
    /// Where the rendered HTML was written.
    pub output_path: PathBuf,
    /// When the entry was recorded (ISO-8601).
    pub last_processed: DateTime<Local>,
    /// Hash of in-memory content supplied by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Caller metadata, typically the document frontmatter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_optional_fields_only_when_present() {
        let entry = CacheEntry {
            source_hash: "abc".to_owned(),
            output_path: PathBuf::from("out/post.html"),
            last_processed: Local::now(),
            content_hash: None,
            metadata: None,
        };

        let json = serde_json::to_value(&entry).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object["source_hash"], "abc");
        assert_eq!(object["output_path"], "out/post.html");
        assert!(object["last_processed"].is_string());
        assert!(!object.contains_key("content_hash"));
        assert!(!object.contains_key("metadata"));
    }

    #[test]
    fn test_deserializes_without_optional_fields() {
        let entry: CacheEntry = serde_json::from_str(
            r#"{"source_hash":"abc","output_path":"a.html","last_processed":"2024-05-01T10:00:00+00:00"}"#,
        )
        .unwrap();

        assert_eq!(entry.source_hash, "abc");
        assert!(entry.content_hash.is_none());
    }
}
