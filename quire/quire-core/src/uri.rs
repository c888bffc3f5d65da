//! Resource identifiers.
//!
//! A [`ResourceUri`] addresses a piece of textual content independently of the
//! store that holds it. Its string form is stable and is used as the key of
//! in-memory registries and in error payloads.

use crate::error::{ResourceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// A stable, string-serializable identifier of a resource.
///
/// Equality and hashing follow the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceUri(Url);

impl ResourceUri {
    /// Parse a URI from its string form.
    pub fn parse(s: &str) -> Result<Self> {
        Url::parse(s.trim())
            .map(Self)
            .map_err(|e| ResourceError::invalid_uri(format!("'{}': {}", s, e)))
    }

    /// Create a `file:` URI from an absolute filesystem path.
    pub fn from_file_path(path: &Path) -> Result<Self> {
        Url::from_file_path(path).map(Self).map_err(|_| {
            ResourceError::invalid_uri(format!("not an absolute path: {}", path.display()))
        })
    }

    /// Convert a `file:` URI back to a filesystem path.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.0.scheme() != "file" {
            return None;
        }
        self.0.to_file_path().ok()
    }

    /// The scheme, e.g. `file` or `untitled`.
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// The (still percent-encoded) path component.
    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// The raw query component, if any.
    pub fn query(&self) -> Option<&str> {
        self.0.query()
    }

    /// The query component with percent-encoding removed.
    ///
    /// Returns an empty string when the URI carries no query.
    pub fn decoded_query(&self) -> String {
        let raw = self.0.query().unwrap_or_default();
        match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        }
    }

    /// Get the inner URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// The serialized form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<Url> for ResourceUri {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl From<ResourceUri> for Url {
    fn from(uri: ResourceUri) -> Self {
        uri.0
    }
}

impl std::str::FromStr for ResourceUri {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ResourceUri {
    type Error = ResourceError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<ResourceUri> for ResourceUri {
    fn as_ref(&self) -> &ResourceUri {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_untitled() {
        let uri = ResourceUri::parse("untitled:/Untitled-1.txt").unwrap();
        assert_eq!(uri.scheme(), "untitled");
        assert_eq!(uri.path(), "/Untitled-1.txt");
        assert_eq!(uri.to_string(), "untitled:/Untitled-1.txt");
    }

    #[test]
    fn test_decoded_query() {
        let uri = ResourceUri::parse("mem-txt:/greeting?hello%20world").unwrap();
        assert_eq!(uri.query(), Some("hello%20world"));
        assert_eq!(uri.decoded_query(), "hello world");

        let no_query = ResourceUri::parse("mem-txt:/empty").unwrap();
        assert_eq!(no_query.decoded_query(), "");
    }

    #[test]
    fn test_invalid_uri() {
        let err = ResourceUri::parse("not a uri").unwrap_err();
        assert!(matches!(err, ResourceError::InvalidUri(_)));
    }

    #[test]
    fn test_file_path_roundtrip() {
        let path = std::env::temp_dir().join("quire").join("notes.md");
        let uri = ResourceUri::from_file_path(&path).unwrap();
        assert_eq!(uri.scheme(), "file");
        assert_eq!(uri.to_file_path(), Some(path));
    }

    #[test]
    fn test_to_file_path_rejects_other_schemes() {
        let uri = ResourceUri::parse("untitled:/Untitled-1").unwrap();
        assert!(uri.to_file_path().is_none());
    }

    #[test]
    fn test_equality_by_serialized_form() {
        let a = ResourceUri::parse("file:///tmp/a.txt").unwrap();
        let b: ResourceUri = "file:///tmp/a.txt".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_serialization() {
        let uri = ResourceUri::parse("untitled:/Untitled-3").unwrap();
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"untitled:/Untitled-3\"");
        let back: ResourceUri = serde_json::from_str(&json).unwrap();
        assert_eq!(uri, back);
    }
}
