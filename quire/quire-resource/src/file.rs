//! Resources backed by files on disk.
//!
//! The version of a file resource is the blake3 digest of the bytes last read
//! or written. Saves compare it against the bytes currently on disk, so
//! modifications made behind the resource's back are reported as
//! `OutOfSync` instead of being overwritten.

use crate::change::{TextDocumentContentChange, apply_changes};
use crate::provider::ResourceResolver;
use crate::resource::{
    ContentsChanged, ContentsChangedEmitter, Resource, ResourceReadOptions, ResourceSaveOptions,
    ResourceVersion, SaveContentChanges, SaveContents,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use quire_core::config::ResourceSection;
use quire_core::error::{ResourceError, Result};
use quire_core::uri::ResourceUri;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

/// Scheme of file URIs.
pub const FILE_SCHEME: &str = "file";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Guess the encoding label of `bytes` from its byte order mark.
///
/// Without a BOM, valid UTF-8 is reported as `utf8`; anything else is unknown.
pub fn guess_encoding_of(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(UTF8_BOM) {
        Some("utf8bom")
    } else if bytes.starts_with(UTF16LE_BOM) {
        Some("utf16le")
    } else if bytes.starts_with(UTF16BE_BOM) {
        Some("utf16be")
    } else if std::str::from_utf8(bytes).is_ok() {
        Some("utf8")
    } else {
        None
    }
}

#[derive(Debug, Default)]
struct FileState {
    version: Option<ResourceVersion>,
    encoding: Option<String>,
}

/// A resource backed by a file.
pub struct FileResource {
    uri: ResourceUri,
    path: PathBuf,
    state: RwLock<FileState>,
    emitter: ContentsChangedEmitter,
    default_encoding: String,
}

impl FileResource {
    /// Create a resource for a `file:` URI.
    pub fn new(uri: ResourceUri) -> Result<Self> {
        Self::with_config(uri, &ResourceSection::default())
    }

    /// Create a resource for a `file:` URI using the configured defaults.
    pub fn with_config(uri: ResourceUri, config: &ResourceSection) -> Result<Self> {
        let path = uri
            .to_file_path()
            .ok_or_else(|| ResourceError::unsupported_scheme(uri.scheme(), &uri))?;

        Ok(Self {
            uri,
            path,
            state: RwLock::new(FileState::default()),
            emitter: ContentsChangedEmitter::new(config.event_capacity),
            default_encoding: config.default_encoding.clone(),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw bytes, or `None` if the file does not exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Decode file bytes as text, dropping a UTF-8 byte order mark.
    fn decode(&self, mut bytes: Vec<u8>) -> Result<String> {
        if bytes.starts_with(UTF8_BOM) {
            bytes.drain(..UTF8_BOM.len());
        }
        String::from_utf8(bytes).map_err(|_| ResourceError::invalid_encoding(&self.uri))
    }

    /// Encoding to write with: forced, requested, last known, then default.
    fn write_encoding(&self, options: Option<&ResourceSaveOptions>) -> String {
        options
            .and_then(|o| o.overwrite_encoding.clone().or_else(|| o.encoding.clone()))
            .or_else(|| self.state.read().encoding.clone())
            .unwrap_or_else(|| self.default_encoding.clone())
    }

    /// Fail with `OutOfSync` if `on_disk` is not at the `expected` version.
    fn check_version(&self, expected: Option<&ResourceVersion>, on_disk: &[u8]) -> Result<()> {
        match expected {
            Some(expected) if ResourceVersion::for_bytes(on_disk) != *expected => {
                debug!(uri = %self.uri, expected = %expected, "File changed on disk");
                Err(ResourceError::out_of_sync(&self.uri))
            }
            _ => Ok(()),
        }
    }

    /// Write `content`, record the new state and notify subscribers.
    async fn write(&self, content: &str, encoding: String) -> Result<()> {
        let mut bytes = Vec::with_capacity(content.len() + UTF8_BOM.len());
        if encoding == "utf8bom" {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(content.as_bytes());

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, &bytes).await?;

        {
            let mut state = self.state.write();
            state.version = Some(ResourceVersion::for_bytes(&bytes));
            state.encoding = Some(encoding);
        }
        self.emitter.fire();
        Ok(())
    }
}

#[async_trait]
impl SaveContents for FileResource {
    #[instrument(skip_all, fields(uri = %self.uri))]
    async fn save_contents(
        &self,
        content: &str,
        options: Option<&ResourceSaveOptions>,
    ) -> Result<()> {
        let expected = options
            .and_then(|o| o.version.clone())
            .or_else(|| self.version());

        if expected.is_some() {
            if let Some(on_disk) = self.read_bytes().await? {
                self.check_version(expected.as_ref(), &on_disk)?;
            }
        }

        self.write(content, self.write_encoding(options)).await?;
        debug!(bytes = content.len(), "Saved file contents");
        Ok(())
    }
}

#[async_trait]
impl SaveContentChanges for FileResource {
    #[instrument(skip_all, fields(uri = %self.uri, changes = changes.len()))]
    async fn save_content_changes(
        &self,
        changes: &[TextDocumentContentChange],
        options: Option<&ResourceSaveOptions>,
    ) -> Result<()> {
        let Some(known) = self.version() else {
            return Err(ResourceError::not_found(&self.uri));
        };
        let Some(on_disk) = self.read_bytes().await? else {
            return Err(ResourceError::not_found(&self.uri));
        };

        let expected = options.and_then(|o| o.version.clone()).unwrap_or(known);
        self.check_version(Some(&expected), &on_disk)?;

        let current = self.decode(on_disk)?;
        let updated = apply_changes(&current, changes)?;

        self.write(&updated, self.write_encoding(options)).await?;
        debug!("Saved file content changes");
        Ok(())
    }
}

#[async_trait]
impl Resource for FileResource {
    fn uri(&self) -> &ResourceUri {
        &self.uri
    }

    fn version(&self) -> Option<ResourceVersion> {
        self.state.read().version.clone()
    }

    fn encoding(&self) -> Option<String> {
        self.state.read().encoding.clone()
    }

    #[instrument(skip_all, fields(uri = %self.uri))]
    async fn read_contents(&self, options: Option<&ResourceReadOptions>) -> Result<String> {
        let Some(bytes) = self.read_bytes().await? else {
            return Err(ResourceError::not_found(&self.uri));
        };

        let version = ResourceVersion::for_bytes(&bytes);
        let encoding = options
            .and_then(|o| o.encoding.clone())
            .or_else(|| guess_encoding_of(&bytes).map(str::to_string))
            .unwrap_or_else(|| self.default_encoding.clone());

        let text = self.decode(bytes)?;

        {
            let mut state = self.state.write();
            state.version = Some(version);
            state.encoding = Some(encoding);
        }
        debug!(bytes = text.len(), "Read file contents");
        Ok(text)
    }

    fn saver(&self) -> Option<&dyn SaveContents> {
        Some(self)
    }

    fn change_saver(&self) -> Option<&dyn SaveContentChanges> {
        Some(self)
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ContentsChanged>> {
        self.emitter.subscribe()
    }

    async fn guess_encoding(&self) -> Result<Option<String>> {
        Ok(self
            .read_bytes()
            .await?
            .and_then(|bytes| guess_encoding_of(&bytes).map(str::to_string)))
    }

    fn dispose(&self) {
        self.emitter.close();
    }
}

/// Resolves `file:` URIs to fresh [`FileResource`]s.
#[derive(Debug, Clone, Default)]
pub struct FileResourceResolver {
    config: ResourceSection,
}

impl FileResourceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ResourceSection) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ResourceResolver for FileResourceResolver {
    async fn resolve(&self, uri: &ResourceUri) -> Result<Arc<dyn Resource>> {
        if uri.scheme() != FILE_SCHEME {
            return Err(ResourceError::unsupported_scheme(uri.scheme(), uri));
        }

        let resource = FileResource::with_config(uri.clone(), &self.config)?;
        if let Ok(metadata) = tokio::fs::metadata(resource.path()).await {
            if metadata.is_dir() {
                return Err(ResourceError::invalid_uri(format!(
                    "'{}' is a directory",
                    uri
                )));
            }
        }

        let resource: Arc<dyn Resource> = Arc::new(resource);
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_encoding_of() {
        assert_eq!(guess_encoding_of(b"\xEF\xBB\xBFhi"), Some("utf8bom"));
        assert_eq!(guess_encoding_of(b"\xFF\xFEh\x00"), Some("utf16le"));
        assert_eq!(guess_encoding_of(b"\xFE\xFF\x00h"), Some("utf16be"));
        assert_eq!(guess_encoding_of("h\u{e9}".as_bytes()), Some("utf8"));
        assert_eq!(guess_encoding_of(b"\xC3\x28"), None);
    }

    #[test]
    fn test_rejects_non_file_uri() {
        let uri = ResourceUri::parse("untitled:/Untitled-1").unwrap();
        assert!(matches!(
            FileResource::new(uri),
            Err(ResourceError::UnsupportedScheme { .. })
        ));
    }
}
