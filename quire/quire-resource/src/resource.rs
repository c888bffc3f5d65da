//! The resource contract.
//!
//! A [`Resource`] is a handle on a piece of addressable text. Beyond its URI,
//! read access and disposal, every capability is optional and must be probed
//! before use:
//!
//! - [`Resource::saver`] for full-content saves
//! - [`Resource::change_saver`] for incremental saves
//! - [`Resource::subscribe`] for change notifications
//! - [`Resource::guess_encoding`] for encoding detection

use crate::change::TextDocumentContentChange;
use async_trait::async_trait;
use parking_lot::RwLock;
use quire_core::error::Result;
use quire_core::uri::ResourceUri;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

/// Capacity of a change channel when none is configured.
pub const DEFAULT_EVENT_CAPACITY: usize = 16;

/// Opaque token describing the last read or written state of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVersion(String);

impl ResourceVersion {
    /// Wrap an opaque version token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Version of a byte snapshot: the blake3 digest of its content.
    pub fn for_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// The token as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options for [`Resource::read_contents`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReadOptions {
    /// Encoding label to decode the content with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl ResourceReadOptions {
    /// Set the encoding label
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

/// Options for full and incremental saves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSaveOptions {
    /// Encoding label to encode the content with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Encoding label forced on write, regardless of what the store detected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overwrite_encoding: Option<String>,
    /// Version the caller expects the resource to be at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<ResourceVersion>,
}

impl ResourceSaveOptions {
    /// Set the encoding label
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Force an encoding on write
    pub fn with_overwrite_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.overwrite_encoding = Some(encoding.into());
        self
    }

    /// Set the expected version
    pub fn with_version(mut self, version: ResourceVersion) -> Self {
        self.version = Some(version);
        self
    }
}

/// Notification that the content of a resource changed.
///
/// It carries no payload; subscribers re-read the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentsChanged;

/// Broadcasts [`ContentsChanged`] to any number of subscribers.
///
/// Closing the emitter drops the sender, so subscribers observe
/// `RecvError::Closed` once they have drained pending notifications.
pub struct ContentsChangedEmitter {
    sender: RwLock<Option<broadcast::Sender<ContentsChanged>>>,
}

impl ContentsChangedEmitter {
    /// Create an emitter whose subscribers buffer up to `capacity` notifications.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: RwLock::new(Some(sender)),
        }
    }

    /// Notify all current subscribers.
    pub fn fire(&self) {
        if let Some(sender) = self.sender.read().as_ref() {
            // No subscribers is not an error
            let _ = sender.send(ContentsChanged);
        }
    }

    /// Subscribe to future notifications, or `None` once closed.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<ContentsChanged>> {
        self.sender.read().as_ref().map(broadcast::Sender::subscribe)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender
            .read()
            .as_ref()
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Release the channel. Idempotent.
    pub fn close(&self) {
        self.sender.write().take();
    }

    /// Whether [`ContentsChangedEmitter::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }
}

impl Default for ContentsChangedEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Capability of replacing the content of a resource wholesale.
#[async_trait]
pub trait SaveContents: Send + Sync {
    /// Replace the content, creating the backing content if absent.
    ///
    /// Fails with `OutOfSync` when `options.version` does not match the
    /// current version; the content is left unchanged in that case.
    async fn save_contents(
        &self,
        content: &str,
        options: Option<&ResourceSaveOptions>,
    ) -> Result<()>;
}

/// Capability of applying incremental edits to a resource.
#[async_trait]
pub trait SaveContentChanges: Send + Sync {
    /// Apply `changes` in order to the existing content.
    ///
    /// Fails with `NotFound` if the resource was never read or no longer
    /// exists, and with `OutOfSync` on a version mismatch.
    async fn save_content_changes(
        &self,
        changes: &[TextDocumentContentChange],
        options: Option<&ResourceSaveOptions>,
    ) -> Result<()>;
}

/// A piece of addressable textual content.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Identifier of the resource, immutable for its lifetime.
    fn uri(&self) -> &ResourceUri;

    /// Version of the last read or written state.
    ///
    /// `None` for stores without optimistic concurrency, and until the
    /// content has been read or written once.
    fn version(&self) -> Option<ResourceVersion> {
        None
    }

    /// Encoding label of the last read or written state.
    fn encoding(&self) -> Option<String> {
        None
    }

    /// Whether the resource accepts writes.
    fn read_only(&self) -> bool {
        self.saver().is_none()
    }

    /// Read the full content.
    ///
    /// Fails with `NotFound` if the content no longer exists.
    async fn read_contents(&self, options: Option<&ResourceReadOptions>) -> Result<String>;

    /// Full-save capability.
    fn saver(&self) -> Option<&dyn SaveContents> {
        None
    }

    /// Incremental-save capability.
    fn change_saver(&self) -> Option<&dyn SaveContentChanges> {
        None
    }

    /// Change-notification capability.
    fn subscribe(&self) -> Option<broadcast::Receiver<ContentsChanged>> {
        None
    }

    /// Best-effort detection of the encoding of the backing bytes.
    async fn guess_encoding(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Release whatever this resource owns. Calling it twice is harmless.
    fn dispose(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_version_for_bytes() {
        let a = ResourceVersion::for_bytes(b"hello");
        let b = ResourceVersion::for_bytes(b"hello");
        let c = ResourceVersion::for_bytes(b"hello!");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_emitter_fires_to_subscribers() {
        let emitter = ContentsChangedEmitter::default();
        let mut rx = emitter.subscribe().unwrap();
        assert_eq!(emitter.subscriber_count(), 1);

        emitter.fire();
        assert_eq!(rx.try_recv(), Ok(ContentsChanged));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_emitter_fire_without_subscribers() {
        let emitter = ContentsChangedEmitter::new(1);
        emitter.fire();
        assert_eq!(emitter.subscriber_count(), 0);
    }

    #[test]
    fn test_emitter_close() {
        let emitter = ContentsChangedEmitter::default();
        let mut rx = emitter.subscribe().unwrap();

        emitter.close();
        emitter.close();

        assert!(emitter.is_closed());
        assert!(emitter.subscribe().is_none());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Closed));
    }

    #[test]
    fn test_save_options_serialization() {
        let options = ResourceSaveOptions::default()
            .with_overwrite_encoding("utf8bom")
            .with_version(ResourceVersion::new("v1"));
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, r#"{"overwriteEncoding":"utf8bom","version":"v1"}"#);
    }
}
