//! Untitled resources: writable scratch buffers that have not been given a
//! location yet.

use crate::provider::ResourceResolver;
use crate::resource::{
    ContentsChanged, ContentsChangedEmitter, DEFAULT_EVENT_CAPACITY, Resource,
    ResourceReadOptions, ResourceSaveOptions, SaveContents,
};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use quire_core::config::ResourceSection;
use quire_core::error::{ResourceError, Result};
use quire_core::uri::ResourceUri;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::debug;

/// Scheme of untitled resource URIs.
pub const UNTITLED_SCHEME: &str = "untitled";

type UntitledMap = DashMap<String, Arc<UntitledResource>>;

/// An in-memory buffer addressed by an `untitled:` URI.
pub struct UntitledResource {
    uri: ResourceUri,
    contents: RwLock<String>,
    emitter: ContentsChangedEmitter,
    resources: Weak<UntitledMap>,
    disposed: AtomicBool,
}

#[async_trait]
impl SaveContents for UntitledResource {
    async fn save_contents(
        &self,
        content: &str,
        _options: Option<&ResourceSaveOptions>,
    ) -> Result<()> {
        *self.contents.write() = content.to_string();
        self.emitter.fire();
        Ok(())
    }
}

#[async_trait]
impl Resource for UntitledResource {
    fn uri(&self) -> &ResourceUri {
        &self.uri
    }

    async fn read_contents(&self, _options: Option<&ResourceReadOptions>) -> Result<String> {
        Ok(self.contents.read().clone())
    }

    fn saver(&self) -> Option<&dyn SaveContents> {
        Some(self)
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ContentsChanged>> {
        self.emitter.subscribe()
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.emitter.close();
        if let Some(resources) = self.resources.upgrade() {
            resources.remove(self.uri.as_str());
        }
        debug!(uri = %self.uri, "Disposed untitled resource");
    }
}

/// Creates and tracks untitled resources.
pub struct UntitledResourceResolver {
    resources: Arc<UntitledMap>,
    event_capacity: usize,
    default_extension: Option<String>,
}

impl UntitledResourceResolver {
    /// Create a resolver with default settings.
    pub fn new() -> Self {
        Self {
            resources: Arc::new(DashMap::new()),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            default_extension: None,
        }
    }

    /// Create a resolver using the configured event capacity and extension.
    pub fn with_config(config: &ResourceSection) -> Self {
        Self {
            resources: Arc::new(DashMap::new()),
            event_capacity: config.event_capacity,
            default_extension: config.untitled_extension.clone(),
        }
    }

    /// Whether a live untitled resource is registered under `uri`.
    pub fn has(&self, uri: &ResourceUri) -> bool {
        self.resources.contains_key(uri.as_str())
    }

    /// First free `untitled:/Untitled-<n><extension>` URI, counting from 1.
    pub fn create_untitled_uri(&self, extension: Option<&str>) -> Result<ResourceUri> {
        let extension = extension
            .or(self.default_extension.as_deref())
            .unwrap_or_default();

        let mut counter = 1usize;
        loop {
            let uri =
                ResourceUri::parse(&format!("{UNTITLED_SCHEME}:/Untitled-{counter}{extension}"))?;
            if !self.has(&uri) {
                return Ok(uri);
            }
            counter += 1;
        }
    }

    /// Create an untitled resource holding `content`.
    ///
    /// Without an explicit `uri` a fresh one is generated. An explicit URI
    /// must use the `untitled` scheme and must not be in use.
    pub fn create_untitled_resource(
        &self,
        content: Option<&str>,
        extension: Option<&str>,
        uri: Option<ResourceUri>,
    ) -> Result<Arc<UntitledResource>> {
        let uri = match uri {
            Some(uri) if uri.scheme() != UNTITLED_SCHEME => {
                return Err(ResourceError::unsupported_scheme(uri.scheme(), &uri));
            }
            Some(uri) => uri,
            None => self.create_untitled_uri(extension)?,
        };

        match self.resources.entry(uri.to_string()) {
            Entry::Occupied(_) => Err(ResourceError::already_exists(&uri)),
            Entry::Vacant(entry) => {
                let resource = self.new_resource(uri, content.unwrap_or_default());
                entry.insert(Arc::clone(&resource));
                Ok(resource)
            }
        }
    }

    fn new_resource(&self, uri: ResourceUri, content: &str) -> Arc<UntitledResource> {
        debug!(uri = %uri, "Created untitled resource");
        Arc::new(UntitledResource {
            uri,
            contents: RwLock::new(content.to_string()),
            emitter: ContentsChangedEmitter::new(self.event_capacity),
            resources: Arc::downgrade(&self.resources),
            disposed: AtomicBool::new(false),
        })
    }

    /// Number of live untitled resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether no untitled resource is live.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for UntitledResourceResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceResolver for UntitledResourceResolver {
    async fn resolve(&self, uri: &ResourceUri) -> Result<Arc<dyn Resource>> {
        if uri.scheme() != UNTITLED_SCHEME {
            return Err(ResourceError::unsupported_scheme(uri.scheme(), uri));
        }

        let resource = match self.resources.entry(uri.to_string()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let resource = self.new_resource(uri.clone(), "");
                entry.insert(Arc::clone(&resource));
                resource
            }
        };
        Ok(resource as Arc<dyn Resource>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_counter_starts_at_one() {
        let resolver = UntitledResourceResolver::new();
        let uri = resolver.create_untitled_uri(Some(".md")).unwrap();
        assert_eq!(uri.as_str(), "untitled:/Untitled-1.md");
    }

    #[test]
    fn test_uri_counter_skips_used_names() {
        let resolver = UntitledResourceResolver::new();
        let first = resolver.create_untitled_resource(None, None, None).unwrap();
        let second = resolver.create_untitled_resource(None, None, None).unwrap();
        assert_eq!(first.uri().as_str(), "untitled:/Untitled-1");
        assert_eq!(second.uri().as_str(), "untitled:/Untitled-2");

        first.dispose();
        let third = resolver.create_untitled_resource(None, None, None).unwrap();
        assert_eq!(third.uri().as_str(), "untitled:/Untitled-1");
    }

    #[test]
    fn test_configured_extension() {
        let config = ResourceSection {
            untitled_extension: Some(".txt".to_string()),
            ..ResourceSection::default()
        };
        let resolver = UntitledResourceResolver::with_config(&config);
        let uri = resolver.create_untitled_uri(None).unwrap();
        assert_eq!(uri.as_str(), "untitled:/Untitled-1.txt");
    }

    #[test]
    fn test_explicit_uri_must_be_untitled() {
        let resolver = UntitledResourceResolver::new();
        let uri = ResourceUri::parse("file:///tmp/a.txt").unwrap();
        let result = resolver.create_untitled_resource(None, None, Some(uri));
        assert!(matches!(result, Err(ResourceError::UnsupportedScheme { .. })));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let resolver = UntitledResourceResolver::new();
        let resource = resolver
            .create_untitled_resource(Some("draft"), None, None)
            .unwrap();
        let uri = resource.uri().clone();

        resource.dispose();
        resource.dispose();

        assert!(!resolver.has(&uri));
        assert!(resolver.is_empty());
    }
}
