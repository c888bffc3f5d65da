//! In-memory resources.
//!
//! [`MutableResource`] keeps its whole content in a string. [`InMemoryResources`]
//! owns a keyed collection of them and resolves URIs to the registered
//! instance.

use crate::provider::ResourceResolver;
use crate::resource::{
    ContentsChanged, ContentsChangedEmitter, DEFAULT_EVENT_CAPACITY, Resource,
    ResourceReadOptions, ResourceSaveOptions, SaveContents,
};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Mutex, RwLock};
use quire_core::config::ResourceSection;
use quire_core::error::{ResourceError, Result};
use quire_core::uri::ResourceUri;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::debug;

type ReleaseCallback = Box<dyn FnOnce() + Send>;

/// A writable resource backed by an in-process string.
///
/// It has no versioning and no incremental save.
pub struct MutableResource {
    uri: ResourceUri,
    contents: RwLock<String>,
    emitter: ContentsChangedEmitter,
    release: Mutex<Option<ReleaseCallback>>,
}

impl MutableResource {
    /// Create a standalone resource.
    pub fn new(uri: ResourceUri, contents: impl Into<String>) -> Self {
        Self {
            uri,
            contents: RwLock::new(contents.into()),
            emitter: ContentsChangedEmitter::new(DEFAULT_EVENT_CAPACITY),
            release: Mutex::new(None),
        }
    }

    /// Create a resource that runs `release` the first time it is disposed.
    pub fn with_release(
        uri: ResourceUri,
        contents: impl Into<String>,
        event_capacity: usize,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            uri,
            contents: RwLock::new(contents.into()),
            emitter: ContentsChangedEmitter::new(event_capacity),
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// Current content without going through the async contract.
    pub fn contents(&self) -> String {
        self.contents.read().clone()
    }
}

#[async_trait]
impl SaveContents for MutableResource {
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
impl Resource for MutableResource {
    fn uri(&self) -> &ResourceUri {
        &self.uri
    }

    async fn read_contents(&self, _options: Option<&ResourceReadOptions>) -> Result<String> {
        Ok(self.contents())
    }

    fn saver(&self) -> Option<&dyn SaveContents> {
        Some(self)
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ContentsChanged>> {
        self.emitter.subscribe()
    }

    fn dispose(&self) {
        self.emitter.close();
        let release = self.release.lock().take();
        if let Some(release) = release {
            release();
        }
    }
}

/// Registry of [`MutableResource`]s keyed by URI.
///
/// Disposing a registered resource removes its entry.
pub struct InMemoryResources {
    resources: Arc<DashMap<String, Arc<MutableResource>>>,
    event_capacity: usize,
}

impl InMemoryResources {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            resources: Arc::new(DashMap::new()),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Create an empty registry using the configured event capacity.
    pub fn with_config(config: &ResourceSection) -> Self {
        Self {
            resources: Arc::new(DashMap::new()),
            event_capacity: config.event_capacity,
        }
    }

    /// Register a new resource under `uri`.
    ///
    /// Fails with `AlreadyExists` rather than replacing an existing entry.
    pub fn add(&self, uri: &ResourceUri, contents: &str) -> Result<Arc<MutableResource>> {
        let key = uri.to_string();

        match self.resources.entry(key.clone()) {
            Entry::Occupied(_) => Err(ResourceError::already_exists(uri)),
            Entry::Vacant(entry) => {
                let registry: Weak<DashMap<String, Arc<MutableResource>>> =
                    Arc::downgrade(&self.resources);
                let resource = Arc::new(MutableResource::with_release(
                    uri.clone(),
                    contents,
                    self.event_capacity,
                    move || {
                        if let Some(resources) = registry.upgrade() {
                            resources.remove(&key);
                        }
                    },
                ));
                entry.insert(Arc::clone(&resource));
                debug!(uri = %uri, "Added in-memory resource");
                Ok(resource)
            }
        }
    }

    /// Replace the content of the resource registered under `uri`.
    ///
    /// Goes through the resource's save path, so subscribers are notified.
    pub async fn update(&self, uri: &ResourceUri, contents: &str) -> Result<Arc<MutableResource>> {
        let resource = self
            .get(uri)
            .ok_or_else(|| ResourceError::does_not_exist(uri))?;
        resource.save_contents(contents, None).await?;
        Ok(resource)
    }

    /// The resource registered under `uri`, if any.
    pub fn get(&self, uri: &ResourceUri) -> Option<Arc<MutableResource>> {
        self.resources
            .get(uri.as_str())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Whether a resource is registered under `uri`.
    pub fn contains(&self, uri: &ResourceUri) -> bool {
        self.resources.contains_key(uri.as_str())
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether no resource is registered.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for InMemoryResources {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceResolver for InMemoryResources {
    async fn resolve(&self, uri: &ResourceUri) -> Result<Arc<dyn Resource>> {
        match self.get(uri) {
            Some(resource) => Ok(resource as Arc<dyn Resource>),
            None => Err(ResourceError::does_not_exist(uri)),
        }
    }
}
