//! Resolver chain.
//!
//! Resolvers are registered in a [`ResolverRegistry`]; the
//! [`DefaultResourceProvider`] asks each of them in registration order and
//! returns the first resource produced.

use crate::resource::Resource;
use async_trait::async_trait;
use parking_lot::RwLock;
use quire_core::error::{ResourceError, Result};
use quire_core::uri::ResourceUri;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Produces resources for the subset of URIs it understands.
///
/// Failing is how a resolver says "not mine".
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    /// Produce a resource for `uri`.
    async fn resolve(&self, uri: &ResourceUri) -> Result<Arc<dyn Resource>>;
}

/// Looks a resource up by URI.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Get the resource addressed by `uri`.
    async fn get(&self, uri: &ResourceUri) -> Result<Arc<dyn Resource>>;
}

/// Ordered, append-only collection of resolvers.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: RwLock<Vec<Arc<dyn ResourceResolver>>>,
}

impl ResolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver; it is tried after every resolver registered before it.
    pub fn register(&self, resolver: Arc<dyn ResourceResolver>) {
        self.resolvers.write().push(resolver);
    }

    /// Snapshot of the registered resolvers, in registration order.
    pub fn resolvers(&self) -> Vec<Arc<dyn ResourceResolver>> {
        self.resolvers.read().clone()
    }

    /// Number of registered resolvers.
    pub fn len(&self) -> usize {
        self.resolvers.read().len()
    }

    /// Whether no resolver is registered.
    pub fn is_empty(&self) -> bool {
        self.resolvers.read().is_empty()
    }
}

impl From<Vec<Arc<dyn ResourceResolver>>> for ResolverRegistry {
    fn from(resolvers: Vec<Arc<dyn ResourceResolver>>) -> Self {
        Self {
            resolvers: RwLock::new(resolvers),
        }
    }
}

impl FromIterator<Arc<dyn ResourceResolver>> for ResolverRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn ResourceResolver>>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Provider that walks a [`ResolverRegistry`].
#[derive(Clone)]
pub struct DefaultResourceProvider {
    registry: Arc<ResolverRegistry>,
}

impl DefaultResourceProvider {
    /// Create a provider over `registry`.
    pub fn new(registry: Arc<ResolverRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this provider consults.
    pub fn registry(&self) -> &Arc<ResolverRegistry> {
        &self.registry
    }
}

#[async_trait]
impl ResourceProvider for DefaultResourceProvider {
    #[instrument(skip_all, fields(uri = %uri))]
    async fn get(&self, uri: &ResourceUri) -> Result<Arc<dyn Resource>> {
        let resolvers = self.registry.resolvers();

        for (index, resolver) in resolvers.iter().enumerate() {
            match resolver.resolve(uri).await {
                Ok(resource) => {
                    debug!(resolver = index, "Resolved resource");
                    return Ok(resource);
                }
                Err(_) => trace!(resolver = index, "Resolver declined"),
            }
        }

        Err(ResourceError::unregistered(uri))
    }
}
