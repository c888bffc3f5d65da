//! Read-only text carried inside the URI itself.
//!
//! `mem-txt:/label?some%20text` resolves to a resource whose content is
//! `some text`.

use crate::provider::ResourceResolver;
use crate::resource::{Resource, ResourceReadOptions};
use async_trait::async_trait;
use quire_core::error::{ResourceError, Result};
use quire_core::uri::ResourceUri;
use std::sync::Arc;

/// Scheme of in-memory text URIs.
pub const MEMORY_TEXT_SCHEME: &str = "mem-txt";

/// A read-only resource whose content is the decoded query of its URI.
pub struct InMemoryTextResource {
    uri: ResourceUri,
}

impl InMemoryTextResource {
    pub fn new(uri: ResourceUri) -> Self {
        Self { uri }
    }
}

#[async_trait]
impl Resource for InMemoryTextResource {
    fn uri(&self) -> &ResourceUri {
        &self.uri
    }

    async fn read_contents(&self, _options: Option<&ResourceReadOptions>) -> Result<String> {
        Ok(self.uri.decoded_query())
    }

    fn dispose(&self) {}
}

/// Resolves `mem-txt:` URIs.
#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryTextResourceResolver;

#[async_trait]
impl ResourceResolver for InMemoryTextResourceResolver {
    async fn resolve(&self, uri: &ResourceUri) -> Result<Arc<dyn Resource>> {
        if uri.scheme() != MEMORY_TEXT_SCHEME {
            return Err(ResourceError::unsupported_scheme(uri.scheme(), uri));
        }
        let resource: Arc<dyn Resource> = Arc::new(InMemoryTextResource::new(uri.clone()));
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_query() {
        let uri = ResourceUri::parse("mem-txt:/note?hello%20there").unwrap();
        let resource = InMemoryTextResourceResolver.resolve(&uri).await.unwrap();
        assert_eq!(resource.read_contents(None).await.unwrap(), "hello there");
        assert!(resource.read_only());
        assert!(resource.subscribe().is_none());
    }

    #[tokio::test]
    async fn test_rejects_other_schemes() {
        let uri = ResourceUri::parse("untitled:/Untitled-1").unwrap();
        let result = InMemoryTextResourceResolver.resolve(&uri).await;
        assert!(matches!(result, Err(ResourceError::UnsupportedScheme { .. })));
    }
}
