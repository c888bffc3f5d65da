//! Resource abstraction for Quire.
//!
//! This crate lets editing code read and save text through one contract,
//! whatever store holds it:
//! - `Resource`: capability-based handle on addressable text
//! - `save`: orchestrates incremental and full-content saves
//! - `DefaultResourceProvider`: resolves URIs through an ordered resolver chain
//! - `InMemoryResources`, `UntitledResourceResolver`,
//!   `InMemoryTextResourceResolver`, `FileResourceResolver`: backing stores
//!
//! # Example
//!
//! ```no_run
//! use quire_resource::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> quire_core::Result<()> {
//! let memory = Arc::new(InMemoryResources::new());
//! let registry = Arc::new(ResolverRegistry::new());
//! registry.register(memory.clone());
//! registry.register(Arc::new(FileResourceResolver::new()));
//!
//! let uri = ResourceUri::parse("inmemory:/scratch")?;
//! memory.add(&uri, "draft")?;
//!
//! let provider = DefaultResourceProvider::new(registry);
//! let resource = provider.get(&uri).await?;
//! save(resource.as_ref(), &SaveContext::new("final"), None).await?;
//! assert_eq!(resource.read_contents(None).await?, "final");
//! # Ok(())
//! # }
//! ```

pub mod change;
pub mod file;
pub mod memory;
pub mod memory_text;
pub mod provider;
pub mod resource;
pub mod save;
pub mod untitled;

// Re-export main types
pub use change::{Position, Range, TextDocumentContentChange, apply_changes};
pub use file::{FileResource, FileResourceResolver};
pub use memory::{InMemoryResources, MutableResource};
pub use memory_text::{InMemoryTextResource, InMemoryTextResourceResolver};
pub use provider::{DefaultResourceProvider, ResolverRegistry, ResourceProvider, ResourceResolver};
pub use resource::{
    ContentsChanged, ContentsChangedEmitter, Resource, ResourceReadOptions, ResourceSaveOptions,
    ResourceVersion, SaveContentChanges, SaveContents,
};
pub use save::{SaveContext, save, should_prefer_full_save};
pub use untitled::{UntitledResource, UntitledResourceResolver};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::change::{Position, Range, TextDocumentContentChange};
    pub use crate::file::{FileResource, FileResourceResolver};
    pub use crate::memory::{InMemoryResources, MutableResource};
    pub use crate::memory_text::InMemoryTextResourceResolver;
    pub use crate::provider::{
        DefaultResourceProvider, ResolverRegistry, ResourceProvider, ResourceResolver,
    };
    pub use crate::resource::{
        ContentsChanged, Resource, ResourceReadOptions, ResourceSaveOptions, ResourceVersion,
        SaveContentChanges, SaveContents,
    };
    pub use crate::save::{SaveContext, save};
    pub use crate::untitled::UntitledResourceResolver;
    pub use quire_core::error::{ResourceError, Result};
    pub use quire_core::uri::ResourceUri;
}
