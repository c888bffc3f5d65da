//! Core types and abstractions for the Quire resource layer.
//!
//! This crate provides the foundational types shared by every resource
//! backing store: the error taxonomy, resource identifiers, configuration
//! and logging setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod uri;

pub use config::{GeneralConfig, QuireConfig, ResourceSection};
pub use error::{ResourceError, Result};
pub use uri::ResourceUri;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{GeneralConfig, QuireConfig, ResourceSection};
    pub use crate::error::{ResourceError, Result};
    pub use crate::uri::ResourceUri;
}
