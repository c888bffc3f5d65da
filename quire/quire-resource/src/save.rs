//! Save orchestration.
//!
//! [`save`] persists new content through whatever capabilities a resource
//! offers. Incremental saves are an optimisation only: whenever one is not
//! worth it, not supported, or fails, the content is written in full.

use crate::change::TextDocumentContentChange;
use crate::resource::{Resource, ResourceSaveOptions};
use quire_core::error::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

/// Everything a single save call needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveContext {
    /// Full intended new content
    pub content: String,
    /// Edits that turn the current content into `content`
    pub changes: Option<Vec<TextDocumentContentChange>>,
    /// Options forwarded to the resource
    pub options: Option<ResourceSaveOptions>,
}

impl SaveContext {
    /// Create a context for a full-content save.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            changes: None,
            options: None,
        }
    }

    /// Attach the edits producing the new content.
    pub fn with_changes(mut self, changes: Vec<TextDocumentContentChange>) -> Self {
        self.changes = Some(changes);
        self
    }

    /// Attach save options.
    pub fn with_options(mut self, options: ResourceSaveOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Save `context` into `resource`.
///
/// Resources without a full-save capability are left alone. Otherwise an
/// incremental save is tried first; if it is skipped or fails, the full
/// content is written unless `cancel` has been triggered in the meantime.
/// Only the outcome of the full save is returned to the caller.
#[instrument(skip_all, fields(uri = %resource.uri()))]
pub async fn save(
    resource: &dyn Resource,
    context: &SaveContext,
    cancel: Option<&CancellationToken>,
) -> Result<()> {
    let Some(saver) = resource.saver() else {
        trace!("Resource is read-only, nothing to save");
        return Ok(());
    };

    if try_save_content_changes(resource, context).await {
        return Ok(());
    }

    if cancel.is_some_and(CancellationToken::is_cancelled) {
        debug!("Save cancelled before writing full content");
        return Ok(());
    }

    saver
        .save_contents(&context.content, context.options.as_ref())
        .await
}

/// Attempt an incremental save, returning whether it succeeded.
async fn try_save_content_changes(resource: &dyn Resource, context: &SaveContext) -> bool {
    let Some(changes) = context.changes.as_deref() else {
        return false;
    };
    let Some(change_saver) = resource.change_saver() else {
        return false;
    };
    if should_prefer_full_save(&context.content, Some(changes)) {
        trace!(changes = changes.len(), "Changes are not cheaper than full content");
        return false;
    }

    match change_saver
        .save_content_changes(changes, context.options.as_ref())
        .await
    {
        Ok(()) => {
            debug!(changes = changes.len(), "Saved content changes");
            true
        }
        Err(e) if e.is_not_found() || e.is_out_of_sync() => {
            // The full save reports these against the current state
            debug!(error = %e, "Content changes rejected, falling back to full save");
            false
        }
        Err(e) => {
            // TODO: surface unexpected incremental-save errors once every store reports them precisely
            warn!(error = %e, "Failed to save content changes, falling back to full save");
            false
        }
    }
}

/// Whether writing `content` in full is at least as cheap as sending `changes`.
///
/// The cost of the changes is the summed length of their JSON form. Without
/// changes the full save is always preferred.
pub fn should_prefer_full_save(
    content: &str,
    changes: Option<&[TextDocumentContentChange]>,
) -> bool {
    let Some(changes) = changes else {
        return true;
    };

    let content_len = content.len();
    let mut total = 0usize;
    for change in changes {
        match change.serialized_len() {
            Ok(len) => total += len,
            Err(_) => return true,
        }
        if total >= content_len {
            return true;
        }
    }
    total >= content_len
}
