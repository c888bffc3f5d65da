//! Tests for in-memory, untitled and in-memory text resources

use quire_resource::prelude::*;
use std::sync::Arc;

fn uri(s: &str) -> ResourceUri {
    ResourceUri::parse(s).unwrap()
}

/// Whether two resource handles point at the same instance.
fn same_instance(a: &Arc<MutableResource>, b: &Arc<dyn Resource>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

// ============================================================================
// InMemoryResources Tests
// ============================================================================

#[tokio::test]
async fn test_add_then_resolve_returns_same_instance() {
    let resources = InMemoryResources::new();
    let target = uri("inmemory:/notes.md");

    let added = resources.add(&target, "# Notes").unwrap();
    let first = resources.resolve(&target).await.unwrap();
    let second = resources.resolve(&target).await.unwrap();

    assert!(same_instance(&added, &first));
    assert!(same_instance(&added, &second));
    assert_eq!(first.read_contents(None).await.unwrap(), "# Notes");
}

#[tokio::test]
async fn test_add_twice_fails_and_keeps_original() {
    let resources = InMemoryResources::new();
    let target = uri("inmemory:/a");

    let original = resources.add(&target, "first").unwrap();
    let err = resources.add(&target, "second").err().unwrap();

    assert!(err.is_already_exists());
    assert_eq!(original.read_contents(None).await.unwrap(), "first");
    let resolved = resources.resolve(&target).await.unwrap();
    assert!(same_instance(&original, &resolved));
    assert_eq!(resources.len(), 1);
}

#[tokio::test]
async fn test_update_missing_fails() {
    let resources = InMemoryResources::new();
    let err = resources.update(&uri("inmemory:/ghost"), "boo").await.err().unwrap();
    assert!(err.is_does_not_exist());
    assert!(resources.is_empty());
}

#[tokio::test]
async fn test_update_saves_and_notifies() {
    let resources = InMemoryResources::new();
    let target = uri("inmemory:/a");
    let added = resources.add(&target, "old").unwrap();
    let mut rx = added.subscribe().unwrap();

    let updated = resources.update(&target, "new").await.unwrap();

    assert!(Arc::ptr_eq(&added, &updated));
    assert_eq!(added.read_contents(None).await.unwrap(), "new");
    assert_eq!(rx.try_recv(), Ok(ContentsChanged));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_resolve_missing_fails() {
    let resources = InMemoryResources::new();
    let err = resources.resolve(&uri("inmemory:/none")).await.err().unwrap();
    assert!(err.is_does_not_exist());
}

#[tokio::test]
async fn test_dispose_removes_entry() {
    let resources = InMemoryResources::new();
    let target = uri("inmemory:/short-lived");
    let added = resources.add(&target, "bye").unwrap();

    added.dispose();
    added.dispose();

    assert!(!resources.contains(&target));
    let err = resources.resolve(&target).await.err().unwrap();
    assert!(err.is_does_not_exist());

    // The key is free again
    let again = resources.add(&target, "hello again").unwrap();
    assert!(!Arc::ptr_eq(&added, &again));
}

#[tokio::test]
async fn test_dispose_of_one_entry_keeps_others() {
    let resources = InMemoryResources::new();
    let a = resources.add(&uri("inmemory:/a"), "a").unwrap();
    resources.add(&uri("inmemory:/b"), "b").unwrap();

    a.dispose();

    assert_eq!(resources.len(), 1);
    assert!(resources.contains(&uri("inmemory:/b")));
}

#[tokio::test]
async fn test_save_orchestrator_on_registered_resource() {
    let resources = InMemoryResources::new();
    let target = uri("inmemory:/doc");
    resources.add(&target, "v1").unwrap();
    let resource = resources.resolve(&target).await.unwrap();

    let context = SaveContext::new("v2")
        .with_changes(vec![TextDocumentContentChange::full("v2")]);
    save(resource.as_ref(), &context, None).await.unwrap();

    assert_eq!(resource.read_contents(None).await.unwrap(), "v2");
}

// ============================================================================
// Untitled Tests
// ============================================================================

#[tokio::test]
async fn test_untitled_resolve_creates_then_reuses() {
    let resolver = UntitledResourceResolver::new();
    let target = uri("untitled:/Untitled-4.rs");

    let created = resolver.resolve(&target).await.unwrap();
    save(created.as_ref(), &SaveContext::new("fn main() {}"), None)
        .await
        .unwrap();

    let reused = resolver.resolve(&target).await.unwrap();
    assert!(Arc::ptr_eq(&created, &reused));
    assert_eq!(reused.read_contents(None).await.unwrap(), "fn main() {}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_untitled_concurrent_resolves_share_one_instance() {
    let resolver = Arc::new(UntitledResourceResolver::new());
    let target = uri("untitled:/Untitled-2");

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let target = target.clone();
            tokio::spawn(async move { resolver.resolve(&target).await })
        })
        .collect();

    let mut resolved = Vec::new();
    for handle in handles {
        resolved.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(resolver.len(), 1);
    assert!(resolved.iter().all(|r| Arc::ptr_eq(r, &resolved[0])));
}

#[tokio::test]
async fn test_untitled_resolve_after_create_returns_created() {
    let resolver = UntitledResourceResolver::new();
    let created = resolver
        .create_untitled_resource(Some("kept"), None, None)
        .unwrap();

    let resolved = resolver.resolve(created.uri()).await.unwrap();

    assert!(std::ptr::addr_eq(Arc::as_ptr(&created), Arc::as_ptr(&resolved)));
    assert_eq!(resolved.read_contents(None).await.unwrap(), "kept");
}

#[tokio::test]
async fn test_untitled_rejects_other_schemes() {
    let resolver = UntitledResourceResolver::new();
    let err = resolver.resolve(&uri("file:///tmp/x")).await.err().unwrap();
    assert!(matches!(err, ResourceError::UnsupportedScheme { .. }));
}

#[tokio::test]
async fn test_untitled_save_notifies() {
    let resolver = UntitledResourceResolver::new();
    let resource = resolver
        .create_untitled_resource(Some("draft"), Some(".txt"), None)
        .unwrap();
    let mut rx = resource.subscribe().unwrap();

    resource.save_contents("final", None).await.unwrap();

    assert_eq!(resource.uri().as_str(), "untitled:/Untitled-1.txt");
    assert_eq!(resource.read_contents(None).await.unwrap(), "final");
    assert_eq!(rx.try_recv(), Ok(ContentsChanged));
}

#[tokio::test]
async fn test_untitled_explicit_uri_in_use() {
    let resolver = UntitledResourceResolver::new();
    let target = uri("untitled:/Untitled-1");
    resolver
        .create_untitled_resource(None, None, Some(target.clone()))
        .unwrap();

    let err = resolver
        .create_untitled_resource(None, None, Some(target))
        .err()
        .unwrap();
    assert!(err.is_already_exists());
}

// ============================================================================
// In-Memory Text Tests
// ============================================================================

#[tokio::test]
async fn test_memory_text_ignores_saves() {
    let target = uri("mem-txt:/banner?read%20only");
    let resource = InMemoryTextResourceResolver.resolve(&target).await.unwrap();

    save(resource.as_ref(), &SaveContext::new("changed"), None)
        .await
        .unwrap();

    assert!(resource.read_only());
    assert_eq!(resource.read_contents(None).await.unwrap(), "read only");
    assert_eq!(resource.guess_encoding().await.unwrap(), None);
    resource.dispose();
    resource.dispose();
}
