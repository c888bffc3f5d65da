//! Example demonstrating the Quire resource layer.
//!
//! This example shows how to:
//! - Register resolvers in a provider chain
//! - Read and save in-memory, untitled and file resources
//! - Save incrementally and observe change notifications
//! - Detect a file modified behind the resource's back

use anyhow::Result;
use quire_core::config::QuireConfig;
use quire_core::logging::init_logging;
use quire_resource::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = QuireConfig::default();
    init_logging(config.general());

    println!("=== Quire Resource Demo ===\n");

    let memory = Arc::new(InMemoryResources::with_config(config.resource()));
    let untitled = Arc::new(UntitledResourceResolver::with_config(config.resource()));
    let registry = Arc::new(ResolverRegistry::new());
    registry.register(memory.clone());
    registry.register(untitled.clone());
    registry.register(Arc::new(InMemoryTextResourceResolver));
    registry.register(Arc::new(FileResourceResolver::with_config(
        config.resource().clone(),
    )));
    let provider = DefaultResourceProvider::new(registry);

    // Example 1: in-memory resource
    println!("1. In-memory resource:");
    let scratch = ResourceUri::parse("inmemory:/scratch.md")?;
    memory.add(&scratch, "# Scratch")?;
    let resource = provider.get(&scratch).await?;
    let mut changes = resource.subscribe().expect("in-memory resources notify");
    save(resource.as_ref(), &SaveContext::new("# Scratch\n\nfilled in"), None).await?;
    println!("   content: {:?}", resource.read_contents(None).await?);
    println!("   notified: {}", changes.try_recv().is_ok());

    // Example 2: untitled resource
    println!("\n2. Untitled resource:");
    let draft = untitled.create_untitled_resource(Some("draft"), Some(".txt"), None)?;
    println!("   uri: {}", draft.uri());
    println!("   content: {:?}", draft.read_contents(None).await?);

    // Example 3: read-only text carried in the URI
    println!("\n3. In-memory text resource:");
    let text = ResourceUri::parse("mem-txt:/banner?Hello%2C%20world")?;
    let resource = provider.get(&text).await?;
    println!("   content: {:?}", resource.read_contents(None).await?);
    println!("   read only: {}", resource.read_only());

    // Example 4: file resource with incremental save
    println!("\n4. File resource:");
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("notes.txt");
    tokio::fs::write(&path, "first line\n".repeat(20)).await?;
    let uri = ResourceUri::from_file_path(&path)?;
    let resource = provider.get(&uri).await?;
    let original = resource.read_contents(None).await?;
    println!("   version: {:?}", resource.version().map(|v| v.to_string()));

    let edited = format!("> {original}");
    let context = SaveContext::new(edited)
        .with_changes(vec![TextDocumentContentChange::insert(Position::new(0, 0), "> ")]);
    save(resource.as_ref(), &context, None).await?;
    println!(
        "   first line now: {:?}",
        tokio::fs::read_to_string(&path).await?.lines().next()
    );

    // Example 5: conflicting external write
    println!("\n5. Out-of-sync detection:");
    tokio::fs::write(&path, "written by someone else").await?;
    match save(resource.as_ref(), &SaveContext::new("mine"), None).await {
        Err(err) if err.is_out_of_sync() => println!("   rejected with code {:?}", err.code()),
        other => println!("   unexpected result: {other:?}"),
    }

    // Example 6: unknown scheme
    println!("\n6. Unregistered scheme:");
    let unknown = ResourceUri::parse("ftp://example.com/file")?;
    if let Err(err) = provider.get(&unknown).await {
        println!("   {err}");
    }

    println!("\n=== All examples completed successfully! ===");
    Ok(())
}
