//! A small fleet: a primary store, a cache that depends on it, and a flaky
//! queue that needs a few connect attempts.
//!
//! Run with: cargo run -p lifeline --example fleet --features memory

use lifeline::memory::MemoryStore;
use lifeline::{
    Builder, Context, Kind, Manager, ReconnectConfig, Resource, ResourceMetrics, Tracer,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let reconnect = ReconnectConfig::builder()
        .max_retries(3)
        .initial_interval(Duration::from_millis(50))
        .max_interval(Duration::from_millis(400))
        .on_retry(|attempt, delay| {
            println!("  attempt {attempt} failed, retrying in {delay:?}");
        })
        .on_reconnect(|cause| println!("  reconnecting after: {cause}"))
        .build();

    let primary = Arc::new(MemoryStore::new("primary").with_kind(Kind::POSTGRESQL));
    let cache = Arc::new(MemoryStore::new("cache").with_kind(Kind::REDIS));
    let queue = Arc::new(MemoryStore::new("queue").with_kind(Kind::KAFKA));
    queue.fail_connects(2);

    let manager = Manager::new();
    for store in [&primary, &cache, &queue] {
        let resource = Builder::new(store.clone())
            .with_reconnect(reconnect.clone())
            .with_tracing(Tracer::default())
            .with_metrics(ResourceMetrics::default())
            .build();
        manager.register(resource)?;
    }

    let cx = Context::new().with_timeout(Duration::from_secs(5));

    println!("connecting {:?}", manager.list());
    manager.connect_all(&cx).await?;

    cache.set("greeting", "hello")?;
    println!("cache holds {} key(s)", cache.len()?);

    println!("severing the cache connection");
    cache.sever();

    for status in manager.health_check(&cx).await {
        println!("{}", serde_json::to_string(&status)?);
    }
    println!(
        "cache after self-healing ping: {} (data kept: {:?})",
        cache.state(),
        cache.get("greeting")?.map(String::from_utf8)
    );

    println!("closing in reverse order");
    manager.close_all(&cx).await?;
    Ok(())
}
