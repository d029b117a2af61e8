//! Demonstrates tracing integration with layers and async effects
//!
//! Run with: cargo run --example tracing_demo --features tracing,async

use std::sync::Arc;

use wellspring::prelude::*;

#[derive(Debug)]
struct Inventory {
    items: Vec<(&'static str, u32)>,
}

const WAREHOUSE: Tag<String> = Tag::new("warehouse");
const INVENTORY: Tag<Arc<Inventory>> = Tag::new("inventory");

#[tokio::main]
async fn main() {
    // Set up tracing subscriber
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    tracing::info!("Starting tracing demo");

    let env = Environment::empty().with(WAREHOUSE.tagged("north".to_string()));

    // Layer acquire/release and environment extension are logged at debug
    let inventory_layer = Layer::<_, _, String>::from_managed(
        ManagedResource::with_fallible_release(
            |warehouse: String| {
                tracing::info!(%warehouse, "loading inventory");
                Ok(Arc::new(Inventory {
                    items: vec![("bolts", 120), ("nuts", 80), ("washers", 0)],
                }))
            },
            |_| Err("inventory lock already released".to_string()),
        ),
        WAREHOUSE,
        INVENTORY,
    );

    let task = inventory_layer.provide_async(&env, |env| {
        let count_stock = AsyncComputation::new(|inventory: Arc<Inventory>| async move {
            Ok(inventory.items.iter().map(|(_, n)| n).sum::<u32>())
        });
        env.bind(count_stock.requires(INVENTORY))
            .instrument(tracing::info_span!("count_stock", operation = "sum"))
    });

    match task.run().await {
        Ok(total) => tracing::info!("Stock counted: {}", total),
        Err(e) => tracing::error!("Stock count failed: {}", e),
    }

    // Demonstrate concurrent tracing
    tracing::info!("Running concurrent tasks");
    let concurrent = (
        AsyncTask::<_, String>::pure(1).instrument(tracing::info_span!("task-1")),
        AsyncTask::pure(2).instrument(tracing::info_span!("task-2")),
        AsyncTask::pure(3).instrument(tracing::info_span!("task-3")),
    )
        .zip_all()
        .run()
        .await;
    tracing::info!("Concurrent tasks result: {:?}", concurrent);
}
