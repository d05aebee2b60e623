//! Emits a JSON usage snapshot of a registry, the shape a monitoring or
//! debugging pipeline would ingest.

use std::any::Any;

use tether::{Disposable, Disposer, HeapRegistry, Region};

struct Blob {
    disposer: Disposer,
    bytes: usize,
}

impl Blob {
    fn new(bytes: usize) -> Self {
        Self {
            disposer: Disposer::new(),
            bytes,
        }
    }
}

impl Disposable for Blob {
    fn disposer(&self) -> &Disposer {
        &self.disposer
    }

    fn disposer_mut(&mut self) -> &mut Disposer {
        &mut self.disposer
    }
}

fn main() {
    let mut registry = HeapRegistry::new();
    let _ = registry
        .create_heap(Region::new(0x1000_0000, 0x10_0000))
        .unwrap();
    let _ = registry
        .create_heap(Region::new(0x2000_0000, 0x4_0000))
        .unwrap();

    registry.construct(0x1000_0000, Blob::new(4096));
    registry.construct(0x1000_2000, Blob::new(512));
    let short_lived = registry
        .construct(0x2000_0000, Blob::new(64 * 1024))
        .handle()
        .unwrap();
    registry.construct(0x2000_8000, Blob::new(1024));
    registry.dispose(short_lived);

    let heaps: Vec<serde_json::Value> = registry
        .heaps()
        .map(|(id, heap)| {
            let bytes_live: usize = heap
                .children()
                .filter_map(|(_, child)| (child as &dyn Any).downcast_ref::<Blob>())
                .map(|blob| blob.bytes)
                .sum();
            serde_json::json!({
                "id": id.to_string(),
                "stats": heap.stats(),
                "bytes_live": bytes_live,
            })
        })
        .collect();

    let report = serde_json::json!({
        "registry": registry.stats(),
        "heaps": heaps,
    });
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}
