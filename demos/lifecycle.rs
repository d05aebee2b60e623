//! Walkthrough of the arena ownership lifecycle: routing by address, early
//! disposal, and whole-heap teardown.

use tether::{Disposable, Disposer, HeapRegistry, Placement, Region};

struct Asset {
    disposer: Disposer,
    name: &'static str,
}

impl Asset {
    fn new(name: &'static str) -> Self {
        Self {
            disposer: Disposer::new(),
            name,
        }
    }
}

impl Disposable for Asset {
    fn disposer(&self) -> &Disposer {
        &self.disposer
    }

    fn disposer_mut(&mut self) -> &mut Disposer {
        &mut self.disposer
    }

    fn on_dispose(&mut self) {
        println!("  finalized: {}", self.name);
    }
}

fn main() {
    println!("Arena Ownership Walkthrough");
    println!("===========================");

    let mut registry = HeapRegistry::new();
    let main_heap = registry
        .create_heap(Region::new(0x1000_0000, 0x10_0000))
        .unwrap();
    let level_heap = registry
        .create_heap(Region::new(0x2000_0000, 0x8_0000))
        .unwrap();
    println!("registered {main_heap} and {level_heap}");

    // Construction routes by address: whichever heap's region contains the
    // address adopts the object.
    let font = registry
        .construct(0x1000_0040, Asset::new("font atlas"))
        .handle()
        .unwrap();
    registry.construct(0x2000_0040, Asset::new("level geometry"));
    registry.construct(0x2000_1000, Asset::new("level music"));

    println!(
        "main heap holds {}, level heap holds {}",
        registry.heap(main_heap).unwrap().child_count(),
        registry.heap(level_heap).unwrap().child_count(),
    );

    // An address outside every region leaves the value with the caller.
    match registry.construct(0x7777_0000, Asset::new("scratch buffer")) {
        Placement::Unattached(asset) => println!("caller keeps: {}", asset.name),
        Placement::Attached(_) => unreachable!("no region covers that address"),
    }

    // Objects can be disposed ahead of their heap.
    println!("disposing the font atlas early:");
    registry.dispose(font);

    // A level transition is one call: everything the level heap still
    // supervises is finalized, oldest first.
    println!("tearing down {level_heap}:");
    registry.destroy_heap(level_heap);

    println!(
        "main heap survives with {} children",
        registry.heap(main_heap).unwrap().child_count()
    );
}
