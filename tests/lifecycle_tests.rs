//! End-to-end lifecycle tests: construction routing, early disposal, heap
//! teardown, and handle staleness across the whole registry surface.

use std::cell::RefCell;
use std::rc::Rc;

use tether::{Disposable, Disposer, HeapRegistry, Placement, Region};

type Log = Rc<RefCell<Vec<String>>>;

struct Resource {
    disposer: Disposer,
    name: String,
    log: Log,
}

impl Resource {
    fn new(name: &str, log: &Log) -> Self {
        Self {
            disposer: Disposer::new(),
            name: name.to_owned(),
            log: Rc::clone(log),
        }
    }
}

impl Disposable for Resource {
    fn disposer(&self) -> &Disposer {
        &self.disposer
    }

    fn disposer_mut(&mut self) -> &mut Disposer {
        &mut self.disposer
    }

    fn on_dispose(&mut self) {
        self.log.borrow_mut().push(self.name.clone());
    }
}

/// A type that never overrides the finalization hook.
struct Plain {
    disposer: Disposer,
    value: u64,
}

impl Disposable for Plain {
    fn disposer(&self) -> &Disposer {
        &self.disposer
    }

    fn disposer_mut(&mut self) -> &mut Disposer {
        &mut self.disposer
    }
}

const MAIN: Region = Region::new(0x1_0000, 0x1000);
const LEVEL: Region = Region::new(0x2_0000, 0x800);

#[test]
fn test_construction_routes_by_address_across_heaps() {
    let log = Log::default();
    let mut registry = HeapRegistry::new();
    let main = registry.create_heap(MAIN).unwrap();
    let level = registry.create_heap(LEVEL).unwrap();

    let in_main = registry
        .construct(0x1_0040, Resource::new("main-obj", &log))
        .handle()
        .unwrap();
    let in_level = registry
        .construct(0x2_0040, Resource::new("level-obj", &log))
        .handle()
        .unwrap();

    assert_eq!(in_main.heap(), main);
    assert_eq!(in_level.heap(), level);
    assert_eq!(registry.heap(main).unwrap().child_count(), 1);
    assert_eq!(registry.heap(level).unwrap().child_count(), 1);

    assert_eq!(
        registry.disposer(in_main).unwrap().owning_heap(),
        Some(main)
    );
    assert!(registry.disposer(in_main).unwrap().is_attached());
}

#[test]
fn test_tight_region_attaches_inside_and_declines_past_the_end() {
    // A region sized for exactly one object's placement.
    let log = Log::default();
    let mut registry = HeapRegistry::new();
    let heap = registry.create_heap(Region::new(0x4000, 0x20)).unwrap();

    let inside = registry.construct(0x4000, Resource::new("fits", &log));
    assert!(inside.is_attached());
    assert_eq!(registry.heap(heap).unwrap().child_count(), 1);

    // One past the end of the half-open region: the caller keeps the value.
    let outside = registry.construct(0x4020, Resource::new("spills", &log));
    let spilled = match outside {
        Placement::Unattached(value) => value,
        Placement::Attached(_) => panic!("address past the region end was adopted"),
    };
    assert!(!spilled.disposer().is_attached());
    assert_eq!(spilled.disposer().owning_heap(), None);
    assert_eq!(registry.heap(heap).unwrap().child_count(), 1);

    // Dropping the unattached value never reaches the finalization hook.
    drop(spilled);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_teardown_leaves_live_unattached_values_untouched() {
    let log = Log::default();
    let mut registry = HeapRegistry::new();
    let heap = registry.create_heap(Region::new(0x6000, 0x40)).unwrap();

    let inside = registry
        .construct(0x6000, Resource::new("x", &log))
        .handle()
        .unwrap();
    assert_eq!(registry.heap(heap).unwrap().child_count(), 1);

    // Outside every region: the caller keeps this one alive on its own.
    let outside = registry
        .construct(0x9999_0000, Resource::new("y", &log))
        .into_unattached()
        .unwrap();
    assert_eq!(registry.heap(heap).unwrap().child_count(), 1);

    assert!(registry.dispose(inside));
    assert_eq!(registry.heap(heap).unwrap().child_count(), 0);

    // Tearing the arena down while the freestanding value is still live
    // must not touch it: it was never a member of the child list.
    assert!(registry.destroy_heap(heap));
    assert_eq!(*log.borrow(), ["x"]);
    assert!(!outside.disposer().is_attached());
    assert_eq!(outside.disposer().owning_heap(), None);
    assert_eq!(outside.name, "y");

    drop(outside);
    assert_eq!(*log.borrow(), ["x"]);
}

#[test]
fn test_unattached_value_can_be_adopted_later_at_a_real_address() {
    let log = Log::default();
    let mut registry = HeapRegistry::new();
    let main = registry.create_heap(MAIN).unwrap();

    let stray = registry
        .construct(0xdead_0000, Resource::new("stray", &log))
        .into_unattached()
        .unwrap();

    // Same value, this time at an address the main heap covers.
    let handle = registry.construct(0x1_0080, stray).handle().unwrap();
    assert_eq!(handle.heap(), main);
    assert!(registry.contains(handle));
    assert!(registry.dispose(handle));
    assert_eq!(*log.borrow(), ["stray"]);
}

#[test]
fn test_early_disposal_then_teardown_finalizes_each_exactly_once() {
    let log = Log::default();
    let mut registry = HeapRegistry::new();
    let heap = registry.create_heap(MAIN).unwrap();

    let mut handles = Vec::new();
    for (offset, name) in [(0x00, "a"), (0x10, "b"), (0x20, "c")] {
        let handle = registry
            .construct(0x1_0000 + offset, Resource::new(name, &log))
            .handle()
            .unwrap();
        handles.push(handle);
    }

    // Remove the middle object ahead of teardown.
    assert!(registry.dispose(handles[1]));
    assert_eq!(*log.borrow(), ["b"]);
    assert_eq!(registry.heap(heap).unwrap().child_count(), 2);

    // Teardown walks the survivors oldest first.
    assert!(registry.destroy_heap(heap));
    assert_eq!(*log.borrow(), ["b", "a", "c"]);

    // Nothing resolves afterwards, and repeat disposal stays silent.
    for handle in handles {
        assert!(!registry.contains(handle));
        assert!(!registry.dispose(handle));
    }
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn test_handles_stay_stale_when_a_region_is_reregistered() {
    let log = Log::default();
    let mut registry = HeapRegistry::new();

    let first = registry.create_heap(MAIN).unwrap();
    let old_handle = registry
        .construct(0x1_0000, Resource::new("old", &log))
        .handle()
        .unwrap();
    assert!(registry.destroy_heap(first));

    // Same region, brand new heap. Old identities must not resurrect.
    let second = registry.create_heap(MAIN).unwrap();
    assert_ne!(first, second);
    assert!(registry.heap(first).is_none());
    assert!(!registry.contains(old_handle));
    assert!(!registry.dispose(old_handle));

    let new_handle = registry
        .construct(0x1_0000, Resource::new("new", &log))
        .handle()
        .unwrap();
    assert!(registry.contains(new_handle));
    assert_eq!(*log.borrow(), ["old"]);
}

#[test]
fn test_default_hook_types_dispose_silently() {
    let mut registry = HeapRegistry::new();
    let heap = registry.create_heap(MAIN).unwrap();

    let handle = registry
        .construct(0x1_0100, Plain {
            disposer: Disposer::new(),
            value: 41,
        })
        .handle()
        .unwrap();

    registry.get_as_mut::<Plain>(handle).unwrap().value += 1;
    assert_eq!(registry.get_as::<Plain>(handle).unwrap().value, 42);
    assert!(registry.dispose(handle));
    assert!(registry.get_as::<Plain>(handle).is_none());
    assert!(registry.heap(heap).unwrap().is_empty());
}

#[test]
fn test_children_iteration_tracks_construction_order() {
    let log = Log::default();
    let mut registry = HeapRegistry::new();
    let heap = registry.create_heap(MAIN).unwrap();

    for (offset, name) in [(0x00, "first"), (0x10, "second"), (0x20, "third")] {
        registry.construct(0x1_0000 + offset, Resource::new(name, &log));
    }
    let second = registry.heap(heap).unwrap().children().nth(1).unwrap().0;
    assert!(registry.dispose(second));

    let names: Vec<&str> = registry
        .heap(heap)
        .unwrap()
        .children()
        .map(|(_, child)| {
            (child as &dyn std::any::Any)
                .downcast_ref::<Resource>()
                .unwrap()
                .name
                .as_str()
        })
        .collect();
    assert_eq!(names, ["first", "third"]);
}

#[test]
fn test_registry_drop_is_a_full_teardown() {
    let log = Log::default();
    {
        let mut registry = HeapRegistry::new();
        let _ = registry.create_heap(MAIN).unwrap();
        let _ = registry.create_heap(LEVEL).unwrap();
        registry.construct(0x1_0000, Resource::new("m1", &log));
        registry.construct(0x1_0010, Resource::new("m2", &log));
        registry.construct(0x2_0000, Resource::new("l1", &log));
    }
    // Every survivor is finalized, and within a heap the order is oldest
    // first. Ordering across heaps is not part of the contract.
    let entries = log.borrow().clone();
    assert_eq!(entries.len(), 3);
    let m1 = entries.iter().position(|n| n == "m1").unwrap();
    let m2 = entries.iter().position(|n| n == "m2").unwrap();
    assert!(m1 < m2);
    assert!(entries.iter().any(|n| n == "l1"));
}

#[test]
fn test_stats_snapshot_serializes_for_reporting() {
    let log = Log::default();
    let mut registry = HeapRegistry::new();
    let heap = registry.create_heap(MAIN).unwrap();
    registry.construct(0x1_0000, Resource::new("kept", &log));
    let dropped = registry
        .construct(0x1_0010, Resource::new("dropped", &log))
        .handle()
        .unwrap();
    registry.dispose(dropped);

    let stats = registry.stats();
    assert_eq!(stats.heaps, 1);
    assert_eq!(stats.children, 1);
    assert_eq!(stats.child_slots, 2);

    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(json["heaps"], 1);
    assert_eq!(json["children"], 1);

    let heap_json = serde_json::to_value(registry.heap(heap).unwrap().stats()).unwrap();
    assert_eq!(heap_json["region"]["start"], 0x1_0000);
    assert_eq!(heap_json["children"], 1);
}
