// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

use super::*;

#[test]
fn alloc_returns_stable_address() {
    let mut heap = Heap::new();
    let a = heap.alloc().unwrap();
    *heap.at_mut(a).unwrap() = Value::Number(42.0);
    assert_eq!(heap.at(a).unwrap().to_number(), 42.0);
}

#[test]
fn free_then_access_is_fatal() {
    let mut heap = Heap::new();
    let a = heap.alloc().unwrap();
    heap.free(a);
    assert!(matches!(heap.at(a), Err(FatalError::HeapOutOfRange { .. })));
}

#[test]
fn double_free_is_tolerated() {
    let mut heap = Heap::new();
    let a = heap.alloc().unwrap();
    heap.free(a);
    heap.free(a); // must not panic
}

#[test]
fn out_of_range_access_is_fatal() {
    let heap = Heap::new();
    assert!(matches!(heap.at(9999), Err(FatalError::HeapOutOfRange { .. })));
}

#[test]
fn heap_grows_when_full() {
    let mut heap = Heap::new();
    let initial_cap = heap.capacity();
    let mut addrs = Vec::new();
    for _ in 0..=initial_cap {
        addrs.push(heap.alloc().unwrap());
    }
    assert!(heap.capacity() > initial_cap);
    // every returned address is distinct
    let mut sorted = addrs.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), addrs.len());
}

#[test]
fn ceiling_is_enforced() {
    let mut heap = Heap::with_ceiling(8); // smaller than INITIAL_SIZE*2
    for _ in 0..16 {
        let _ = heap.alloc();
    }
    let result = heap.alloc();
    assert!(result.is_err() || heap.capacity() <= 8);
}

#[test]
fn scan_objects_reports_only_handles() {
    let mut heap = Heap::new();
    let a = heap.alloc().unwrap();
    let b = heap.alloc().unwrap();
    *heap.at_mut(a).unwrap() = Value::object_handle(7);
    *heap.at_mut(b).unwrap() = Value::Number(1.0);

    let mut seen = Vec::new();
    heap.scan_objects(|h| seen.push(h));
    assert_eq!(seen, vec![7]);
}

#[test]
fn freed_slot_is_reused_before_growing() {
    let mut heap = Heap::new();
    let cap = heap.capacity();
    let mut addrs: Vec<_> = (0..cap).map(|_| heap.alloc().unwrap()).collect();
    let freed = addrs.remove(0);
    heap.free(freed);
    let reused = heap.alloc().unwrap();
    assert_eq!(heap.capacity(), cap, "a freed cell must be reused before growing");
    assert!(heap.at(reused).is_ok());
}
