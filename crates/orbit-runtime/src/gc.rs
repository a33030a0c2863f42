// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Incremental mark-and-sweep collector. Reachability is scoped through
//! the object tree (root's children, recursively), every live object's
//! heap, and every object handle currently sitting in a stack cell;
//! killing is deferred so the scheduler performs the actual deletion,
//! never the collector mid-cycle.

use crate::error::FatalResult;
use crate::object_manager::ObjectManager;
use crate::stack::Stack;


/// Bias toward collecting: even a single unreachable object from the
/// previous cycle is enough to trigger a sweep.
const MIN_FOR_DISPOSAL: usize = 1;

#[derive(Default)]
pub struct Gc {
    worklist: Vec<u32>,
    scanned: usize,
    reachable_count: usize,
    disposed_last_cycle: usize,
    prior_cycle: Option<(usize, usize)>,
}

impl Gc {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn disposed_last_cycle(&self) -> usize {
        self.disposed_last_cycle
    }

    /// One call per tick, after the scheduler traversal. Starts a new
    /// cycle if the previous one finished, then performs one scan
    /// increment.
    pub fn garbage_check(&mut self, manager: &mut ObjectManager, stack: &mut Stack) -> FatalResult<()> {
        if self.worklist.is_empty() || self.scanned_fully() {
            self.start_cycle(manager, stack)?;
        }
        self.increment(manager)
    }

    /// Force a full cycle to completion immediately — used by
    /// `__GC.collect()`.
    pub fn collect(&mut self, manager: &mut ObjectManager, stack: &mut Stack) -> FatalResult<()> {
        self.start_cycle(manager, stack)?;
        while !self.scanned_fully() {
            self.increment(manager)?;
        }
        Ok(())
    }

    fn scanned_fully(&self) -> bool {
        !self.worklist.is_empty() && self.scanned == self.worklist.len()
    }

    fn start_cycle(&mut self, manager: &mut ObjectManager, stack: &mut Stack) -> FatalResult<()> {
        if !manager.exists(manager.root()) {
            return Ok(());
        }

        if let Some((total, reachable)) = self.prior_cycle {
            let unreachable = total.saturating_sub(reachable);
            if unreachable >= MIN_FOR_DISPOSAL {
                self.disposed_last_cycle = self.kill_unreachable(manager)?;
                tracing::info!(disposed = self.disposed_last_cycle, "gc cycle swept unreachable objects");
            } else {
                self.disposed_last_cycle = 0;
            }
            self.clear_reachable_flags(manager)?;
        }

        self.worklist.clear();
        self.scanned = 0;
        self.reachable_count = 0;

        let root = manager.root();
        self.mark_reachable(manager, root)?;

        let mut live = Vec::new();
        stack.scan_objects(|handle| {
            let ok = manager.exists(handle);
            if ok {
                live.push(handle);
            }
            ok
        });
        for handle in live {
            self.mark_reachable(manager, handle)?;
        }
        Ok(())
    }

    fn increment(&mut self, manager: &mut ObjectManager) -> FatalResult<()> {
        let end = self.worklist.len();
        let mut discovered = Vec::new();
        while self.scanned < end {
            let handle = self.worklist[self.scanned];
            self.scanned += 1;
            if let Ok(obj) = manager.get(handle) {
                obj.heap().scan_objects(|h| discovered.push(h));
                discovered.extend(obj.children().iter().copied());
            }
        }
        for handle in discovered {
            if manager.exists(handle) {
                self.mark_reachable(manager, handle)?;
            }
        }
        if self.scanned_fully() {
            self.prior_cycle = Some((manager.count(), self.reachable_count));
        }
        Ok(())
    }

    fn mark_reachable(&mut self, manager: &mut ObjectManager, handle: u32) -> FatalResult<()> {
        let obj = manager.get_mut(handle)?;
        if obj.reachable {
            return Ok(());
        }
        obj.reachable = true;
        self.reachable_count += 1;
        self.worklist.push(handle);
        Ok(())
    }

    fn kill_unreachable(&mut self, manager: &mut ObjectManager) -> FatalResult<usize> {
        let handles: Vec<u32> = manager.handles().collect();
        let mut killed = 0;
        for handle in handles {
            let reachable = manager.get(handle)?.reachable;
            if !reachable {
                manager.get_mut(handle)?.kill();
                killed += 1;
            }
        }
        Ok(killed)
    }

    fn clear_reachable_flags(&mut self, manager: &mut ObjectManager) -> FatalResult<()> {
        for handle in manager.handles().collect::<Vec<_>>() {
            manager.get_mut(handle)?.reachable = false;
        }
        Ok(())
    }
}
