// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! One tick: a depth-first, parent-before-children walk of the object
//! tree, running `state:<name>` on every active object and cooperatively
//! destroying killed ones.

use crate::error::FatalResult;
use crate::interpreter::{Interpreter, Runtime};
use crate::object_manager::ObjectManager;

#[cfg(test)]
mod tests;

pub struct Scheduler;

impl Scheduler {
    /// Run one tick starting at the root.
    pub fn tick(rt: &mut Runtime) -> FatalResult<()> {
        let root = rt.objects.root();
        Self::visit(rt, root)
    }

    fn visit(rt: &mut Runtime, handle: u32) -> FatalResult<()> {
        if !rt.objects.exists(handle) {
            return Ok(());
        }

        if rt.objects.get(handle)?.is_killed() {
            Self::destroy_subtree(rt, handle)?;
            return Ok(());
        }

        if !rt.objects.get(handle)?.is_active() {
            return Ok(());
        }

        let name = rt.objects.get(handle)?.name().to_string();
        let state_program = format!("state:{}", rt.objects.get(handle)?.state());
        if rt.programs.has(&name, &state_program) || rt.natives.get(&name, &state_program).is_some() {
            Interpreter::invoke(rt, handle, &state_program, &[])?;
        }

        if !rt.objects.exists(handle) {
            return Ok(());
        }
        // Re-read children after running the state program: spawns made
        // during this tick must be visited within the same tick.
        let children = rt.objects.get(handle)?.children().to_vec();
        for child in children {
            Self::visit(rt, child)?;
        }
        Ok(())
    }

    /// Destroy `handle` and its whole subtree, root first. `delete`
    /// itself owns the recursion over `children()` and the actual
    /// unlinking; this only supplies the `on_destroy` callback that runs
    /// `__destructor` for each object just before it's unlinked, with
    /// the object table handed back in so destructor scripts can still
    /// read/write it.
    fn destroy_subtree(rt: &mut Runtime, handle: u32) -> FatalResult<()> {
        let stack = &mut *rt.stack;
        let programs = rt.programs;
        let natives = rt.natives;
        let gc = &mut *rt.gc;
        let tags = rt.tags;
        let now = rt.now;

        rt.objects.delete(handle, &mut |objects: &mut ObjectManager, h: u32| {
            let name = objects.get(h)?.name().to_string();
            if programs.has(&name, "__destructor") || natives.get(&name, "__destructor").is_some() {
                let mut inner = Runtime { objects, stack: &mut *stack, programs, natives, gc: &mut *gc, tags, now };
                Interpreter::invoke(&mut inner, h, "__destructor", &[])?;
            }
            Ok(())
        })
    }
}
