// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! The VM: owns every piece of shared state (object tree, stack,
//! program pool, tag system, GC, native bindings) and drives the
//! tick loop.

use crate::error::FatalResult;
use crate::gc::Gc;
use crate::interpreter::{Interpreter, NativeFn, NativeRegistry, Runtime};
use crate::object_manager::ObjectManager;
use crate::program::Program;
use crate::program_pool::ProgramPool;
use crate::scheduler::Scheduler;
use crate::stack::Stack;
use crate::stdlib;
use crate::tag_system::TagSystem;
use orbit_core::Value;

#[cfg(test)]
mod tests;

pub struct Vm {
    objects: ObjectManager,
    stack: Stack,
    programs: ProgramPool,
    tags: TagSystem,
    natives: NativeRegistry,
    gc: Gc,
    now: f64,
    launched: bool,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: ObjectManager::new(),
            stack: Stack::new(),
            programs: ProgramPool::new(),
            tags: TagSystem::new(),
            natives: NativeRegistry::new(),
            gc: Gc::new(),
            now: 0.0,
            launched: false,
        }
    }

    pub(crate) fn runtime(&mut self) -> Runtime<'_> {
        Runtime {
            objects: &mut self.objects,
            stack: &mut self.stack,
            programs: &self.programs,
            natives: &self.natives,
            gc: &mut self.gc,
            tags: &self.tags,
            now: self.now,
        }
    }

    /// Install a compiled program under `(object_name, program_name)`.
    /// The compiler pipeline calls this once per declaration; it is also
    /// how `vm_bind`-equivalent setup for a scripted (non-native) object
    /// happens.
    pub fn register_program(&mut self, object_name: &str, program_name: &str, program: Program) {
        self.programs.register(object_name, program_name, program);
    }

    pub fn tag(&mut self, object_name: &str, tag: &str) {
        self.tags.add_tag(object_name, tag);
    }

    #[must_use]
    pub fn tags(&self) -> &TagSystem {
        &self.tags
    }

    /// Bind a native function as `(object_name, function_name)`, shadowing
    /// any bytecode program registered under the same key.
    pub fn bind(&mut self, object_name: &str, function_name: &str, f: NativeFn) {
        self.natives.bind(object_name, function_name, f);
    }

    /// Initialise the standard library in its fixed order and spawn the
    /// root. Must be called exactly once, after every compilation unit
    /// has been registered and before the first `update`.
    pub fn launch(&mut self) -> FatalResult<()> {
        self.objects.spawn_root()?;
        stdlib::install(self)?;
        self.launched = true;
        tracing::info!("vm launched");
        Ok(())
    }

    #[must_use]
    pub fn is_launched(&self) -> bool {
        self.launched
    }

    #[must_use]
    pub fn root(&self) -> u32 {
        self.objects.root()
    }

    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.count()
    }

    #[must_use]
    pub fn objects(&self) -> &ObjectManager {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut ObjectManager {
        &mut self.objects
    }

    /// Stash the host's command-line arguments on `Application`, for its
    /// `args` accessor to expose as an `Array`. A no-op if `Application`
    /// hasn't been spawned yet (i.e. called before [`Self::launch`]).
    pub fn set_application_args(&mut self, args: Vec<String>) {
        if let Some(handle) = self.find("Application") {
            self.objects.get_mut(handle).expect("Application handle just looked up").user_data =
                crate::object::UserData::Args(args);
        }
    }

    /// First direct child of the root with the given name (how scripts
    /// reach the always-spawned system objects, e.g. `Application`).
    #[must_use]
    pub fn find(&self, name: &str) -> Option<u32> {
        self.objects.find_child_by_name(self.objects.root(), name).ok().flatten()
    }

    /// Spawn an object under `parent` and run its constructor chain
    /// (`__ssconstructor` then, if declared, `constructor`).
    pub fn spawn(&mut self, parent: u32, name: &str) -> FatalResult<u32> {
        let handle = self.objects.spawn(parent, name)?;

        if self.programs.has(name, "__ssconstructor") || self.natives.get(name, "__ssconstructor").is_some() {
            let mut rt = self.runtime();
            Interpreter::invoke(&mut rt, handle, "__ssconstructor", &[])?;
        }
        if self.programs.has(name, "constructor") || self.natives.get(name, "constructor").is_some() {
            let mut rt = self.runtime();
            Interpreter::invoke(&mut rt, handle, "constructor", &[])?;
        }
        Ok(handle)
    }

    /// Call an arbitrary program on an object from outside the tick
    /// loop (used by `vm_bind`-registered host callbacks and tests).
    pub fn call(&mut self, object: u32, program_name: &str, params: &[Value]) -> FatalResult<Value> {
        let mut rt = self.runtime();
        Interpreter::invoke(&mut rt, object, program_name, params)
    }

    /// Run one tick: a scheduler pass over the whole tree, followed by
    /// one GC increment. `dt` is the elapsed real time in seconds since
    /// the previous call, accumulated for `timeout()`/`__GC` to observe.
    /// Returns `false` once the root has been killed — the VM is finished
    /// and must not be updated again. A killed root is only actually
    /// unlinked from the tree on the tick after that (the same one-tick
    /// deferral every other object gets), so this checks the flag
    /// directly rather than waiting for that cleanup to happen.
    pub fn update(&mut self, dt: f64) -> FatalResult<bool> {
        self.now += dt;

        if self.root_is_finished() {
            return Ok(false);
        }

        {
            let mut rt = self.runtime();
            Scheduler::tick(&mut rt)?;
        }

        if self.root_is_finished() {
            tracing::info!("root killed, vm finished");
            return Ok(false);
        }

        self.gc.garbage_check(&mut self.objects, &mut self.stack)?;
        Ok(true)
    }

    fn root_is_finished(&self) -> bool {
        let root = self.objects.root();
        match self.objects.get(root) {
            Ok(r) => r.is_killed(),
            Err(_) => true,
        }
    }
}
