// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

use super::*;
use crate::gc::Gc;
use crate::interpreter::NativeRegistry;
use crate::object_manager::ObjectManager;
use crate::program::{Instruction, Op, Program};
use crate::program_pool::ProgramPool;
use crate::stack::Stack;
use crate::tag_system::TagSystem;
use orbit_core::Value;

fn counter_program() -> Program {
    let mut prog = Program::new(0, 0);
    prog.emit(Instruction::new(Op::HeapPeek, 0, 0, 0));
    prog.emit(Instruction::new(Op::Inc, 0, 0, 0));
    prog.emit(Instruction::new(Op::HeapPoke, 0, 0, 0));
    prog.emit(Instruction::new(Op::Ret, 0, 0, 0));
    prog
}

#[test]
fn active_object_runs_state_main_every_tick() {
    let mut mgr = ObjectManager::new();
    let root = mgr.spawn_root().unwrap();
    let counter = mgr.spawn(root, "Counter").unwrap();
    mgr.get_mut(counter).unwrap().heap_mut().alloc().unwrap();

    let mut pool = ProgramPool::new();
    pool.register("Counter", "state:main", counter_program());
    let natives = NativeRegistry::new();
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();

    for _ in 0..3 {
        let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };
        Scheduler::tick(&mut rt).unwrap();
    }

    assert_eq!(*mgr.get(counter).unwrap().heap().at(0).unwrap(), Value::Number(3.0));
}

#[test]
fn inactive_object_subtree_is_skipped() {
    let mut mgr = ObjectManager::new();
    let root = mgr.spawn_root().unwrap();
    let paused = mgr.spawn(root, "Paused").unwrap();
    mgr.get_mut(paused).unwrap().set_active(false);
    let inner = mgr.spawn(paused, "Counter").unwrap();
    mgr.get_mut(inner).unwrap().heap_mut().alloc().unwrap();

    let mut pool = ProgramPool::new();
    pool.register("Counter", "state:main", counter_program());
    let natives = NativeRegistry::new();
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();
    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };
    Scheduler::tick(&mut rt).unwrap();

    assert_eq!(*mgr.get(inner).unwrap().heap().at(0).unwrap(), Value::Null, "inactive parent must skip its whole subtree");
}

fn mark_parent_destroyed(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    let parent = rt.objects.get(object)?.parent();
    *rt.objects.get_mut(parent)?.heap_mut().at_mut(0)? = Value::Bool(true);
    Ok(Value::Null)
}

#[test]
fn killed_object_is_destroyed_on_next_visit_and_runs_its_destructor() {
    let mut mgr = ObjectManager::new();
    let root = mgr.spawn_root().unwrap();
    mgr.get_mut(root).unwrap().heap_mut().alloc().unwrap();
    let child = mgr.spawn(root, "Temp").unwrap();
    mgr.get_mut(child).unwrap().kill();

    let pool = ProgramPool::new();
    let mut natives = NativeRegistry::new();
    natives.bind("Temp", "__destructor", mark_parent_destroyed);
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();
    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };
    Scheduler::tick(&mut rt).unwrap();

    assert!(!mgr.exists(child));
    assert_eq!(*mgr.get(root).unwrap().heap().at(0).unwrap(), Value::Bool(true));
}

#[test]
fn killing_a_parent_also_destroys_its_grandchildren_without_error() {
    let mut mgr = ObjectManager::new();
    let root = mgr.spawn_root().unwrap();
    let parent = mgr.spawn(root, "Parent").unwrap();
    let child = mgr.spawn(parent, "Child").unwrap();
    let grandchild = mgr.spawn(child, "Grandchild").unwrap();
    mgr.get_mut(parent).unwrap().kill();

    let pool = ProgramPool::new();
    let natives = NativeRegistry::new();
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();
    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };
    Scheduler::tick(&mut rt).unwrap();

    assert!(!mgr.exists(parent));
    assert!(!mgr.exists(child));
    assert!(!mgr.exists(grandchild));
}

#[test]
fn spawns_made_during_a_tick_are_visited_in_the_same_tick() {
    fn spawn_child(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
        let child = rt.objects.spawn(object, "Counter")?;
        rt.objects.get_mut(child)?.heap_mut().alloc()?;
        Ok(Value::Null)
    }

    let mut mgr = ObjectManager::new();
    let root = mgr.spawn_root().unwrap();

    let mut pool = ProgramPool::new();
    pool.register("Counter", "state:main", counter_program());
    let mut natives = NativeRegistry::new();
    natives.bind("System", "state:main", spawn_child);
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();
    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };
    Scheduler::tick(&mut rt).unwrap();

    let children = mgr.get(root).unwrap().children().to_vec();
    assert_eq!(children.len(), 1);
    assert_eq!(*mgr.get(children[0]).unwrap().heap().at(0).unwrap(), Value::Number(1.0), "the newly spawned child's own state:main must run in the same tick");
}
