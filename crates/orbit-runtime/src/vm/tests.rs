// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

use super::*;
use crate::program::{Instruction, Op};

fn counter_program() -> Program {
    let mut prog = Program::new(0, 0);
    prog.emit(Instruction::new(Op::HeapPeek, 0, 0, 0));
    prog.emit(Instruction::new(Op::Inc, 0, 0, 0));
    prog.emit(Instruction::new(Op::HeapPoke, 0, 0, 0));
    prog.emit(Instruction::new(Op::Ret, 0, 0, 0));
    prog
}

/// Equivalent to a script's `Application.exit();`, hand-assembled since
/// there's no compiler in this crate to lower it from source.
fn exit_on_first_tick_program() -> Program {
    let mut prog = Program::new(0, 1);
    let application = prog.add_constant(Value::String("Application".to_string().into()));
    let exit_name = prog.add_constant(Value::String("exit".to_string().into()));
    prog.emit(Instruction::new(Op::MoveSystemObject, 0, application as i32, 0));
    prog.emit(Instruction::new(Op::Push, 0, 0, 0));
    prog.emit(Instruction::new(Op::StackPoke, 0, 1, 0));
    prog.emit(Instruction::new(Op::StackPeek, 1, 1, 0));
    prog.emit(Instruction::new(Op::Call, exit_name as i32, 1, 0));
    prog.emit(Instruction::new(Op::Ret, 0, 0, 0));
    prog
}

#[test]
fn launch_spawns_the_fixed_system_objects_under_the_root() {
    let mut vm = Vm::new();
    vm.launch().unwrap();

    assert!(vm.is_launched());
    assert!(vm.find("Application").is_some());
    assert!(vm.find("Console").is_some());
    assert!(vm.find("System").is_none(), "System is the root itself, not a child of it");
}

#[test]
fn ticking_runs_state_main_on_spawned_objects() {
    let mut vm = Vm::new();
    vm.register_program("Counter", "state:main", counter_program());
    vm.launch().unwrap();

    let counter = vm.spawn(vm.root(), "Counter").unwrap();
    vm.objects_mut().get_mut(counter).unwrap().heap_mut().alloc().unwrap();

    for _ in 0..3 {
        assert!(vm.update(0.0).unwrap());
    }

    assert_eq!(*vm.objects().get(counter).unwrap().heap().at(0).unwrap(), Value::Number(3.0));
}

#[test]
fn update_returns_false_once_root_observes_the_exit_flag() {
    let mut vm = Vm::new();
    vm.launch().unwrap();

    let app = vm.find("Application").unwrap();
    vm.call(app, "exit", &[]).unwrap();

    // The flag is already false before root's state:main has run even
    // once this session, so the very next tick notices it and kills root.
    assert!(!vm.update(0.0).unwrap());
}

#[test]
fn exit_called_mid_tick_takes_one_more_tick_than_exit_called_up_front() {
    let mut vm = Vm::new();
    vm.register_program("Caller", "state:main", exit_on_first_tick_program());
    vm.launch().unwrap();
    vm.spawn(vm.root(), "Caller").unwrap();

    // Root's own state:main already ran earlier in this same tick, before
    // "Caller" (a later sibling) sets the flag — so root only notices it
    // next tick.
    assert!(vm.update(0.0).unwrap());
    assert!(!vm.update(0.0).unwrap());
}

#[test]
fn set_application_args_is_visible_to_the_args_accessor() {
    let mut vm = Vm::new();
    vm.launch().unwrap();
    vm.set_application_args(vec!["--level".to_string(), "3".to_string()]);

    let app = vm.find("Application").unwrap();
    let args = vm.call(app, "args", &[]).unwrap();
    let Value::ObjectHandle(array) = args else { panic!("expected an Array handle, got {args:?}") };
    let length = vm.call(array, "getLength", &[]).unwrap();
    assert_eq!(length, Value::Number(2.0));
}

#[test]
fn set_application_args_before_launch_is_a_harmless_no_op() {
    let mut vm = Vm::new();
    vm.set_application_args(vec!["too-early".to_string()]);
    vm.launch().unwrap();
    assert!(vm.is_launched());
}
