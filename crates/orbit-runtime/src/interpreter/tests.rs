// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

use super::*;
use crate::object_manager::ObjectManager;
use crate::program::Instruction;

fn spawn_object(mgr: &mut ObjectManager, name: &str) -> u32 {
    let root = if mgr.exists(mgr.root()) { mgr.root() } else { mgr.spawn_root().unwrap() };
    mgr.spawn(root, name).unwrap()
}

#[test]
fn call_ret_round_trip_leaves_stack_unchanged() {
    let mut mgr = ObjectManager::new();
    let obj = spawn_object(&mut mgr, "Adder");

    let mut prog = Program::new(2, 0);
    prog.emit(Instruction::new(Op::StackPeek, 0, -2, 0));
    prog.emit(Instruction::new(Op::StackPeek, 1, -1, 0));
    prog.emit(Instruction::new(Op::Add, 0, 1, 0));
    prog.emit(Instruction::new(Op::Ret, 0, 0, 0));

    let mut pool = ProgramPool::new();
    pool.register("Adder", "add", prog);
    let natives = NativeRegistry::new();
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();
    let sp_before = stack.sp();

    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };
    let result = Interpreter::invoke(&mut rt, obj, "add", &[Value::Number(2.0), Value::Number(3.0)]).unwrap();

    assert_eq!(result, Value::Number(5.0));
    assert_eq!(stack.sp(), sp_before);
}

#[test]
fn division_by_a_sub_epsilon_divisor_clamps_to_signed_infinity() {
    let mut mgr = ObjectManager::new();
    let obj = spawn_object(&mut mgr, "Divider");

    let mut prog = Program::new(0, 0);
    let dividend = prog.add_constant(Value::Number(3.0));
    let divisor = prog.add_constant(Value::Number(1e-10));
    prog.emit(Instruction::new(Op::MoveNumber, 0, dividend as i32, 0));
    prog.emit(Instruction::new(Op::MoveNumber, 1, divisor as i32, 0));
    prog.emit(Instruction::new(Op::Div, 0, 1, 0));
    prog.emit(Instruction::new(Op::Ret, 0, 0, 0));

    let mut pool = ProgramPool::new();
    pool.register("Divider", "divide", prog);
    let natives = NativeRegistry::new();
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();
    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };

    let result = Interpreter::invoke(&mut rt, obj, "divide", &[]).unwrap();
    assert_eq!(result, Value::Number(f64::INFINITY), "1e-10 is below f32::EPSILON, so it's treated as zero");
}

#[test]
fn ordinary_division_is_unaffected_by_the_epsilon_guard() {
    let mut mgr = ObjectManager::new();
    let obj = spawn_object(&mut mgr, "Divider");

    let mut prog = Program::new(0, 0);
    let dividend = prog.add_constant(Value::Number(7.0));
    let divisor = prog.add_constant(Value::Number(2.0));
    prog.emit(Instruction::new(Op::MoveNumber, 0, dividend as i32, 0));
    prog.emit(Instruction::new(Op::MoveNumber, 1, divisor as i32, 0));
    prog.emit(Instruction::new(Op::Div, 0, 1, 0));
    prog.emit(Instruction::new(Op::Ret, 0, 0, 0));

    let mut pool = ProgramPool::new();
    pool.register("Divider", "divide", prog);
    let natives = NativeRegistry::new();
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();
    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };

    let result = Interpreter::invoke(&mut rt, obj, "divide", &[]).unwrap();
    assert_eq!(result, Value::Number(3.5));
}

#[test]
fn arity_mismatch_is_fatal() {
    let mut mgr = ObjectManager::new();
    let obj = spawn_object(&mut mgr, "Adder");
    let mut pool = ProgramPool::new();
    pool.register("Adder", "add", Program::new(2, 0));
    let natives = NativeRegistry::new();
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();
    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };

    let err = Interpreter::invoke(&mut rt, obj, "add", &[Value::Number(1.0)]).unwrap_err();
    assert!(matches!(err, FatalError::ArityMismatch { expected: 2, got: 1, .. }));
}

#[test]
fn undefined_program_is_fatal() {
    let mut mgr = ObjectManager::new();
    let obj = spawn_object(&mut mgr, "Adder");
    let pool = ProgramPool::new();
    let natives = NativeRegistry::new();
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();
    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };

    let err = Interpreter::invoke(&mut rt, obj, "missing", &[]).unwrap_err();
    assert!(matches!(err, FatalError::UndefinedProgram { .. }));
}

#[test]
fn nested_call_through_bytecode_sets_t0_to_return_value() {
    let mut mgr = ObjectManager::new();
    let obj = spawn_object(&mut mgr, "Doubler");

    let mut double = Program::new(1, 0);
    double.emit(Instruction::new(Op::StackPeek, 0, -1, 0));
    double.emit(Instruction::new(Op::Add, 0, 0, 0));
    double.emit(Instruction::new(Op::Ret, 0, 0, 0));

    let mut caller = Program::new(0, 0);
    let name_const = caller.add_constant(Value::String("double".into()));
    let number_const = caller.add_constant(Value::Number(21.0));
    caller.emit(Instruction::new(Op::MoveThis, 1, 0, 0));
    caller.emit(Instruction::new(Op::MoveNumber, 0, number_const as i32, 0));
    caller.emit(Instruction::new(Op::Push, 0, 0, 0));
    caller.emit(Instruction::new(Op::Call, name_const as i32, 1, 1));
    caller.emit(Instruction::new(Op::Ret, 0, 0, 0));

    let mut pool = ProgramPool::new();
    pool.register("Doubler", "double", double);
    pool.register("Doubler", "run", caller);
    let natives = NativeRegistry::new();
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();

    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };
    let result = Interpreter::invoke(&mut rt, obj, "run", &[]).unwrap();
    assert_eq!(result, Value::Number(42.0));
}

#[test]
fn comparison_and_branch_select_the_lower_value() {
    let mut mgr = ObjectManager::new();
    let obj = spawn_object(&mut mgr, "Min");

    let mut prog = Program::new(2, 0);
    let end = prog.create_label();
    prog.emit(Instruction::new(Op::StackPeek, 0, -2, 0));
    prog.emit(Instruction::new(Op::StackPeek, 1, -1, 0));
    prog.emit(Instruction::new(Op::Cmp, 0, 1, 0));
    prog.emit(Instruction::new(Op::Jle, end as i32, 0, 0));
    prog.emit(Instruction::new(Op::Copy, 0, 1, 0));
    prog.bind_label(end);
    prog.emit(Instruction::new(Op::Ret, 0, 0, 0));

    let mut pool = ProgramPool::new();
    pool.register("Min", "min", prog);
    let natives = NativeRegistry::new();
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();
    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };

    let result = Interpreter::invoke(&mut rt, obj, "min", &[Value::Number(9.0), Value::Number(4.0)]).unwrap();
    assert_eq!(result, Value::Number(4.0));
}

#[test]
fn native_binding_shadows_bytecode_program_of_the_same_name() {
    fn fixed_answer(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
        Ok(Value::Number(42.0))
    }

    let mut mgr = ObjectManager::new();
    let obj = spawn_object(&mut mgr, "Console");
    let mut pool = ProgramPool::new();
    pool.register("Console", "answer", Program::new(0, 0));
    let mut natives = NativeRegistry::new();
    natives.bind("Console", "answer", fixed_answer);
    let mut stack = Stack::new();
    let mut gc = Gc::new();
    let tags = TagSystem::new();

    let mut rt = Runtime { objects: &mut mgr, stack: &mut stack, programs: &pool, natives: &natives, gc: &mut gc, tags: &tags, now: 0.0 };
    let result = Interpreter::invoke(&mut rt, obj, "answer", &[]).unwrap();
    assert_eq!(result, Value::Number(42.0));
}
