// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! The dispatch loop for one program activation, plus the call
//! protocol every caller (bytecode `call`, the scheduler, native
//! bindings) goes through.

use crate::error::{FatalError, FatalResult};
use crate::gc::Gc;
use crate::object_manager::{ObjectManager, NULL_HANDLE};
use crate::program::{Op, Program};
use crate::program_pool::ProgramPool;
use crate::stack::Stack;
use crate::tag_system::TagSystem;
use orbit_core::Value;
use std::collections::HashMap;

/// Every object inherits this pseudo-class's native methods (`spawn`,
/// `destroy`, `parent`, `timeout`, `changeState`, ...) when it hasn't
/// bound a method of the same name itself.
pub const OBJECT_CLASS: &str = "Object";

/// Below this magnitude a divisor is treated as zero: `Op::Div` returns
/// a signed infinity instead of a merely very large quotient.
const DIV_EPSILON: f64 = f32::EPSILON as f64;

#[cfg(test)]
mod tests;

/// A native (Rust-implemented) program body, as bound by `vm_bind`. The
/// slice is the already-evaluated actual parameters, left to right.
pub type NativeFn = fn(&mut Runtime, u32, &[Value]) -> FatalResult<Value>;

/// Registry of native bindings, keyed the same way as the
/// [`ProgramPool`]. Consulted before the bytecode pool on every call, so
/// a native binding always shadows a same-named bytecode program.
#[derive(Default)]
pub struct NativeRegistry {
    fns: HashMap<(String, String), NativeFn>,
}

impl NativeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, object_name: &str, program_name: &str, f: NativeFn) {
        self.fns.insert((object_name.to_string(), program_name.to_string()), f);
    }

    #[must_use]
    pub fn get(&self, object_name: &str, program_name: &str) -> Option<NativeFn> {
        self.fns.get(&(object_name.to_string(), program_name.to_string())).copied()
    }
}

/// Everything a running program activation needs. Borrowed together so
/// the interpreter, and native bindings it calls out to, share one
/// consistent view of VM state.
pub struct Runtime<'a> {
    pub objects: &'a mut ObjectManager,
    pub stack: &'a mut Stack,
    pub programs: &'a ProgramPool,
    pub natives: &'a NativeRegistry,
    pub gc: &'a mut Gc,
    pub tags: &'a TagSystem,
    /// Wall-clock seconds since VM launch, for `timeout()` and `__GC`'s
    /// frequency throttle.
    pub now: f64,
}

pub struct Interpreter;

impl Interpreter {
    /// Entry point for callers outside the bytecode (the scheduler
    /// dispatching `state:<name>`, a constructor call at spawn time).
    /// Pushes the callee handle and parameters itself, then follows the
    /// same path a bytecode `call` instruction does.
    pub fn invoke(rt: &mut Runtime, callee: u32, program_name: &str, params: &[Value]) -> FatalResult<Value> {
        rt.stack.push(Value::object_handle(callee))?;
        for p in params {
            rt.stack.push(p.clone())?;
        }
        Self::dispatch_call(rt, callee, program_name, params.len())
    }

    /// Assumes the callee handle and `argc` parameters are already the
    /// top `1 + argc` cells of the stack (either pushed by `invoke`, or
    /// by the bytecode that precedes a `call` instruction). Always
    /// leaves the stack exactly `1 + argc` cells shorter than it found
    /// it, with the return value handed back directly (not through the
    /// stack).
    fn dispatch_call(rt: &mut Runtime, callee: u32, program_name: &str, argc: usize) -> FatalResult<Value> {
        let callee_name = rt.objects.get(callee)?.name().to_string();

        let native =
            rt.natives.get(&callee_name, program_name).or_else(|| rt.natives.get(OBJECT_CLASS, program_name));
        if let Some(native) = native {
            let mut params = Vec::with_capacity(argc);
            for _ in 0..argc {
                params.push(rt.stack.top()?.clone());
                rt.stack.pop()?;
            }
            params.reverse();
            rt.stack.pop()?; // the callee handle
            return native(rt, callee, &params);
        }

        let program = rt
            .programs
            .get(&callee_name, program_name)
            .ok_or_else(|| FatalError::UndefinedProgram { object: callee_name.clone(), program: program_name.to_string() })?;

        if program.arity != argc {
            return Err(FatalError::ArityMismatch {
                object: callee_name,
                program: program_name.to_string(),
                expected: program.arity,
                got: argc,
            });
        }

        let locals = program.locals;
        rt.stack.push_frame()?;
        rt.stack.pushn(locals)?;

        let result = Self::run(rt, callee, program);

        rt.stack.pop_frame()?;
        rt.stack.popn(1 + argc)?;

        result
    }

    /// The actual opcode loop for one activation. `t[0..3]` live here,
    /// not on the stack — they belong to the activation record, not the
    /// caller-visible frame.
    fn run(rt: &mut Runtime, object: u32, program: &Program) -> FatalResult<Value> {
        let mut t: [Value; 4] = [Value::Null, Value::Null, Value::Null, Value::Null];
        let code = program.code();
        let mut ip = 0usize;

        loop {
            let Some(instr) = code.get(ip) else {
                return Ok(std::mem::take(&mut t[0]));
            };

            match instr.op {
                Op::MoveNull => t[instr.a as usize] = Value::Null,
                Op::MoveBool => t[instr.a as usize] = Value::Bool(instr.b != 0),
                Op::MoveNumber | Op::MoveString => {
                    t[instr.a as usize] = program.constant(instr.b as u32).cloned().unwrap_or(Value::Null);
                }
                Op::MoveThis => t[instr.a as usize] = Value::object_handle(object),
                Op::MoveSystemObject => {
                    let name = match program.constant(instr.b as u32) {
                        Some(Value::String(s)) => s.as_str().to_string(),
                        _ => String::new(),
                    };
                    let handle = if name == "System" { Some(rt.objects.root()) } else { rt.objects.system_object(&name) };
                    t[instr.a as usize] = Value::object_handle(handle.unwrap_or(NULL_HANDLE));
                }
                Op::Copy => t[instr.a as usize] = t[instr.b as usize].clone(),

                Op::HeapPeek => {
                    let addr = instr.b as usize;
                    t[instr.a as usize] = rt.objects.get(object)?.heap().at(addr)?.clone();
                }
                Op::HeapPoke => {
                    let addr = instr.b as usize;
                    let value = t[instr.a as usize].clone();
                    *rt.objects.get_mut(object)?.heap_mut().at_mut(addr)? = value;
                }
                Op::HeapAlloc => {
                    let addr = rt.objects.get_mut(object)?.heap_mut().alloc()?;
                    t[instr.a as usize] = Value::Number(addr as f64);
                }

                Op::Push => rt.stack.push(t[instr.a as usize].clone())?,
                Op::Pop => {
                    t[instr.a as usize] = rt.stack.top()?.clone();
                    rt.stack.pop()?;
                }
                Op::StackPeek => t[instr.a as usize] = rt.stack.peek(i64::from(instr.b))?.clone(),
                Op::StackPoke => rt.stack.poke(i64::from(instr.b), t[instr.a as usize].clone())?,
                Op::Reserve => rt.stack.pushn(instr.a as usize)?,
                Op::Discard => rt.stack.popn(instr.a as usize)?,

                Op::Inc => t[instr.a as usize] = Value::Number(t[instr.a as usize].to_number() + 1.0),
                Op::Dec => t[instr.a as usize] = Value::Number(t[instr.a as usize].to_number() - 1.0),
                Op::Add => {
                    let (a, b) = (&t[instr.a as usize], &t[instr.b as usize]);
                    t[instr.a as usize] = add(a, b);
                }
                Op::Sub => t[instr.a as usize] = Value::Number(t[instr.a as usize].to_number() - t[instr.b as usize].to_number()),
                Op::Mul => t[instr.a as usize] = Value::Number(t[instr.a as usize].to_number() * t[instr.b as usize].to_number()),
                Op::Div => {
                    let dividend = t[instr.a as usize].to_number();
                    let divisor = t[instr.b as usize].to_number();
                    t[instr.a as usize] = Value::Number(if divisor.abs() < DIV_EPSILON {
                        if dividend >= 0.0 {
                            f64::INFINITY
                        } else {
                            f64::NEG_INFINITY
                        }
                    } else {
                        dividend / divisor
                    });
                }
                Op::Mod => t[instr.a as usize] = Value::Number(t[instr.a as usize].to_number() % t[instr.b as usize].to_number()),
                Op::Pow => t[instr.a as usize] = Value::Number(t[instr.a as usize].to_number().powf(t[instr.b as usize].to_number())),
                Op::Neg => t[instr.a as usize] = Value::Number(-t[instr.a as usize].to_number()),
                Op::Not => t[instr.a as usize] = Value::Bool(!t[instr.a as usize].to_bool()),
                Op::TypeOf => t[instr.a as usize] = Value::String(t[instr.a as usize].type_name().to_string().into()),
                Op::And => t[instr.a as usize] = Value::Bool(t[instr.a as usize].to_bool() && t[instr.b as usize].to_bool()),
                Op::Or => t[instr.a as usize] = Value::Bool(t[instr.a as usize].to_bool() || t[instr.b as usize].to_bool()),

                Op::Cat => {
                    let text = format!("{}{}", t[instr.a as usize].to_text(), t[instr.b as usize].to_text());
                    t[instr.a as usize] = Value::String(text.into());
                }
                Op::TestType => {
                    let matches = t[instr.a as usize].typecode() as i32 == instr.b;
                    t[2] = Value::Number(f64::from(i32::from(matches)));
                }

                Op::Cmp => {
                    let c = t[instr.a as usize].compare(&t[instr.b as usize]);
                    t[2] = Value::Number(f64::from(c));
                }
                Op::Test => t[2] = Value::Number(f64::from(i32::from(t[instr.a as usize].to_bool()))),

                Op::Jmp => {
                    ip = Self::label_target(program, instr.a)?;
                    continue;
                }
                Op::Je | Op::Jne | Op::Jl | Op::Jle | Op::Jg | Op::Jge => {
                    let c = t[2].to_number() as i32;
                    let take = match instr.op {
                        Op::Je => c == 0,
                        Op::Jne => c != 0,
                        Op::Jl => c < 0,
                        Op::Jle => c <= 0,
                        Op::Jg => c > 0,
                        Op::Jge => c >= 0,
                        _ => unreachable!(),
                    };
                    if take {
                        ip = Self::label_target(program, instr.a)?;
                        continue;
                    }
                }

                Op::Call => {
                    let name = match program.constant(instr.a as u32) {
                        Some(Value::String(s)) => s.as_str().to_string(),
                        _ => {
                            return Err(FatalError::UndefinedProgram {
                                object: rt.objects.get(object)?.name().to_string(),
                                program: format!("<bad constant {}>", instr.a),
                            })
                        }
                    };
                    let callee = t[instr.b as usize].as_object_handle().unwrap_or(NULL_HANDLE);
                    let argc = instr.c as usize;
                    t[0] = Self::dispatch_call(rt, callee, &name, argc)?;
                }
                Op::Ret => return Ok(std::mem::take(&mut t[0])),
                Op::Nop => {}
            }

            ip += 1;
        }
    }

    fn label_target(program: &Program, label: i32) -> FatalResult<usize> {
        program
            .label_target(label as u32)
            .ok_or(FatalError::UnboundLabel { program: "<anonymous>".to_string(), label: label as u32 })
    }
}

fn add(a: &Value, b: &Value) -> Value {
    if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) {
        Value::String(format!("{}{}", a.to_text(), b.to_text()).into())
    } else {
        Value::Number(a.to_number() + b.to_number())
    }
}
