// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! The emitter side of the pipeline: symbol tables, register
//! conventions and instruction-sequence helpers shared by every
//! statement/expression the parser walks. There is no intermediate
//! tree — `parser.rs` calls straight into these helpers as it
//! recognizes each production.

use crate::lexer::TokenKind;
use orbit_core::Value;
use orbit_runtime::program::{Instruction, LabelId, Op, Program};
use std::collections::HashMap;

/// Register holding the value an expression just produced.
pub const ACC: i32 = 0;
/// Register used as the other operand of a binary op, and to stage a
/// call's receiver handle immediately before `Op::Call`.
pub const OPD: i32 = 1;
/// Hardwired by the interpreter for `Cmp`/`Test`/`TestType` results.
pub const CMP: i32 = 2;

/// Where a name resolves to.
#[derive(Debug, Clone, Copy)]
enum Binding {
    /// A heap cell on `this`, shared by every program on the object.
    Heap(usize),
    /// A stack cell at `bp + offset` (a parameter or a local).
    Stack(i32),
}

/// One compiled object: its implicit field-initializer constructor plus
/// every `state`/`fun` body, ready for `ProgramPool::register`.
pub struct CompiledObject {
    pub name: String,
    pub programs: Vec<(String, Program)>,
}

/// A block scope within one function/state body. Lives only for the
/// duration of compiling that block.
struct BlockScope {
    names: HashMap<String, Binding>,
}

/// Everything needed to emit one `Program` (a function, state or the
/// implicit constructor): the program under construction, its local
/// variable bookkeeping, and loop-exit labels for `break`/`continue`.
pub struct FunctionCg<'h> {
    pub program: Program,
    /// Heap variables declared at object scope, visible to every
    /// function on the object.
    heap_vars: &'h HashMap<String, usize>,
    blocks: Vec<BlockScope>,
    next_local: i32,
    /// Local slots currently stashing a value across a nested
    /// evaluation (a call's receiver, an array literal's handle),
    /// innermost last. A fresh slot is opened per use rather than
    /// shared, so a call nested inside another call's own argument
    /// list (`a.foo(b.bar())`) gets its own storage instead of
    /// clobbering the outer call's stashed receiver.
    temp_slots: Vec<i32>,
    loop_labels: Vec<LoopLabels>,
}

struct LoopLabels {
    continue_label: LabelId,
    break_label: LabelId,
}

impl<'h> FunctionCg<'h> {
    pub fn new(arity: usize, heap_vars: &'h HashMap<String, usize>) -> Self {
        Self {
            program: Program::new(arity, 0),
            heap_vars,
            blocks: vec![BlockScope { names: HashMap::new() }],
            next_local: 1, // local 0 is reserved by the stack's own sentinel layout, see Stack
            temp_slots: Vec::new(),
            loop_labels: Vec::new(),
        }
    }

    fn alloc_local(&mut self) -> i32 {
        let slot = self.next_local;
        self.next_local += 1;
        slot
    }

    /// Declare a parameter, in left-to-right order, before any locals.
    /// Parameter `i` of `argc` lives at `bp + (i - argc)`.
    pub fn declare_param(&mut self, name: &str, index: usize, argc: usize) {
        let offset = index as i32 - argc as i32;
        self.blocks.last_mut().unwrap().names.insert(name.to_string(), Binding::Stack(offset));
    }

    /// Declare a local variable in the current block, returning its
    /// slot so the caller can immediately store an initializer into it.
    pub fn declare_local(&mut self, name: &str) -> i32 {
        let slot = self.alloc_local();
        self.blocks.last_mut().unwrap().names.insert(name.to_string(), Binding::Stack(slot));
        slot
    }

    pub fn push_block(&mut self) {
        self.blocks.push(BlockScope { names: HashMap::new() });
    }

    pub fn pop_block(&mut self) {
        self.blocks.pop();
    }

    fn resolve(&self, name: &str) -> Option<Binding> {
        for block in self.blocks.iter().rev() {
            if let Some(b) = block.names.get(name) {
                return Some(*b);
            }
        }
        self.heap_vars.get(name).map(|&addr| Binding::Heap(addr))
    }

    pub fn has_binding(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Finish building: record how many local slots were handed out
    /// (`next_local` is the *next* offset to allocate, one past the
    /// last one actually in use, since offsets start at 1) and make
    /// sure every path through the body returns, even if the script
    /// fell off the end without an explicit `return`.
    pub fn finish(mut self) -> Program {
        self.program.locals = (self.next_local - 1) as usize;
        self.program.emit(Instruction::new(Op::Ret, 0, 0, 0));
        self.program
    }

    // -- emission helpers ---------------------------------------------

    pub fn emit(&mut self, op: Op, a: i32, b: i32, c: i32) {
        self.program.emit(Instruction::new(op, a, b, c));
    }

    pub fn create_label(&mut self) -> LabelId {
        self.program.create_label()
    }

    pub fn bind_label(&mut self, label: LabelId) {
        self.program.bind_label(label);
    }

    pub fn const_number(&mut self, n: f64) -> u32 {
        self.program.add_constant(Value::Number(n))
    }

    pub fn const_string(&mut self, s: &str) -> u32 {
        self.program.add_constant(Value::String(s.to_string().into()))
    }

    /// Load a literal number into `ACC`.
    pub fn load_number(&mut self, n: f64) {
        let idx = self.const_number(n);
        self.emit(Op::MoveNumber, ACC, idx as i32, 0);
    }

    /// Load a literal string into `ACC`.
    pub fn load_string(&mut self, s: &str) {
        let idx = self.const_string(s);
        self.emit(Op::MoveString, ACC, idx as i32, 0);
    }

    pub fn load_bool(&mut self, b: bool) {
        self.emit(Op::MoveBool, ACC, i32::from(b), 0);
    }

    pub fn load_null(&mut self) {
        self.emit(Op::MoveNull, ACC, 0, 0);
    }

    pub fn load_this(&mut self) {
        self.emit(Op::MoveThis, ACC, 0, 0);
    }

    /// Load the fixed system object named `name` (`Console`,
    /// `Application`, `System`, ...) into `ACC`. Used for a bare
    /// capitalized identifier that isn't a declared variable.
    pub fn load_global(&mut self, name: &str) {
        let idx = self.const_string(name);
        self.emit(Op::MoveSystemObject, ACC, idx as i32, 0);
    }

    /// Load the named variable's value into `ACC`. Caller already
    /// checked `has_binding`.
    pub fn load_var(&mut self, name: &str) {
        match self.resolve(name).expect("unresolved variable reached codegen") {
            Binding::Heap(addr) => self.emit(Op::HeapPeek, ACC, addr as i32, 0),
            Binding::Stack(offset) => self.emit(Op::StackPeek, ACC, offset, 0),
        }
    }

    /// Store `ACC` into the named variable.
    pub fn store_var(&mut self, name: &str) {
        match self.resolve(name).expect("unresolved variable reached codegen") {
            Binding::Heap(addr) => self.emit(Op::HeapPoke, ACC, addr as i32, 0),
            Binding::Stack(offset) => self.emit(Op::StackPoke, ACC, offset, 0),
        }
    }

    /// Combine an already-pushed left operand with the value currently
    /// in `ACC` (the right operand), leaving the result in `ACC`. The
    /// caller is responsible for compiling and `Push`ing the left
    /// operand, then compiling the right operand into `ACC`, before
    /// calling this — which is how every binary operator in the parser
    /// is shaped, since the left operand survives on the real stack
    /// (not a spare register) so arbitrarily nested expressions never
    /// run out of temporaries.
    pub fn combine_binary(&mut self, op: &TokenKind) {
        self.emit(Op::Pop, OPD, 0, 0); // OPD := lhs, ACC still rhs
        match op {
            TokenKind::Plus => self.emit(Op::Add, OPD, ACC, 0),
            TokenKind::Minus => self.emit(Op::Sub, OPD, ACC, 0),
            TokenKind::Star => self.emit(Op::Mul, OPD, ACC, 0),
            TokenKind::Slash => self.emit(Op::Div, OPD, ACC, 0),
            TokenKind::Percent => self.emit(Op::Mod, OPD, ACC, 0),
            TokenKind::AndAnd => self.emit(Op::And, OPD, ACC, 0),
            TokenKind::OrOr => self.emit(Op::Or, OPD, ACC, 0),
            _ => unreachable!("not a value-producing binary op: {op:?}"),
        }
        self.emit(Op::Copy, ACC, OPD, 0);
    }

    /// Same shape as [`Self::combine_binary`] but for a relational or
    /// equality operator, materializing a `bool` into `ACC`. There is
    /// no opcode that writes a comparison result directly into a value
    /// register, only into the jump flag `t[2]`, so this threads it
    /// through a two-way branch.
    pub fn combine_compare(&mut self, op: &TokenKind) {
        self.emit(Op::Pop, OPD, 0, 0); // OPD := lhs, ACC := rhs
        self.emit(Op::Cmp, OPD, ACC, 0);
        let take = self.create_label();
        let end = self.create_label();
        let jump_op = match op {
            TokenKind::Eq => Op::Je,
            TokenKind::Ne => Op::Jne,
            TokenKind::Lt => Op::Jl,
            TokenKind::Le => Op::Jle,
            TokenKind::Gt => Op::Jg,
            TokenKind::Ge => Op::Jge,
            _ => unreachable!("not a comparison op: {op:?}"),
        };
        self.emit(jump_op, take as i32, 0, 0);
        self.load_bool(false);
        self.emit(Op::Jmp, end as i32, 0, 0);
        self.bind_label(take);
        self.load_bool(true);
        self.bind_label(end);
    }

    /// Open a fresh scratch slot and stash `ACC` into it. Pair with
    /// [`Self::pop_temp`] once the stashed value is no longer needed.
    /// Used both to carry a call's receiver handle across its argument
    /// evaluation and to carry an array literal's freshly spawned
    /// handle across its elements; a fresh slot per use means a call
    /// nested inside another call's arguments, or an array literal
    /// nested inside another, gets its own storage rather than
    /// clobbering the outer one's.
    pub fn push_temp(&mut self) {
        let slot = self.alloc_local();
        self.temp_slots.push(slot);
        self.emit(Op::StackPoke, ACC, slot, 0);
    }

    /// Reload the innermost open temp slot into `ACC`, without closing
    /// it — used to re-read an array literal's handle for each element.
    pub fn load_temp(&mut self) {
        let slot = *self.temp_slots.last().expect("load_temp with no open temp slot");
        self.emit(Op::StackPeek, ACC, slot, 0);
    }

    /// Close the innermost open temp slot.
    pub fn pop_temp(&mut self) {
        self.temp_slots.pop().expect("pop_temp with no open temp slot");
    }

    /// Emit the `Op::Call` for `method`, reloading the receiver handle
    /// the innermost open temp slot holds and closing it. `argc`
    /// arguments must already be `Push`ed, in order, after the
    /// receiver. Result lands in `ACC`.
    pub fn emit_call(&mut self, method: &str, argc: usize) {
        let slot = self.temp_slots.pop().expect("emit_call with no stashed receiver");
        self.emit(Op::StackPeek, OPD, slot, 0);
        let name_idx = self.const_string(method);
        self.emit(Op::Call, name_idx as i32, OPD, argc as i32);
    }

    pub fn enter_loop(&mut self, continue_label: LabelId, break_label: LabelId) {
        self.loop_labels.push(LoopLabels { continue_label, break_label });
    }

    pub fn exit_loop(&mut self) {
        self.loop_labels.pop();
    }

    pub fn current_continue(&self) -> Option<LabelId> {
        self.loop_labels.last().map(|l| l.continue_label)
    }

    pub fn current_break(&self) -> Option<LabelId> {
        self.loop_labels.last().map(|l| l.break_label)
    }
}
