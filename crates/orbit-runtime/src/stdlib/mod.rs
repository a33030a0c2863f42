// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! The always-available standard library. Every binding here is a
//! native [`NativeFn`](crate::interpreter::NativeFn) registered under
//! `(object_name, program_name)`, installed once at
//! [`crate::vm::Vm::launch`] before the root's own constructor spawns
//! the fixed system objects.

mod application;
mod array;
mod boolean;
mod console;
mod gc;
mod math;
mod number;
mod object;
mod string;
mod system;
mod time;

use crate::error::FatalResult;
use crate::interpreter::Interpreter;
use crate::vm::Vm;

/// Register every native binding, then run the root's constructor,
/// which consumes [`crate::object_manager::SYSTEM_OBJECT_NAMES`] to
/// spawn `String`, `Number`, `Boolean`, `Time`, `Math`, `Console`,
/// `__Temp`, `__GC`, `__TagSystem` and, last, `Application`.
pub fn install(vm: &mut Vm) -> FatalResult<()> {
    object::install(vm);
    system::install(vm);
    application::install(vm);
    console::install(vm);
    math::install(vm);
    number::install(vm);
    boolean::install(vm);
    string::install(vm);
    time::install(vm);
    gc::install(vm);
    array::install(vm);

    let root = vm.root();
    let mut rt = vm.runtime();
    Interpreter::invoke(&mut rt, root, "constructor", &[])?;
    Ok(())
}
