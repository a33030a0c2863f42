// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Text I/O. `print` appends a newline, `write` doesn't.

use crate::error::FatalResult;
use crate::interpreter::Runtime;
use crate::vm::Vm;
use orbit_core::Value;
use std::io::Write as _;

pub fn install(vm: &mut Vm) {
    vm.bind("Console", "state:main", fun_state_main);
    vm.bind("Console", "print", fun_print);
    vm.bind("Console", "write", fun_write);
    vm.bind("Console", "spawn", fun_noop);
    vm.bind("Console", "destroy", fun_noop);
}

/// System singleton: not spawnable or destroyable from script code.
fn fun_noop(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Null)
}

/// Console never has anything to do outside of the calls it's handed
/// directly — disable its own per-tick visit.
fn fun_state_main(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    rt.objects.get_mut(object)?.set_active(false);
    Ok(Value::Null)
}

fn fun_print(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let text = params.first().map(Value::to_text).unwrap_or_default();
    println!("{text}");
    Ok(Value::Null)
}

fn fun_write(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let text = params.first().map(Value::to_text).unwrap_or_default();
    print!("{text}");
    let _ = std::io::stdout().flush();
    Ok(Value::Null)
}
