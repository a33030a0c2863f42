// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! The `Boolean` system singleton — coercion helpers, same rationale
//! as `Number`.

use crate::error::FatalResult;
use crate::interpreter::Runtime;
use crate::vm::Vm;
use orbit_core::Value;

pub fn install(vm: &mut Vm) {
    vm.bind("Boolean", "spawn", fun_noop);
    vm.bind("Boolean", "destroy", fun_noop);
    vm.bind("Boolean", "toString", fun_to_string);
}

fn fun_noop(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Null)
}

fn fun_to_string(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let b = params.first().map(Value::to_bool).unwrap_or(false);
    Ok(Value::String(b.to_string().into()))
}
