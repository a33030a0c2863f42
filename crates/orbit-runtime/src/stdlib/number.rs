// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! The `Number` system singleton — a namespace for numeric coercion
//! helpers, not a per-value wrapper (numbers are already a primitive
//! `Value` variant).

use crate::error::FatalResult;
use crate::interpreter::Runtime;
use crate::vm::Vm;
use orbit_core::Value;

pub fn install(vm: &mut Vm) {
    vm.bind("Number", "spawn", fun_noop);
    vm.bind("Number", "destroy", fun_noop);
    vm.bind("Number", "isNaN", fun_is_nan);
    vm.bind("Number", "isInfinite", fun_is_infinite);
    vm.bind("Number", "toString", fun_to_string);
}

fn fun_noop(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Null)
}

fn fun_is_nan(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Bool(params.first().map(Value::to_number).unwrap_or(0.0).is_nan()))
}

fn fun_is_infinite(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Bool(params.first().map(Value::to_number).unwrap_or(0.0).is_infinite()))
}

fn fun_to_string(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::String(params.first().map(Value::to_text).unwrap_or_default().into()))
}
