// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! The `String` system singleton — coercion and substring helpers over
//! the immutable [`orbit_core::string_pool::ManagedString`] value type.

use crate::error::FatalResult;
use crate::interpreter::Runtime;
use crate::vm::Vm;
use orbit_core::Value;

pub fn install(vm: &mut Vm) {
    vm.bind("String", "state:main", fun_state_main);
    vm.bind("String", "spawn", fun_noop);
    vm.bind("String", "destroy", fun_noop);
    vm.bind("String", "length", fun_length);
    vm.bind("String", "concat", fun_concat);
    vm.bind("String", "substr", fun_substr);
    vm.bind("String", "toUpperCase", fun_to_upper);
    vm.bind("String", "toLowerCase", fun_to_lower);
}

/// Like `Console`, never has anything of its own to do per tick.
fn fun_state_main(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    rt.objects.get_mut(object)?.set_active(false);
    Ok(Value::Null)
}

fn fun_noop(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Null)
}

fn fun_length(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let text = params.first().map(Value::to_text).unwrap_or_default();
    Ok(Value::Number(text.chars().count() as f64))
}

fn fun_concat(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let a = params.first().map(Value::to_text).unwrap_or_default();
    let b = params.get(1).map(Value::to_text).unwrap_or_default();
    Ok(Value::String(format!("{a}{b}").into()))
}

fn fun_substr(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let text = params.first().map(Value::to_text).unwrap_or_default();
    let chars: Vec<char> = text.chars().collect();
    let start = params.get(1).map(Value::to_number).unwrap_or(0.0).max(0.0) as usize;
    let len = params.get(2).map(Value::to_number).unwrap_or(chars.len() as f64).max(0.0) as usize;
    let end = (start + len).min(chars.len());
    let slice = if start >= chars.len() { String::new() } else { chars[start..end].iter().collect() };
    Ok(Value::String(slice.into()))
}

fn fun_to_upper(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let text = params.first().map(Value::to_text).unwrap_or_default();
    Ok(Value::String(text.to_uppercase().into()))
}

fn fun_to_lower(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let text = params.first().map(Value::to_text).unwrap_or_default();
    Ok(Value::String(text.to_lowercase().into()))
}
