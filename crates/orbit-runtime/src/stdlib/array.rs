// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! A growable, index-addressed list. Backed by [`UserData::Array`]
//! rather than the heap's cell array — the element count isn't known
//! up front and scripts index it densely from zero.

use crate::error::FatalResult;
use crate::interpreter::Runtime;
use crate::object::UserData;
use crate::vm::Vm;
use orbit_core::Value;

pub fn install(vm: &mut Vm) {
    vm.bind("Array", "constructor", fun_constructor);
    vm.bind("Array", "state:main", fun_noop);
    vm.bind("Array", "__destructor", fun_noop);
    vm.bind("Array", "getLength", fun_get_length);
    vm.bind("Array", "length", fun_get_length); // `a.length` parenthesis-less sugar
    vm.bind("Array", "get", fun_get);
    vm.bind("Array", "set", fun_set);
    vm.bind("Array", "push", fun_push);
}

fn fun_constructor(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    rt.objects.get_mut(object)?.user_data = UserData::Array(Vec::new());
    Ok(Value::Null)
}

fn fun_noop(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Null)
}

fn elements(rt: &Runtime, object: u32) -> FatalResult<&Vec<Value>> {
    match &rt.objects.get(object)?.user_data {
        UserData::Array(elements) => Ok(elements),
        _ => unreachable!("Array object without an Array user_data payload"),
    }
}

fn elements_mut<'a>(rt: &'a mut Runtime, object: u32) -> FatalResult<&'a mut Vec<Value>> {
    match &mut rt.objects.get_mut(object)?.user_data {
        UserData::Array(elements) => Ok(elements),
        _ => unreachable!("Array object without an Array user_data payload"),
    }
}

fn fun_get_length(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number(elements(rt, object)?.len() as f64))
}

fn fun_get(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let index = params.first().map(Value::to_number).unwrap_or(0.0) as usize;
    Ok(elements(rt, object)?.get(index).cloned().unwrap_or(Value::Null))
}

fn fun_set(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let index = params.first().map(Value::to_number).unwrap_or(0.0) as usize;
    let value = params.get(1).cloned().unwrap_or(Value::Null);
    let elements = elements_mut(rt, object)?;
    if index >= elements.len() {
        elements.resize(index + 1, Value::Null);
    }
    elements[index] = value;
    Ok(Value::Null)
}

fn fun_push(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let value = params.first().cloned().unwrap_or(Value::Null);
    elements_mut(rt, object)?.push(value);
    Ok(Value::Null)
}
