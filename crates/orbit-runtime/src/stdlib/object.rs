// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Common methods every object answers to unless it shadows them with
//! a binding of its own name — `spawn`, `destroy`, tree navigation,
//! reflection, and the state/timeout machinery user scripts drive
//! directly (`changeState`, `timeout`).

use crate::error::FatalResult;
use crate::interpreter::{Interpreter, Runtime, OBJECT_CLASS};
use crate::vm::Vm;
use orbit_core::Value;

pub fn install(vm: &mut Vm) {
    vm.bind(OBJECT_CLASS, "spawn", fun_spawn);
    vm.bind(OBJECT_CLASS, "destroy", fun_destroy);
    vm.bind(OBJECT_CLASS, "getParent", fun_get_parent);
    vm.bind(OBJECT_CLASS, "child", fun_child);
    vm.bind(OBJECT_CLASS, "sibling", fun_sibling);
    vm.bind(OBJECT_CLASS, "findChild", fun_find_child);
    vm.bind(OBJECT_CLASS, "toString", fun_to_string);
    vm.bind(OBJECT_CLASS, "equals", fun_equals);
    vm.bind(OBJECT_CLASS, "hasFunction", fun_has_function);
    vm.bind(OBJECT_CLASS, "hasTag", fun_has_tag);
    vm.bind(OBJECT_CLASS, "timeout", fun_timeout);
    vm.bind(OBJECT_CLASS, "changeState", fun_change_state);
}

fn fun_spawn(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let name = params.first().map(Value::to_text).unwrap_or_default();
    let child = rt.objects.spawn(object, &name)?;

    let has = |program: &str| rt.programs.has(&name, program) || rt.natives.get(&name, program).is_some();
    if has("__ssconstructor") {
        Interpreter::invoke(rt, child, "__ssconstructor", &[])?;
    }
    if has("constructor") {
        Interpreter::invoke(rt, child, "constructor", &[])?;
    }
    Ok(Value::object_handle(child))
}

fn fun_destroy(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    rt.objects.get_mut(object)?.kill();
    Ok(Value::Null)
}

fn fun_get_parent(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::object_handle(rt.objects.get(object)?.parent()))
}

fn fun_child(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let name = params.first().map(Value::to_text).unwrap_or_default();
    let handle = rt.objects.find_child_by_name(object, &name)?.unwrap_or(rt.objects.null());
    Ok(Value::object_handle(handle))
}

fn fun_sibling(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let name = params.first().map(Value::to_text).unwrap_or_default();
    let parent = rt.objects.get(object)?.parent();
    let handle = rt.objects.find_child_by_name(parent, &name)?.unwrap_or(rt.objects.null());
    Ok(Value::object_handle(handle))
}

fn fun_find_child(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let name = params.first().map(Value::to_text).unwrap_or_default();
    Ok(Value::object_handle(find_descendant(rt, object, &name)?.unwrap_or(rt.objects.null())))
}

fn find_descendant(rt: &Runtime, root: u32, name: &str) -> FatalResult<Option<u32>> {
    for child in rt.objects.get(root)?.children().to_vec() {
        if rt.objects.get(child)?.name() == name {
            return Ok(Some(child));
        }
        if let Some(found) = find_descendant(rt, child, name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

fn fun_to_string(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::String("[object]".into()))
}

fn fun_equals(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let other = params.first().and_then(Value::as_object_handle);
    Ok(Value::Bool(other == Some(object)))
}

fn fun_has_function(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let program_name = params.first().map(Value::to_text).unwrap_or_default();
    let name = rt.objects.get(object)?.name().to_string();
    let has = rt.programs.has(&name, &program_name) || rt.natives.get(&name, &program_name).is_some();
    Ok(Value::Bool(has))
}

fn fun_has_tag(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let tag = params.first().map(Value::to_text).unwrap_or_default();
    let name = rt.objects.get(object)?.name().to_string();
    Ok(Value::Bool(rt.tags.has_tag(&name, &tag)))
}

fn fun_timeout(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let seconds = params.first().map(Value::to_number).unwrap_or(0.0);
    let now = rt.now;
    Ok(Value::Bool(rt.objects.get(object)?.timeout(now, seconds)))
}

fn fun_change_state(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let state = params.first().map(Value::to_text).unwrap_or_default();
    let now = rt.now;
    rt.objects.get_mut(object)?.set_state(&state, now);
    Ok(Value::Null)
}
