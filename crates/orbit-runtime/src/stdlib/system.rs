// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! The root object's own native handlers. Its constructor spawns every
//! fixed system object in order, and its `state:main` watches a private
//! "still active" flag that `exit()` clears — the cooperative shutdown
//! protocol the whole VM rides on.

use crate::error::FatalResult;
use crate::interpreter::{Interpreter, Runtime};
use crate::object::UserData;
use crate::vm::Vm;
use orbit_core::Value;

const IS_ACTIVE_ADDR: usize = 0;

pub fn install(vm: &mut Vm) {
    vm.bind("System", "constructor", fun_constructor);
    vm.bind("System", "state:main", fun_state_main);
    vm.bind("System", "exit", fun_exit);
    vm.bind("System", "destroy", fun_exit);
    vm.bind("System", "spawn", fun_spawn_noop);
    vm.bind("System", "getVersion", fun_get_version);
    vm.bind("System", "getObjectCount", fun_get_object_count);
    vm.bind("System", "objectCount", fun_get_object_count); // parenthesis-less sugar
    vm.bind("System", "getTemp", fun_get_temp);
    vm.bind("System", "getGc", fun_get_gc);
    vm.bind("System", "getTags", fun_get_tags);
}

fn fun_constructor(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    let addr = rt.objects.get_mut(object)?.heap_mut().alloc()?;
    debug_assert_eq!(addr, IS_ACTIVE_ADDR);
    *rt.objects.get_mut(object)?.heap_mut().at_mut(IS_ACTIVE_ADDR)? = Value::Bool(true);

    let names = match &rt.objects.get(object)?.user_data {
        UserData::SystemObjectNames(names) => names.clone(),
        _ => Vec::new(),
    };

    for name in names {
        let child = rt.objects.spawn(object, &name)?;
        if rt.programs.has(&name, "constructor") || rt.natives.get(&name, "constructor").is_some() {
            Interpreter::invoke(rt, child, "constructor", &[])?;
        }
        if let Some(&static_name) = crate::object_manager::SYSTEM_OBJECT_NAMES.iter().find(|&&n| n == name.as_str()) {
            rt.objects.register_system_object(static_name, child);
        }
    }
    Ok(Value::Null)
}

fn fun_state_main(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    let is_active = rt.objects.get(object)?.heap().at(IS_ACTIVE_ADDR)?.to_bool();
    if !is_active {
        rt.objects.get_mut(object)?.kill();
    }
    Ok(Value::Null)
}

fn fun_exit(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    *rt.objects.get_mut(object)?.heap_mut().at_mut(IS_ACTIVE_ADDR)? = Value::Bool(false);
    Ok(Value::Null)
}

fn fun_spawn_noop(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Null)
}

fn fun_get_version(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::String(env!("CARGO_PKG_VERSION").into()))
}

/// How many objects are currently alive in the whole tree. Used by
/// scripts that want to observe GC behaviour directly.
fn fun_get_object_count(rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number(rt.objects.count() as f64))
}

fn fun_get_temp(rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::object_handle(rt.objects.system_object("__Temp").unwrap_or(rt.objects.null())))
}

fn fun_get_gc(rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::object_handle(rt.objects.system_object("__GC").unwrap_or(rt.objects.null())))
}

fn fun_get_tags(rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::object_handle(rt.objects.system_object("__TagSystem").unwrap_or(rt.objects.null())))
}
