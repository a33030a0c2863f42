// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Tracks elapsed VM time and per-tick delta, derived from
//! [`Runtime::now`] rather than an OS clock read — the runtime core has
//! no notion of wall-clock time beyond what `Vm::update`'s caller feeds
//! it.

use crate::error::FatalResult;
use crate::interpreter::Runtime;
use crate::vm::Vm;
use orbit_core::Value;

const TIME_ADDR: usize = 0;
const DELTA_ADDR: usize = 1;

pub fn install(vm: &mut Vm) {
    vm.bind("Time", "constructor", fun_constructor);
    vm.bind("Time", "state:main", fun_state_main);
    vm.bind("Time", "spawn", fun_noop);
    vm.bind("Time", "destroy", fun_noop);
    vm.bind("Time", "getTime", fun_get_time);
    vm.bind("Time", "getDelta", fun_get_delta);
}

fn fun_constructor(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    let heap = rt.objects.get_mut(object)?.heap_mut();
    let time_addr = heap.alloc()?;
    let delta_addr = heap.alloc()?;
    debug_assert_eq!(time_addr, TIME_ADDR);
    debug_assert_eq!(delta_addr, DELTA_ADDR);
    *heap.at_mut(TIME_ADDR)? = Value::Number(0.0);
    *heap.at_mut(DELTA_ADDR)? = Value::Number(0.0);
    Ok(Value::Null)
}

fn fun_state_main(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    let now = rt.now;
    let heap = rt.objects.get_mut(object)?.heap_mut();
    let previous = heap.at(TIME_ADDR)?.to_number();
    *heap.at_mut(DELTA_ADDR)? = Value::Number(now - previous);
    *heap.at_mut(TIME_ADDR)? = Value::Number(now);
    Ok(Value::Null)
}

fn fun_noop(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Null)
}

fn fun_get_time(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(rt.objects.get(object)?.heap().at(TIME_ADDR)?.clone())
}

fn fun_get_delta(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(rt.objects.get(object)?.heap().at(DELTA_ADDR)?.clone())
}
