// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Script-facing control over the collector: every tick runs one
//! incremental scan step regardless, and additionally forces a full
//! cycle once `frequency` seconds have passed since the last one.

use crate::error::FatalResult;
use crate::interpreter::Runtime;
use crate::vm::Vm;
use orbit_core::Value;

const FREQUENCY_ADDR: usize = 0;
const LAST_COLLECT_ADDR: usize = 1;
const DEFAULT_FREQUENCY: f64 = 1.0;

pub fn install(vm: &mut Vm) {
    vm.bind("__GC", "constructor", fun_constructor);
    vm.bind("__GC", "state:main", fun_state_main);
    vm.bind("__GC", "spawn", fun_noop);
    vm.bind("__GC", "destroy", fun_noop);
    vm.bind("__GC", "getFrequency", fun_get_frequency);
    vm.bind("__GC", "setFrequency", fun_set_frequency);
    vm.bind("__GC", "collect", fun_collect);
}

fn fun_constructor(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    let heap = rt.objects.get_mut(object)?.heap_mut();
    let frequency_addr = heap.alloc()?;
    let last_collect_addr = heap.alloc()?;
    debug_assert_eq!(frequency_addr, FREQUENCY_ADDR);
    debug_assert_eq!(last_collect_addr, LAST_COLLECT_ADDR);
    *heap.at_mut(FREQUENCY_ADDR)? = Value::Number(DEFAULT_FREQUENCY);
    *heap.at_mut(LAST_COLLECT_ADDR)? = Value::Number(0.0);
    Ok(Value::Null)
}

fn fun_noop(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Null)
}

/// The incremental scan itself runs unconditionally every tick from
/// [`crate::vm::Vm::update`]; this only adds the frequency-driven
/// forced full collect on top of it.
fn fun_state_main(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let frequency = rt.objects.get(object)?.heap().at(FREQUENCY_ADDR)?.to_number();
    let last_collect = rt.objects.get(object)?.heap().at(LAST_COLLECT_ADDR)?.to_number();
    if rt.now - last_collect >= frequency {
        fun_collect(rt, object, params)?;
    }
    Ok(Value::Null)
}

fn fun_get_frequency(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(rt.objects.get(object)?.heap().at(FREQUENCY_ADDR)?.clone())
}

fn fun_set_frequency(rt: &mut Runtime, object: u32, params: &[Value]) -> FatalResult<Value> {
    let frequency = params.first().map(Value::to_number).unwrap_or(DEFAULT_FREQUENCY).max(0.0);
    *rt.objects.get_mut(object)?.heap_mut().at_mut(FREQUENCY_ADDR)? = Value::Number(frequency);
    Ok(Value::Null)
}

fn fun_collect(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    rt.gc.collect(rt.objects, rt.stack)?;
    let now = rt.now;
    *rt.objects.get_mut(object)?.heap_mut().at_mut(LAST_COLLECT_ADDR)? = Value::Number(now);
    Ok(Value::Null)
}
