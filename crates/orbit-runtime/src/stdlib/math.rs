// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Stateless numeric helpers. Trigonometric functions take and return
//! degrees, matching the scripting convention rather than `f64`'s own
//! radian-native methods.

use crate::error::FatalResult;
use crate::interpreter::Runtime;
use crate::vm::Vm;
use orbit_core::Value;

const DEG2RAD: f64 = 0.017_453_292_51;
const PI: f64 = 3.141_592_653_5;

pub fn install(vm: &mut Vm) {
    vm.bind("Math", "spawn", fun_noop);
    vm.bind("Math", "destroy", fun_noop);
    vm.bind("Math", "getPi", fun_get_pi);
    vm.bind("Math", "abs", fun_abs);
    vm.bind("Math", "min", fun_min);
    vm.bind("Math", "max", fun_max);
    vm.bind("Math", "clamp", fun_clamp);
    vm.bind("Math", "sqrt", fun_sqrt);
    vm.bind("Math", "pow", fun_pow);
    vm.bind("Math", "round", fun_round);
    vm.bind("Math", "floor", fun_floor);
    vm.bind("Math", "ceil", fun_ceil);
    vm.bind("Math", "sin", fun_sin);
    vm.bind("Math", "cos", fun_cos);
    vm.bind("Math", "random", fun_random);
    vm.bind("Math", "lerp", fun_lerp);
    vm.bind("Math", "approximately", fun_approximately);
}

fn fun_noop(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Null)
}

fn arg(params: &[Value], index: usize) -> f64 {
    params.get(index).map(Value::to_number).unwrap_or(0.0)
}

fn fun_get_pi(_rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number(PI))
}

fn fun_abs(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number(arg(params, 0).abs()))
}

fn fun_min(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number(arg(params, 0).min(arg(params, 1))))
}

fn fun_max(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number(arg(params, 0).max(arg(params, 1))))
}

fn fun_clamp(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let (value, min, max) = (arg(params, 0), arg(params, 1), arg(params, 2));
    Ok(Value::Number(value.clamp(min, max)))
}

fn fun_sqrt(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number(arg(params, 0).sqrt()))
}

fn fun_pow(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number(arg(params, 0).powf(arg(params, 1))))
}

/// Half-away-from-zero, not banker's rounding.
fn fun_round(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let n = arg(params, 0);
    Ok(Value::Number(if n < 0.0 { -(-n + 0.5).floor() } else { (n + 0.5).floor() }))
}

fn fun_floor(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number(arg(params, 0).floor()))
}

fn fun_ceil(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number(arg(params, 0).ceil()))
}

fn fun_sin(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number((arg(params, 0) * DEG2RAD).sin()))
}

fn fun_cos(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    Ok(Value::Number((arg(params, 0) * DEG2RAD).cos()))
}

/// `[0, 1)`, seeded from the VM's own clock rather than an OS RNG —
/// there is no dependency on system entropy in this runtime core.
fn fun_random(rt: &mut Runtime, _object: u32, _params: &[Value]) -> FatalResult<Value> {
    let seed = rt.now.to_bits();
    let x = (seed ^ (seed >> 33)).wrapping_mul(0xff51_afd7_ed55_8ccd);
    Ok(Value::Number(((x >> 11) as f64) / ((1u64 << 53) as f64)))
}

fn fun_lerp(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let (a, b, t) = (arg(params, 0), arg(params, 1), arg(params, 2).clamp(0.0, 1.0));
    Ok(Value::Number(a + (b - a) * t))
}

fn fun_approximately(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let (a, b) = (arg(params, 0), arg(params, 1));
    let epsilon = f64::EPSILON * a.abs().max(b.abs()).max(1.0);
    Ok(Value::Bool((a - b).abs() <= epsilon))
}
