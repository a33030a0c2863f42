// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! The object user scripts are spawned under. `exit()` starts the
//! cooperative shutdown protocol; the root notices on its own next
//! tick and finishes the job.

use crate::error::FatalResult;
use crate::interpreter::{Interpreter, Runtime};
use crate::object::UserData;
use crate::vm::Vm;
use orbit_core::Value;

pub fn install(vm: &mut Vm) {
    vm.bind("Application", "exit", fun_exit);
    vm.bind("Application", "destroy", fun_exit);
    vm.bind("Application", "print", fun_print);
    vm.bind("Application", "crash", fun_crash);
    vm.bind("Application", "args", fun_args);
}

fn fun_exit(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    let root = rt.objects.root();
    Interpreter::invoke(rt, root, "exit", &[])?;
    rt.objects.get_mut(object)?.kill();
    Ok(Value::Null)
}

fn fun_print(_rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let text = params.first().map(Value::to_text).unwrap_or_default();
    println!("{text}");
    Ok(Value::Null)
}

/// The host's command-line arguments, as an `Array` of strings — set by
/// the embedder (the CLI's `--` separator feeds it) via
/// [`crate::vm::Vm::set_application_args`]. Spawned fresh on every
/// access rather than cached, matching how every other accessor here
/// hands back a snapshot rather than a live view.
fn fun_args(rt: &mut Runtime, object: u32, _params: &[Value]) -> FatalResult<Value> {
    let strings = match &rt.objects.get(object)?.user_data {
        UserData::Args(strings) => strings.clone(),
        _ => Vec::new(),
    };
    let array = rt.objects.spawn(object, "Array")?;
    Interpreter::invoke(rt, array, "constructor", &[])?;
    rt.objects.get_mut(array)?.user_data =
        UserData::Array(strings.into_iter().map(|s| Value::String(s.into())).collect());
    Ok(Value::object_handle(array))
}

/// Abort the whole VM with a message, bypassing the cooperative
/// shutdown protocol — there is no well-defined state left to tick.
fn fun_crash(rt: &mut Runtime, _object: u32, params: &[Value]) -> FatalResult<Value> {
    let message = params.first().map(Value::to_text).unwrap_or_default();
    tracing::error!(message = %message, "application crashed");
    Err(crate::error::FatalError::ScriptCrash(message))
}
