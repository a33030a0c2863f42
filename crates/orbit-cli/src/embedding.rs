// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! The host-facing embedding surface: compile a unit of source into
//! [`CompiledObject`]s and install them into a [`Vm`]. A Rust host talks
//! to the runtime through `Vm`/`Value` directly (`vm_create` is just
//! `Vm::new`, the Value accessors are just the `Value` enum), so the
//! only piece this module actually adds on top of `orbit-runtime` is
//! the `vm_compile`/`vm_compile_memory` half of the contract, which
//! needs the compiler crate wired in.

use orbit_compiler::{CompiledObject, CompileError};
use orbit_runtime::Vm;
use std::fs;
use std::path::Path;

/// Parse one compilation unit, without installing it anywhere yet —
/// split out from [`install`] so a caller (the CLI's `--debug` dump)
/// can inspect the compiled programs before they're registered.
pub fn compile(source: &str) -> Result<Vec<CompiledObject>, CompileError> {
    orbit_compiler::compile(source)
}

/// `vm_compile_memory`: parse `source` and install every resulting
/// program into `vm`.
pub fn compile_memory(vm: &mut Vm, source: &str) -> Result<(), CompileError> {
    let objects = compile(source)?;
    install(vm, objects);
    Ok(())
}

/// `vm_compile`: read `path` and compile it the same way.
pub fn compile_path(vm: &mut Vm, path: &Path) -> Result<(), ReadCompileError> {
    let source = fs::read_to_string(path).map_err(ReadCompileError::Io)?;
    compile_memory(vm, &source).map_err(ReadCompileError::Compile)
}

/// Register every program a compilation produced.
pub fn install(vm: &mut Vm, objects: Vec<CompiledObject>) {
    for object in objects {
        for (program_name, program) in object.programs {
            vm.register_program(&object.name, &program_name, program);
        }
    }
}

/// The object a single script's top level declares first, spawned once
/// by the host to actually get anything running. A script is free to
/// declare helper object types after it; only the first one is ever
/// instantiated automatically.
#[must_use]
pub fn entry_object_name(objects: &[CompiledObject]) -> Option<&str> {
    objects.first().map(|o| o.name.as_str())
}

/// Either the source file couldn't be read, or it didn't compile.
#[derive(Debug, thiserror::Error)]
pub enum ReadCompileError {
    #[error(transparent)]
    Io(std::io::Error),
    #[error(transparent)]
    Compile(CompileError),
}
