// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Fatal runtime errors.
//!
//! Per the runtime's error handling design there is no exception
//! mechanism and no unwinding: allocation failures, type errors, arity
//! mismatches and script-level crashes are all fatal and terminate the
//! VM. We still model them as a `Result` internally (rather than
//! panicking deep in `Heap`/`Stack`/`Interpreter`) so the one place that
//! actually owns "the VM has terminated" — `Vm::update` — can log the
//! failure and report termination through its normal `bool` return value
//! instead of unwinding through arbitrary call depths.

use thiserror::Error;

/// A fatal, unrecoverable runtime condition.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FatalError {
    #[error("heap allocation failed: ceiling of {ceiling} cells exceeded")]
    HeapCeilingExceeded { ceiling: usize },

    #[error("heap access at 0x{addr:x}: null pointer exception")]
    HeapOutOfRange { addr: usize },

    #[error("stack overflow")]
    StackOverflow,

    #[error("can't pop(): empty stack")]
    StackUnderflow,

    #[error("stack_at({index}) out of bounds [0, {sp}]")]
    StackOutOfRange { index: i64, sp: usize },

    #[error("unbound label {label} in program '{program}'")]
    UnboundLabel { program: String, label: u32 },

    #[error(
        "arity mismatch calling '{program}' on object '{object}': expected {expected} parameter(s), got {got}"
    )]
    ArityMismatch { object: String, program: String, expected: usize, got: usize },

    #[error("call to undefined program '{program}' on object '{object}'")]
    UndefinedProgram { object: String, program: String },

    #[error("call on non-existent object (handle {handle})")]
    InvalidHandle { handle: u32 },

    #[error("{0}")]
    ScriptCrash(String),
}

/// The result type returned by every fallible runtime operation.
pub type FatalResult<T> = Result<T, FatalError>;
