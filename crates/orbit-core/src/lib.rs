// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Foundational dynamic value type for the Orbit runtime.
//!
//! This crate has no knowledge of objects, heaps, or bytecode — it only
//! defines the tagged `Value` that flows through all of those, and the
//! `ManagedString` it uses for its string variant.

mod string_pool;
mod value;

pub use string_pool::ManagedString;
pub use value::{TypeCode, Value};
