// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! The dynamic value type that flows through the whole runtime.
//!
//! Six variants: `Null`, `Bool`, `Number`
//! (IEEE-754 double), `String` (owning a [`ManagedString`]),
//! `ObjectHandle` (index into the object manager's handle table), and the
//! internal `Raw` variant used for activation-frame bookkeeping on the
//! stack (never observable from script code).

use crate::string_pool::ManagedString;
use std::cmp::Ordering;

#[cfg(test)]
mod tests;

/// The typecode returned by `typeof` (and used internally to drive
/// comparison/coercion dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeCode {
    Null = 0,
    Bool = 1,
    Number = 2,
    String = 3,
    ObjectHandle = 4,
    Raw = 5,
}

/// A dynamically-typed runtime value.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(ManagedString),
    ObjectHandle(u32),
    /// Internal bookkeeping value (e.g. a saved base pointer). Never
    /// produced by script-visible operations.
    Raw(u64),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl Value {
    /// Build an object-handle value, collapsing the null handle (0) to
    /// the `Null` variant as required by the data model invariants.
    #[must_use]
    pub fn object_handle(handle: u32) -> Self {
        if handle == 0 {
            Self::Null
        } else {
            Self::ObjectHandle(handle)
        }
    }

    #[must_use]
    pub const fn typecode(&self) -> TypeCode {
        match self {
            Self::Null => TypeCode::Null,
            Self::Bool(_) => TypeCode::Bool,
            Self::Number(_) => TypeCode::Number,
            Self::String(_) => TypeCode::String,
            Self::ObjectHandle(_) => TypeCode::ObjectHandle,
            Self::Raw(_) => TypeCode::Raw,
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::ObjectHandle(_) => "object",
            Self::Raw(_) => "raw",
        }
    }

    /// The object handle this value refers to, if it is (or coerces
    /// trivially to) an object handle. Used by the GC scan callbacks.
    #[must_use]
    pub const fn as_object_handle(&self) -> Option<u32> {
        match self {
            Self::ObjectHandle(h) => Some(*h),
            _ => None,
        }
    }

    /// Exchange the contents of two values in place.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    // ---- coercions -----------------------------------------------------

    #[must_use]
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::ObjectHandle(h) => *h != 0,
            Self::Raw(r) => *r != 0,
        }
    }

    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => parse_numeric(s.as_str()),
            Self::ObjectHandle(_) | Self::Raw(_) => f64::NAN,
        }
    }

    /// Canonical textual form. Object handles print `[object]` — callers
    /// that want a richer representation must explicitly dispatch the
    /// object's `toString` function first (that requires the object
    /// manager and is therefore outside `orbit-core`).
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.as_str().to_string(),
            Self::ObjectHandle(_) => "[object]".to_string(),
            Self::Raw(r) => r.to_string(),
        }
    }

    /// Total-preorder comparison: same-type values compare naturally;
    /// cross-type comparisons follow
    /// a fixed precedence (null by truthiness, raw numerically, string
    /// wins via `strcmp` on the stringified operands, number wins via
    /// numeric comparison with NaN as unordered (`0`), bool as int,
    /// handles numerically).
    #[must_use]
    pub fn compare(&self, other: &Self) -> i32 {
        if self.typecode() == other.typecode() {
            return self.compare_same_type(other);
        }

        if matches!(self, Self::Null) || matches!(other, Self::Null) {
            return cmp_i32(i32::from(self.to_bool()), i32::from(other.to_bool()));
        }
        if matches!(self, Self::Raw(_)) || matches!(other, Self::Raw(_)) {
            return cmp_f64(raw_numeric(self), raw_numeric(other));
        }
        if matches!(self, Self::String(_)) || matches!(other, Self::String(_)) {
            return strcmp(&self.to_text(), &other.to_text());
        }
        if matches!(self, Self::Number(_)) || matches!(other, Self::Number(_)) {
            return cmp_f64(self.to_number(), other.to_number());
        }
        if matches!(self, Self::Bool(_)) || matches!(other, Self::Bool(_)) {
            return cmp_i32(i32::from(self.to_bool()), i32::from(other.to_bool()));
        }
        // Both must be ObjectHandle at this point (handles compared numerically).
        cmp_i32(
            self.as_object_handle().unwrap_or(0) as i32,
            other.as_object_handle().unwrap_or(0) as i32,
        )
    }

    fn compare_same_type(&self, other: &Self) -> i32 {
        match (self, other) {
            (Self::Null, Self::Null) => 0,
            (Self::Bool(a), Self::Bool(b)) => cmp_i32(i32::from(*a), i32::from(*b)),
            (Self::Number(a), Self::Number(b)) => cmp_f64(*a, *b),
            (Self::String(a), Self::String(b)) => strcmp(a.as_str(), b.as_str()),
            (Self::ObjectHandle(a), Self::ObjectHandle(b)) => cmp_i32(*a as i32, *b as i32),
            (Self::Raw(a), Self::Raw(b)) => cmp_f64(*a as f64, *b as f64),
            _ => unreachable!("compare_same_type called with mismatched typecodes"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == 0
    }
}

fn raw_numeric(v: &Value) -> f64 {
    match v {
        Value::Raw(r) => *r as f64,
        other => other.to_number(),
    }
}

/// Signed three-way comparison, as the call-stack/bytecode `cmp`
/// instruction produces it.
fn cmp_i32(a: i32, b: i32) -> i32 {
    match a.cmp(&b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// NaN is unordered and yields `0`.
fn cmp_f64(a: f64, b: f64) -> i32 {
    if a.is_nan() || b.is_nan() {
        return 0;
    }
    if a < b {
        -1
    } else if a > b {
        1
    } else {
        0
    }
}

fn strcmp(a: &str, b: &str) -> i32 {
    match a.cmp(b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// Parse a string as a decimal number the way script source literals are
/// parsed. Returns `NaN` for anything that isn't syntactically numeric.
fn parse_numeric(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Numbers that are integral under `ceil` print without a fractional part;
/// everything else uses a locale-independent decimal point.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if n.ceil() == n && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
