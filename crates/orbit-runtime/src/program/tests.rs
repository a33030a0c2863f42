// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

use super::*;

#[test]
fn labels_resolve_after_binding() {
    let mut p = Program::new(0, 0);
    let label = p.create_label();
    p.emit(Instruction::new(Op::Jmp, label as i32, 0, 0));
    assert_eq!(p.label_target(label), None);
    p.bind_label(label);
    assert_eq!(p.label_target(label), Some(1));
    assert!(p.all_labels_bound());
}

#[test]
fn unbound_label_is_detectable() {
    let mut p = Program::new(0, 0);
    let _label = p.create_label();
    assert!(!p.all_labels_bound());
}

#[test]
fn constants_round_trip() {
    let mut p = Program::new(0, 0);
    let idx = p.add_constant(Value::Number(42.0));
    assert_eq!(p.constant(idx).unwrap().to_number(), 42.0);
}
