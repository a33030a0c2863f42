// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

use super::*;

#[test]
fn new_object_starts_in_main_state_active_and_alive() {
    let obj = Object::new("Player", 3, 1);
    assert_eq!(obj.name(), "Player");
    assert_eq!(obj.handle(), 3);
    assert_eq!(obj.parent(), 1);
    assert_eq!(obj.state(), "main");
    assert!(obj.is_active());
    assert!(!obj.is_killed());
    assert!(obj.children().is_empty());
}

#[test]
fn children_tracked_on_add_and_remove() {
    let mut obj = Object::new("Stage", 1, 0);
    obj.add_child(2);
    obj.add_child(3);
    assert_eq!(obj.children(), &[2, 3]);
    obj.remove_child(2);
    assert_eq!(obj.children(), &[3]);
}

#[test]
fn state_change_resets_timeout_clock() {
    let mut obj = Object::new("Enemy", 5, 1);
    obj.set_state("attack", 10.0);
    assert_eq!(obj.state(), "attack");
    assert!(!obj.timeout(10.5, 1.0));
    assert!(obj.timeout(11.0, 1.0));
}

#[test]
fn kill_is_cooperative_not_immediate() {
    let mut obj = Object::new("Enemy", 5, 1);
    assert!(!obj.is_killed());
    obj.kill();
    assert!(obj.is_killed());
    assert!(obj.is_active(), "kill() must not itself deactivate the object");
}

#[test]
fn transform_is_absent_until_attached() {
    let mut obj = Object::new("Sprite", 2, 1);
    assert!(obj.transform().is_none());
    obj.attach_transform().x = 4.0;
    assert_eq!(obj.transform().unwrap().x, 4.0);
}

#[test]
fn exported_vars_round_trip() {
    let mut obj = Object::new("Player", 3, 1);
    obj.export_var("health", 7);
    assert_eq!(obj.exported_var("health"), Some(7));
    assert_eq!(obj.exported_var("mana"), None);
}
