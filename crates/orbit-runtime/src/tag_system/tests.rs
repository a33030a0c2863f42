// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

use super::*;

#[test]
fn tag_round_trip() {
    let mut tags = TagSystem::new();
    tags.add_tag("Enemy", "damageable");
    tags.add_tag("Player", "damageable");
    tags.add_tag("Enemy", "ai");

    assert!(tags.has_tag("Enemy", "damageable"));
    assert!(tags.has_tag("Enemy", "ai"));
    assert!(!tags.has_tag("Player", "ai"));

    let mut damageable = tags.names_with_tag("damageable");
    damageable.sort_unstable();
    assert_eq!(damageable, vec!["Enemy", "Player"]);
}

#[test]
fn unknown_name_or_tag_is_empty() {
    let tags = TagSystem::new();
    assert!(!tags.has_tag("Nope", "nope"));
    assert!(tags.tags_of("Nope").is_empty());
    assert!(tags.names_with_tag("nope").is_empty());
}
