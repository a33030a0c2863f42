// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

use super::*;

#[test]
fn register_and_lookup() {
    let mut pool = ProgramPool::new();
    pool.register("App", "state:main", Program::new(0, 0));
    assert!(pool.has("App", "state:main"));
    assert!(!pool.has("App", "state:wait"));
    assert!(pool.get("App", "state:main").is_some());
}

#[test]
fn recompilation_replaces_program() {
    let mut pool = ProgramPool::new();
    pool.register("App", "fun", Program::new(1, 0));
    pool.register("App", "fun", Program::new(2, 0));
    assert_eq!(pool.get("App", "fun").unwrap().arity, 2);
}

#[test]
fn programs_of_filters_by_object() {
    let mut pool = ProgramPool::new();
    pool.register("App", "state:main", Program::new(0, 0));
    pool.register("App", "helper", Program::new(0, 0));
    pool.register("Other", "state:main", Program::new(0, 0));

    let mut names: Vec<_> = pool.programs_of("App").collect();
    names.sort_unstable();
    assert_eq!(names, vec!["helper", "state:main"]);
}
