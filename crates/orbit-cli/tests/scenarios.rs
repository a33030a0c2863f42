// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! End-to-end scripts run through the actual `orbit` binary, exercising
//! the compiler and runtime together exactly as a user would invoke
//! them.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn script_file(source: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{source}").unwrap();
    file
}

fn orbit() -> Command {
    let mut cmd = Command::cargo_bin("orbit").unwrap();
    cmd.arg("--timelimit").arg("5");
    cmd
}

#[test]
fn prints_five_and_exits_after_two_ticks() {
    let script = script_file(
        r#"
        object App {
            state main {
                Console.print(2+3);
                Application.exit();
            }
        }
        "#,
    );

    orbit()
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));
}

#[test]
fn runs_main_exactly_three_times_before_exiting() {
    let script = script_file(
        r#"
        object App {
            var x = 0;
            state main {
                x = x + 1;
                Console.print(x);
                if (x == 3) Application.exit();
            }
        }
        "#,
    );

    orbit()
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1").and(predicate::str::contains("2")).and(predicate::str::contains("3")));
}

#[test]
fn array_push_and_parenthesis_less_length() {
    let script = script_file(
        r#"
        object App {
            state main {
                var a = [1, 2, 3];
                a.push(4);
                Console.print(a.length);
                Application.exit();
            }
        }
        "#,
    );

    orbit()
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("4"));
}

#[test]
fn typeof_null_is_the_string_null() {
    let script = script_file(
        r#"
        object App {
            state main {
                if (typeof(null) == "null") Console.print("ok");
                Application.exit();
            }
        }
        "#,
    );

    orbit()
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn spawning_and_destroying_a_thousand_children_brings_object_count_back_down() {
    // There's no script-facing way to orphan an object without killing
    // it outright (the object tree itself is a GC root, see
    // `orbit_runtime::gc`), so this exercises the cooperative
    // destroy()/scheduler sweep path rather than the collector's own
    // heap/stack reachability scan - that one is unit-tested directly
    // in `orbit-runtime`.
    let script = script_file(
        r#"
        object App {
            var baseline = 0;
            state main {
                baseline = System.objectCount;
                for (var i = 0; i < 1000; i = i + 1) {
                    var child = spawn("Foo");
                    child.destroy();
                }
                changeState("settle");
            }
            state settle {
                var current = System.objectCount;
                var delta = current - baseline;
                if (delta < 0) delta = -delta;
                if (delta <= 2) {
                    Console.print("settled");
                    Application.exit();
                }
            }
        }

        object Foo {
        }
        "#,
    );

    orbit()
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("settled"));
}

#[test]
fn state_change_and_timeout_drive_a_second_tick() {
    let script = script_file(
        r#"
        object App {
            state main {
                changeState("wait");
            }
            state wait {
                if (timeout(0.0)) {
                    Console.print("x");
                    Application.exit();
                }
            }
        }
        "#,
    );

    orbit()
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("x"));
}
