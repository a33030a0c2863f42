// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! `orbit` - reference host for the Orbit scripting runtime.
//!
//! Compiles one script, launches a VM over it and ticks it to
//! completion, forwarding everything after `--` to the script as
//! `Application.args`.

mod embedding;

use clap::Parser;
use orbit_runtime::Vm;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "orbit", version, about = "Run an Orbit script")]
struct Cli {
    /// Script source file to compile and run.
    script: PathBuf,

    /// Dump the bytecode of every compiled program before running.
    #[arg(long)]
    debug: bool,

    /// Abort once the VM has run longer than this many seconds.
    #[arg(long, value_name = "SECONDS")]
    timelimit: Option<f64>,

    /// Everything after `--` is passed through as `Application.args`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Compile(#[from] embedding::ReadCompileError),
    #[error(transparent)]
    Runtime(#[from] orbit_runtime::FatalError),
    #[error("time limit of {limit}s exceeded")]
    TimeLimitExceeded { limit: f64 },
    #[error("failed to render bytecode dump: {0}")]
    Dump(#[from] serde_json::Error),
}

fn main() {
    // Logs go to stderr so stdout stays clean for the script's own
    // Console.print/write output.
    tracing_subscriber::fmt::with_max_level(tracing::Level::INFO).with_target(false).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("orbit: {}: {err}", cli.script.display());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let mut vm = Vm::new();

    let source = std::fs::read_to_string(&cli.script).map_err(embedding::ReadCompileError::Io)?;
    let objects = embedding::compile(&source).map_err(embedding::ReadCompileError::Compile)?;
    if cli.debug {
        dump(&objects)?;
    }
    let entry = embedding::entry_object_name(&objects).map(str::to_string);
    embedding::install(&mut vm, objects);

    vm.launch()?;
    vm.set_application_args(cli.args.clone());

    // Spawned as a child of `Application`, not the root: `Application`
    // destroys its own subtree cooperatively when `Application.exit()`
    // kills it, so the script's own top-level object stops ticking in
    // the same pass rather than surviving one extra tick as an orphaned
    // sibling.
    if let Some(name) = entry {
        let application = vm.find("Application").expect("Application is always spawned by launch()");
        vm.spawn(application, &name)?;
    }

    let start = Instant::now();
    let mut last_tick = start;
    loop {
        let dt = last_tick.elapsed().as_secs_f64();
        last_tick = Instant::now();

        if !vm.update(dt)? {
            break;
        }

        if let Some(limit) = cli.timelimit {
            if start.elapsed().as_secs_f64() > limit {
                return Err(CliError::TimeLimitExceeded { limit });
            }
        }
    }

    Ok(())
}

fn dump(objects: &[orbit_compiler::CompiledObject]) -> Result<(), serde_json::Error> {
    for object in objects {
        for (program_name, program) in &object.programs {
            eprintln!("--- {}::{program_name} ---", object.name);
            eprintln!("{}", program.disassemble());
            eprintln!("{}", serde_json::to_string_pretty(program)?);
        }
    }
    Ok(())
}
