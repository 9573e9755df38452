// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: mesh-barrier entrypoint
//!
//! Usage: `mesh-barrier [-p <N>]`. Always exits 0; failures are reported on stderr.

#![forbid(unsafe_code)]

use std::process::ExitCode;

use log::{error, info};
use mesh_barrier::cli::{self, Invocation};
use mesh_barrier::{BarrierConfig, BarrierError, RunSummary};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let participants = match cli::parse(&args) {
        Invocation::Run { participants } => participants,
        Invocation::Ignore => return ExitCode::SUCCESS,
    };

    match execute(participants) {
        Ok(summary) => info!(
            "mesh-barrier: requested={} spawned={} completed={}",
            summary.requested, summary.spawned, summary.completed
        ),
        Err(err) => error!("mesh-barrier: {err}"),
    }
    ExitCode::SUCCESS
}

fn execute(participants: usize) -> Result<RunSummary, BarrierError> {
    let config = BarrierConfig::from_env(participants)?;
    mesh_barrier::run(&config)
}
