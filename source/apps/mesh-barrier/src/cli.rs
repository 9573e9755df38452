// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Command-line entry: `mesh-barrier` or `mesh-barrier -p <N>`.
//!
//! Only the argument count matters; with two arguments the second is the participant count.
//! Anything else is a silent no-op.

/// What the process should do for a given argument list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// Run the barrier with this many participants.
    Run {
        /// Participant count.
        participants: usize,
    },
    /// Exit immediately without side effects.
    Ignore,
}

/// Participant count used when no arguments are given.
pub const DEFAULT_PARTICIPANTS: usize = 1;

/// Interprets the arguments following the program name.
pub fn parse<S: AsRef<str>>(args: &[S]) -> Invocation {
    match args {
        [] => Invocation::Run { participants: DEFAULT_PARTICIPANTS },
        [_, count] => match count.as_ref().trim().parse::<usize>() {
            Ok(participants) => Invocation::Run { participants },
            Err(_) => Invocation::Ignore,
        },
        _ => Invocation::Ignore,
    }
}
