// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Diagnostic dump of raw pipe endpoints
//!
//! Purely observational: nothing in the protocol reads this log back. Line shape:
//! `pipes: fd[0] {read} fd[1]: {write} processes id: {owner} {peer}`; supervisor-owned
//! report/command pairs use `owner == N`.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::Topology;

/// Writes one line per endpoint pair still held by `topology`.
pub fn record_endpoints<W: Write>(topology: &Topology, out: &mut W) -> io::Result<()> {
    for record in topology.endpoints() {
        writeln!(
            out,
            "pipes: fd[0] {} fd[1]: {} processes id: {} {}",
            record.read_fd, record.write_fd, record.owner, record.peer
        )?;
    }
    out.flush()
}

/// Appends the endpoint dump to the file at `path`, creating it if needed.
pub fn append_endpoints(topology: &Topology, path: &Path) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut buf = Vec::new();
    record_endpoints(topology, &mut buf)?;
    file.write_all(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_has_one_line_per_pair() {
        let topology = Topology::build(2).unwrap();
        let mut out = Vec::new();
        record_endpoints(&topology, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 6);
        assert!(text.lines().all(|line| line.starts_with("pipes: fd[0] ")));
        assert!(text.contains("processes id: 0 1"));
        assert!(text.contains("processes id: 1 0"));
        assert!(text.contains("processes id: 2 1"));
    }

    #[test]
    fn append_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipes.log");
        let topology = Topology::build(1).unwrap();
        append_endpoints(&topology, &path).unwrap();
        append_endpoints(&topology, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
    }
}
