// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::trace;

use crate::{EventSink, SinkError};

/// File-backed sink opened in append mode, echoing every record to stdout.
///
/// Every process opens its own handle; handles are never shared across a fork.
pub struct FileSink {
    path: PathBuf,
    file: File,
    echo: bool,
}

impl FileSink {
    /// Opens (or creates) the log at `path` with stdout echo enabled.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open { path: path.clone(), source })?;
        Ok(Self { path, file, echo: true })
    }

    /// Disables the stdout echo.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for FileSink {
    fn append(&mut self, record: &str) -> Result<(), SinkError> {
        // O_APPEND + one write per record keeps records whole across processes.
        self.file.write_all(record.as_bytes()).map_err(SinkError::Append)?;
        trace!("evlog: appended {} bytes to {}", record.len(), self.path.display());
        if self.echo {
            let mut stdout = io::stdout().lock();
            stdout.write_all(record.as_bytes()).map_err(SinkError::Echo)?;
            stdout.flush().map_err(SinkError::Echo)?;
        }
        Ok(())
    }
}
