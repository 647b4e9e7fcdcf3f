//! Cycle-accurate operation recording and replay.
//!
//! A [`CycleLog`] owns one line-oriented log file. Writing
//! buffers the operations recorded for the current cycle and
//! run-length compresses consecutive identical cycles, so a
//! pattern that holds a signal steady for a million cycles
//! costs one record. Reading hands back one [`Record`] at a
//! time; expanding a record over its cycle count is the
//! caller's concern.
//!
//! Logs are created and destroyed through the
//! [`Registry`](crate::registry::Registry).

use crate::error::{ Error, Result };
use crate::line::{ OpLine, Record };
use std::fs::File;
use std::io::{ BufRead, BufReader, BufWriter, Write };
use std::path::{ Path, PathBuf };

/// Whether a log is open for reading or writing.
///
/// Fixed when the log is opened, never changes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
}

/// Options accepted by [`Registry::open`](crate::registry::Registry::open).
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory the log file lives in. Created on open for
    /// writers.
    pub path: PathBuf,
    /// File name inside `path`, `<id>.plog` when not given.
    pub filename: Option<String>,
    /// The fixed access mode.
    pub mode: Mode,
}

impl Options {
    /// Open for recording under `path`.
    #[inline]
    pub fn write(path: impl Into<PathBuf>) -> Options {
        Options { path: path.into(), filename: None, mode: Mode::Write }
    }

    /// Open for replay under `path`.
    #[inline]
    pub fn read(path: impl Into<PathBuf>) -> Options {
        Options { path: path.into(), filename: None, mode: Mode::Read }
    }

    /// Override the default `<id>.plog` file name.
    #[inline]
    pub fn filename(mut self, name: impl Into<String>) -> Options {
        self.filename = Some(name.into());
        self
    }
}

/// One open pattern log.
pub struct CycleLog {
    id: String,
    path_to_file: PathBuf,
    role: Role,
}

enum Role {
    Writer {
        /// Operations recorded since the last cycle boundary.
        line: OpLine,
        /// The most recently distinct line not yet flushed,
        /// with the number of cycles it has repeated so far.
        buffer: Option<(String, u64)>,
        /// Created lazily: a log that never commits a
        /// non-empty cycle never touches the filesystem.
        out: Option<BufWriter<File>>,
    },
    Reader {
        /// Opened lazily on the first read.
        input: Option<BufReader<File>>,
    },
}

fn writer_handle<'a>(
    path: &Path, out: &'a mut Option<BufWriter<File>>
) -> Result<&'a mut BufWriter<File>> {
    match out {
        Some(w) => Ok(w),
        None => {
            let f = File::create(path)?;
            clilog::info!(
                PLOG_CREATE, "created pattern log at {}",
                path.display()
            );
            Ok(out.insert(BufWriter::new(f)))
        }
    }
}

impl CycleLog {
    pub(crate) fn open(id: &str, options: Options) -> Result<CycleLog> {
        let Options { path, filename, mode } = options;
        if mode == Mode::Write {
            std::fs::create_dir_all(&path)?;
        }
        let filename =
            filename.unwrap_or_else(|| format!("{}.plog", id));
        let role = match mode {
            Mode::Write => Role::Writer {
                line: OpLine::default(),
                buffer: None,
                out: None,
            },
            Mode::Read => Role::Reader { input: None },
        };
        Ok(CycleLog {
            id: id.to_string(),
            path_to_file: path.join(filename),
            role,
        })
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn path_to_file(&self) -> &Path {
        &self.path_to_file
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        match self.role {
            Role::Writer { .. } => Mode::Write,
            Role::Reader { .. } => Mode::Read,
        }
    }

    /// True if the log file exists on disk.
    #[inline]
    pub fn exists(&self) -> bool {
        self.path_to_file.exists()
    }

    /// Record one operation against the current cycle.
    pub fn record(
        &mut self, target: &str, method: &str, args: &[&str]
    ) -> Result<()> {
        match &mut self.role {
            Role::Writer { line, .. } => {
                line.record(target, method, args);
                Ok(())
            }
            Role::Reader { .. } => {
                Err(Error::WrongMode(self.id.clone(), "writing"))
            }
        }
    }

    /// Commit a cycle boundary.
    ///
    /// A cycle identical to the buffered one increments its
    /// repeat count; a different one flushes the previous
    /// record and starts a new count at 1. A cycle with no
    /// recorded operations flushes and clears the buffer, so
    /// an idle cycle splits a run and is itself unrecorded.
    pub fn cycle(&mut self) -> Result<()> {
        let CycleLog { id, path_to_file, role } = self;
        let Role::Writer { line, buffer, out } = role else {
            return Err(Error::WrongMode(id.clone(), "writing"));
        };
        let current = if line.is_empty() {
            None
        } else {
            Some(line.render())
        };
        line.clear();
        let repeat = matches!(
            (&*buffer, &current),
            (Some((prev, _)), Some(cur)) if prev == cur
        );
        if repeat {
            if let Some((_, n)) = buffer.as_mut() {
                *n += 1;
            }
        } else {
            if let Some((prev, n)) = buffer.take() {
                let w = writer_handle(path_to_file, out)?;
                writeln!(w, "{}{}", prev, n)?;
            }
            *buffer = current.map(|cur| (cur, 1));
        }
        Ok(())
    }

    /// Read and decode one record.
    ///
    /// Returns `None` at end of stream. Fails with NotFound if
    /// the log file does not exist. Operations are handed back
    /// as verbatim tokens; resolving targets and expanding the
    /// cycle count is up to the caller.
    pub fn read_cycle(&mut self) -> Result<Option<Record>> {
        let CycleLog { id, path_to_file, role } = self;
        let Role::Reader { input } = role else {
            return Err(Error::WrongMode(id.clone(), "reading"));
        };
        let rd = match input {
            Some(rd) => rd,
            None => {
                if !path_to_file.exists() {
                    return Err(Error::NotFound(path_to_file.clone()));
                }
                input.insert(BufReader::new(File::open(&*path_to_file)?))
            }
        };
        let mut raw = String::new();
        if rd.read_line(&mut raw)? == 0 {
            return Ok(None);
        }
        Ok(Some(OpLine::decode(&raw)?))
    }

    /// Flush the final buffered record, if any, and drop the
    /// stream. Operations recorded after the last committed
    /// cycle are discarded.
    pub(crate) fn close(&mut self) -> Result<()> {
        let CycleLog { path_to_file, role, .. } = self;
        match role {
            Role::Writer { buffer, out, .. } => {
                if let Some((prev, n)) = buffer.take() {
                    let w = writer_handle(path_to_file, out)?;
                    writeln!(w, "{}{}", prev, n)?;
                }
                if let Some(w) = out.as_mut() {
                    w.flush()?;
                }
                *out = None;
            }
            Role::Reader { input } => *input = None,
        }
        Ok(())
    }
}

impl Drop for CycleLog {
    fn drop(&mut self) {
        if let Role::Writer { buffer: Some((_, n)), .. } = &self.role {
            clilog::warn!(
                PLOG_DROP,
                "pattern log {} dropped without close, \
                 {} buffered cycle(s) lost",
                self.id, n
            );
        }
    }
}
