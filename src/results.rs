// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The results log: an append-only file of benchmark records, one
//! JSON object per line, oldest first.
//!
//! Appends within a process are serialized by a mutex.  Across
//! processes each record goes out as a single write to a file opened
//! in append mode, which the operating system places at the end of
//! the file as one unit.  Readers never take the lock: they replay a
//! snapshot bounded by the file length at the moment they started,
//! and ignore a trailing line that has not received its newline yet.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Take, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::{BenchError, Result};
use crate::record::BenchmarkRecord;

/// Handle on a results log file.  Cheap to create; the file itself is
/// only created by the first append.
#[derive(Debug)]
pub struct ResultsLog {
    path: PathBuf,
    writer: Mutex<()>,
}

impl ResultsLog {
    /// A log stored at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        ResultsLog {
            path: path.as_ref().to_path_buf(),
            writer: Mutex::new(()),
        }
    }

    /// Where the log lives.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: io::Error) -> BenchError {
        BenchError::LogWrite {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read_error(&self, source: io::Error) -> BenchError {
        BenchError::LogRead {
            path: self.path.display().to_string(),
            source,
        }
    }

    /// Durably appends one record.  On failure nothing about the
    /// record is lost: the caller still holds it and may try again.
    pub fn append(&self, record: &BenchmarkRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| self.write_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        line.push('\n');

        // The guard protects no data, only the append boundary, so a
        // poisoned lock is still usable.
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| self.write_error(e))?;
        file.sync_data().map_err(|e| self.write_error(e))?;
        debug!(
            path = %self.path.display(),
            implementation = record.implementation(),
            preset = record.preset_name(),
            "appended benchmark record"
        );
        Ok(())
    }

    /// Replays every record currently in the log, oldest first.  The
    /// returned iterator is lazy and sees only what was in the file
    /// when this was called; call again to start over.  A log that
    /// does not exist yet is empty.
    pub fn records(&self) -> Result<Records> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Records {
                    path: self.path.clone(),
                    reader: None,
                    line: 0,
                })
            }
            Err(e) => return Err(self.read_error(e)),
        };
        let snapshot = file.metadata().map_err(|e| self.read_error(e))?.len();
        Ok(Records {
            path: self.path.clone(),
            reader: Some(BufReader::new(file.take(snapshot))),
            line: 0,
        })
    }

    /// Reads the whole log into memory.
    pub fn read_all(&self) -> Result<Vec<BenchmarkRecord>> {
        self.records()?.collect()
    }
}

/// Lazy replay of a results log snapshot.  Lines that do not parse
/// as records are skipped with a warning; an I/O error ends the
/// replay after being yielded once.
#[derive(Debug)]
pub struct Records {
    path: PathBuf,
    reader: Option<BufReader<Take<File>>>,
    line: usize,
}

impl Iterator for Records {
    type Item = Result<BenchmarkRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let reader = self.reader.as_mut()?;
            let mut buffer = Vec::new();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {
                    self.line += 1;
                    if buffer.last() != Some(&b'\n') {
                        // An append still in flight when the snapshot
                        // was taken.
                        self.reader = None;
                        return None;
                    }
                    let text = match String::from_utf8(buffer) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(
                                path = %self.path.display(),
                                line = self.line,
                                error = %e,
                                "skipping results log line that is not UTF-8"
                            );
                            continue;
                        }
                    };
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<BenchmarkRecord>(text) {
                        Ok(record) => return Some(Ok(record)),
                        Err(e) => {
                            warn!(
                                path = %self.path.display(),
                                line = self.line,
                                error = %e,
                                "skipping malformed results log line"
                            );
                        }
                    }
                }
                Err(e) => {
                    self.reader = None;
                    return Some(Err(BenchError::LogRead {
                        path: self.path.display().to_string(),
                        source: e,
                    }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs;
    use tempfile::tempdir;

    fn record(implementation: &str, seconds: f64) -> BenchmarkRecord {
        BenchmarkRecord::new(implementation, "easy", seconds, Utc::now())
    }

    #[test]
    fn missing_log_is_empty() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::open(dir.path().join("never-written.log"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn replay_preserves_append_order() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::open(dir.path().join("bench.log"));
        let written = vec![record("serial", 3.0), record("tiled", 1.0), record("serial", 2.5)];
        for r in &written {
            log.append(r).unwrap();
        }
        assert_eq!(log.read_all().unwrap(), written);
        // Restartable: a second replay sees the same sequence.
        assert_eq!(log.read_all().unwrap(), written);
    }

    #[test]
    fn existing_records_are_never_rewritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bench.log");
        let log = ResultsLog::open(&path);
        log.append(&record("serial", 3.0)).unwrap();
        let before = fs::read_to_string(&path).unwrap();
        log.append(&record("tiled", 1.0)).unwrap();
        let after = fs::read_to_string(&path).unwrap();
        assert!(after.starts_with(&before));
        assert_eq!(after.lines().count(), 2);
    }

    #[test]
    fn snapshot_ignores_later_appends() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::open(dir.path().join("bench.log"));
        log.append(&record("serial", 3.0)).unwrap();
        let replay = log.records().unwrap();
        log.append(&record("tiled", 1.0)).unwrap();
        assert_eq!(replay.count(), 1);
        assert_eq!(log.records().unwrap().count(), 2);
    }

    #[test]
    fn malformed_and_partial_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bench.log");
        let good = serde_json::to_string(&record("serial", 3.0)).unwrap();
        let contents = format!(
            "{}\nnot a record\n\n{}\n{{\"implementation\":\"tiled\"",
            good, good
        );
        fs::write(&path, contents).unwrap();
        let records = ResultsLog::open(&path).read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.implementation() == "serial"));
    }

    #[test]
    fn lines_that_are_not_utf8_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bench.log");
        let log = ResultsLog::open(&path);
        log.append(&record("serial", 3.0)).unwrap();
        OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"\xff\xfe garbage\n")
            .unwrap();
        log.append(&record("tiled", 1.0)).unwrap();

        let records = log.read_all().unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.implementation()).collect();
        assert_eq!(names, vec!["serial", "tiled"]);
    }

    #[test]
    fn unwritable_log_reports_a_retryable_error() {
        let dir = tempdir().unwrap();
        // A directory can't be opened for appending.
        let log = ResultsLog::open(dir.path());
        let err = log.append(&record("serial", 1.0)).unwrap_err();
        assert!(err.is_retryable());
        match err {
            BenchError::LogWrite { .. } => {}
            other => panic!("expected LogWrite, got {:?}", other),
        }
    }
}
