// SPDX-License-Identifier: MIT

//! Append-only write-ahead log of [`StoreEvent`]s, one JSON object per line.
//!
//! Corruption tolerance: `open` scans the file and, if it finds a line that
//! doesn't parse (partial write, binary garbage), rotates the original file
//! to `.bak` (keeping up to 3 generations) and rewrites the file with only
//! the entries that parsed cleanly. `next_unprocessed` tolerates corruption
//! appended after the fact (e.g. a crash mid-write): a line that fails to
//! parse is skipped rather than treated as fatal, and the reader catches up
//! again on the next valid line.

use crate::error::WalError;
use crate::event::StoreEvent;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const FLUSH_THRESHOLD: usize = 100;
const FLUSH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: StoreEvent,
}

pub struct Wal {
    path: PathBuf,
    writer: File,
    write_seq: u64,
    processed_seq: u64,
    next_read_seq: u64,
    read_offset: u64,
    unflushed: usize,
    last_flush: Instant,
}

impl Wal {
    /// Open (or create) the WAL at `path`. `processed_seq` is the sequence
    /// number of the last entry already folded into a snapshot; reads via
    /// [`Wal::next_unprocessed`] start after it.
    pub fn open(path: impl AsRef<Path>, processed_seq: u64) -> Result<Self, WalError> {
        let path = path.as_ref().to_path_buf();

        let (valid_entries, corrupted) = match fs::read(&path) {
            Ok(bytes) => scan_valid_entries(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Vec::new(), false),
            Err(e) => return Err(e.into()),
        };

        if corrupted {
            rotate_backups(&path)?;
            rewrite_clean(&path, &valid_entries)?;
        }

        let write_seq = valid_entries.last().map(|e| e.seq).unwrap_or(0);

        let writer = OpenOptions::new().create(true).append(true).read(true).open(&path)?;

        Ok(Self {
            path,
            writer,
            write_seq,
            processed_seq,
            next_read_seq: processed_seq + 1,
            read_offset: 0,
            unflushed: 0,
            last_flush: Instant::now(),
        })
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Append `event`, returning its assigned sequence number. Buffered —
    /// call [`Wal::flush`] (or rely on [`Wal::needs_flush`]) to persist.
    pub fn append(&mut self, event: &StoreEvent) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry { seq: self.write_seq, event: event.clone() };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.unflushed += 1;
        Ok(entry.seq)
    }

    pub fn flush(&mut self) -> Result<(), WalError> {
        self.writer.flush()?;
        self.unflushed = 0;
        self.last_flush = Instant::now();
        Ok(())
    }

    pub fn needs_flush(&self) -> bool {
        self.unflushed >= FLUSH_THRESHOLD
            || (self.unflushed > 0 && self.last_flush.elapsed() >= FLUSH_INTERVAL)
    }

    /// Record that everything up to `seq` has been folded into the
    /// in-memory state (and, eventually, a snapshot).
    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = seq;
    }

    /// Read the next entry in sequence, skipping over (not erroring on) a
    /// line that fails to parse. Returns `None` at end-of-file or when the
    /// next line is unreadable; a later call may still succeed once more
    /// valid entries have been appended.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        let reader = File::open(&self.path)?;
        let mut buffered = BufReader::new(reader);
        buffered.seek(SeekFrom::Start(self.read_offset))?;

        loop {
            let mut line = String::new();
            let bytes_read = read_line_lossy(&mut buffered, &mut line)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.read_offset += bytes_read as u64;

            match serde_json::from_str::<WalEntry>(line.trim_end()) {
                Ok(entry) if entry.seq == self.next_read_seq => {
                    self.next_read_seq += 1;
                    return Ok(Some(entry));
                }
                // Entry from before our watermark (e.g. just reopened after a
                // snapshot) — already accounted for, keep scanning forward.
                Ok(entry) if entry.seq < self.next_read_seq => continue,
                // A parse failure or an out-of-order seq both mean "stop
                // here"; the offset has already moved past the bad line, so
                // a later call can pick back up once more valid data lands.
                _ => return Ok(None),
            }
        }
    }

    /// All entries with `seq > after`, parsed from the start of the file.
    /// Stops (without erroring) at the first line that fails to parse.
    pub fn entries_after(&self, after: u64) -> Result<Vec<WalEntry>, WalError> {
        let bytes = fs::read(&self.path)?;
        let (entries, _corrupted) = scan_valid_entries(&bytes);
        Ok(entries.into_iter().filter(|e| e.seq > after).collect())
    }

    /// Drop all entries with `seq < keep_from` from the on-disk log. Used
    /// after a snapshot has durably captured everything up to that point.
    pub fn truncate_before(&mut self, keep_from: u64) -> Result<(), WalError> {
        let bytes = fs::read(&self.path)?;
        let (entries, _corrupted) = scan_valid_entries(&bytes);
        let kept: Vec<_> = entries.into_iter().filter(|e| e.seq >= keep_from).collect();
        rewrite_clean(&self.path, &kept)?;
        self.writer = OpenOptions::new().create(true).append(true).read(true).open(&self.path)?;
        self.read_offset = 0;
        self.next_read_seq = self.next_read_seq.max(keep_from);
        Ok(())
    }
}

/// Read one line, tolerating invalid UTF-8 by treating it as an unparseable
/// (and thus skippable) line rather than an I/O error.
fn read_line_lossy(reader: &mut impl BufRead, out: &mut String) -> Result<usize, WalError> {
    let mut raw = Vec::new();
    let n = reader.read_until(b'\n', &mut raw)?;
    if n == 0 {
        return Ok(0);
    }
    *out = String::from_utf8_lossy(&raw).into_owned();
    Ok(n)
}

/// Parse `bytes` as newline-delimited [`WalEntry`] JSON, stopping at the
/// first line that fails to parse (binary data, partial write, non-UTF-8).
/// Returns the valid prefix and whether any trailing unparsed content was
/// found.
fn scan_valid_entries(bytes: &[u8]) -> (Vec<WalEntry>, bool) {
    let mut entries = Vec::new();
    let mut offset = 0usize;
    while offset < bytes.len() {
        let rest = &bytes[offset..];
        let newline_at = rest.iter().position(|&b| b == b'\n');
        let (line, consumed) = match newline_at {
            Some(idx) => (&rest[..idx], idx + 1),
            None => (rest, rest.len()),
        };
        offset += consumed;

        if line.is_empty() {
            continue;
        }
        let text = match std::str::from_utf8(line) {
            Ok(t) => t,
            Err(_) => return (entries, true),
        };
        match serde_json::from_str::<WalEntry>(text) {
            Ok(entry) => entries.push(entry),
            Err(_) => return (entries, true),
        }
    }
    (entries, false)
}

fn rewrite_clean(path: &Path, entries: &[WalEntry]) -> Result<(), WalError> {
    let mut file = File::create(path)?;
    for entry in entries {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        file.write_all(&line)?;
    }
    file.flush()?;
    Ok(())
}

fn rotate_backups(path: &Path) -> Result<(), WalError> {
    if !path.exists() {
        return Ok(());
    }
    let bak1 = path.with_extension("bak");
    let bak2 = path.with_extension("bak.2");
    let bak3 = path.with_extension("bak.3");

    let _ = fs::remove_file(&bak3);
    if bak2.exists() {
        fs::rename(&bak2, &bak3)?;
    }
    if bak1.exists() {
        fs::rename(&bak1, &bak2)?;
    }
    fs::rename(path, &bak1)?;
    Ok(())
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
