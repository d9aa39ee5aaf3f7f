//! Control ledger: the durable record of every document id ever indexed.
//!
//! Plain newline-delimited integers, sorted ascending and deduplicated, so
//! orchestration scripts can diff it against harvest control files. Each
//! [`ControlLedger::record`] merges the new batch into what is already on
//! disk; ids never leave the ledger.

use crate::index::DocId;
use crate::store::write_atomic;
use anyhow::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const LEDGER_FILE: &str = "indexed.txt";

pub struct ControlLedger {
    path: PathBuf,
}

impl ControlLedger {
    /// Ledger stored as `indexed.txt` under the given control directory.
    pub fn new(control_dir: impl AsRef<Path>) -> Self {
        Self {
            path: control_dir.as_ref().join(LEDGER_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the ledger; a missing file is an empty ledger. Blank lines are
    /// ignored and non-numeric lines are skipped with a warning.
    pub fn load(&self) -> Result<BTreeSet<DocId>> {
        if !self.path.exists() {
            return Ok(BTreeSet::new());
        }
        let text = fs::read_to_string(&self.path)?;
        let mut ids = BTreeSet::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<DocId>() {
                Ok(id) => {
                    ids.insert(id);
                }
                Err(_) => tracing::warn!(line, "skipping non-numeric ledger line"),
            }
        }
        Ok(ids)
    }

    /// Merge `processed` into the ledger and rewrite it atomically. Calling
    /// this twice with the same batch leaves the file byte-identical.
    pub fn record(&self, processed: &BTreeSet<DocId>) -> Result<()> {
        let mut all = self.load()?;
        all.extend(processed.iter().copied());
        let mut body = String::new();
        for id in &all {
            body.push_str(&id.to_string());
            body.push('\n');
        }
        write_atomic(&self.path, body.as_bytes())?;
        tracing::debug!(total = all.len(), batch = processed.len(), path = %self.path.display(), "ledger updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ControlLedger::new(dir.path());
        ledger.record(&BTreeSet::from([30, 4])).unwrap();
        ledger.record(&BTreeSet::from([17, 4])).unwrap();
        assert_eq!(
            ledger.load().unwrap().into_iter().collect::<Vec<_>>(),
            vec![4, 17, 30]
        );
    }

    #[test]
    fn rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ControlLedger::new(dir.path());
        let batch = BTreeSet::from([9, 2, 5]);
        ledger.record(&batch).unwrap();
        let first = fs::read(ledger.path()).unwrap();
        ledger.record(&batch).unwrap();
        let second = fs::read(ledger.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap(), "2\n5\n9\n");
    }

    #[test]
    fn tolerates_junk_lines() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ControlLedger::new(dir.path());
        fs::write(ledger.path(), "7\nnot-a-number\n\n12\n").unwrap();
        assert_eq!(
            ledger.load().unwrap().into_iter().collect::<Vec<_>>(),
            vec![7, 12]
        );
    }
}
