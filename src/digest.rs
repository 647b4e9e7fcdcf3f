//! Log digests for cross-run comparison.
//!
//! A digest folds every record of a log into totals plus a
//! rolling content hash, so a golden set of patterns can be
//! regression-checked across generation runs without keeping
//! the logs themselves. A [`DigestDb`] collects digests keyed
//! by pattern id and persists through serde (the binaries use
//! CBOR).

use crate::error::{ Error, Result };
use crate::line::{ OpLine, Record };
use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{ Serialize, Deserialize };
use std::fs::File;
use std::io::{ BufRead, BufReader };
use std::path::Path;

/// Digest of one complete log.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct LogDigest {
    /// Stored run-length records.
    pub records: u64,
    /// Total cycles after run-length expansion.
    pub cycles: u64,
    /// Rolling hash of record contents and counts.
    pub hash: u64,
}

impl LogDigest {
    /// Digest the log at `path`. Any malformed line aborts the
    /// digest.
    pub fn of_file(path: &Path) -> Result<LogDigest> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let rd = BufReader::new(File::open(path)?);
        let mut digest = LogDigest { records: 0, cycles: 0, hash: 0 };
        for line in rd.lines() {
            digest.fold(&OpLine::decode(&line?)?);
        }
        Ok(digest)
    }

    fn fold(&mut self, rec: &Record) {
        self.records += 1;
        self.cycles += rec.cycles;
        let mut h = self.hash
            .wrapping_mul(1000003)
            .wrapping_add(rec.cycles);
        for op in &rec.ops {
            for b in op.to_string().bytes() {
                h = h.wrapping_mul(257).wrapping_add(b as u64 + 1);
            }
            // mark the operation boundary
            h = h.wrapping_mul(257);
        }
        self.hash = h;
    }
}

/// The digest database, keyed by pattern id.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct DigestDb {
    pub logs: IndexMap<CompactString, LogDigest>,
}

impl DigestDb {
    /// Create a new empty database.
    #[inline]
    pub fn new() -> DigestDb {
        DigestDb::default()
    }

    /// Digest the log at `path` and store it under `id`,
    /// replacing any previous digest with that id. Call once
    /// per pattern to build a database incrementally.
    pub fn feed_log(
        &mut self, id: &str, path: &Path
    ) -> Result<LogDigest> {
        let digest = LogDigest::of_file(path)?;
        self.logs.insert(id.into(), digest);
        Ok(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_log(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn counts_records_and_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(
            dir.path(), "a.plog",
            "pins,drive,1;5\nclk,toggle;1\n"
        );
        let d = LogDigest::of_file(&path).unwrap();
        assert_eq!(d.records, 2);
        assert_eq!(d.cycles, 6);
    }

    #[test]
    fn detects_content_changes() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_log(dir.path(), "a.plog", "pins,drive,1;5\n");
        let b = write_log(dir.path(), "b.plog", "pins,drive,1;5\n");
        let c = write_log(dir.path(), "c.plog", "pins,drive,0;5\n");
        let da = LogDigest::of_file(&a).unwrap();
        assert_eq!(da, LogDigest::of_file(&b).unwrap());
        assert_ne!(da.hash, LogDigest::of_file(&c).unwrap().hash);
        // a changed count also changes the hash
        let e = write_log(dir.path(), "e.plog", "pins,drive,1;6\n");
        assert_ne!(da.hash, LogDigest::of_file(&e).unwrap().hash);
    }

    #[test]
    fn missing_and_malformed_logs_fail() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            LogDigest::of_file(&dir.path().join("nope.plog")),
            Err(Error::NotFound(_))
        ));
        let bad = write_log(dir.path(), "bad.plog", "pins,drive,1;x\n");
        assert!(matches!(
            LogDigest::of_file(&bad),
            Err(Error::MalformedLine(..))
        ));
    }

    #[test]
    fn db_round_trips_through_cbor() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_log(dir.path(), "a.plog", "pins,drive,1;5\n");
        let b = write_log(dir.path(), "b.plog", "clk,toggle;9\n");
        let mut db = DigestDb::new();
        db.feed_log("a", &a).unwrap();
        db.feed_log("b", &b).unwrap();

        let mut buf = Vec::new();
        ciborium::into_writer(&db, &mut buf).unwrap();
        let back: DigestDb =
            ciborium::from_reader(buf.as_slice()).unwrap();
        assert_eq!(db, back);
    }

    #[test]
    fn feeding_the_same_id_replaces_the_digest() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_log(dir.path(), "a.plog", "pins,drive,1;5\n");
        let b = write_log(dir.path(), "b.plog", "pins,drive,0;2\n");
        let mut db = DigestDb::new();
        db.feed_log("pat", &a).unwrap();
        let d = db.feed_log("pat", &b).unwrap();
        assert_eq!(db.logs.len(), 1);
        assert_eq!(db.logs["pat"], d);
        assert_eq!(d.cycles, 2);
    }
}
