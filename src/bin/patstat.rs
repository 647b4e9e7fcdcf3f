//! Pattern log digesting.
//!
//! This program reads one pattern log, folds it into a digest
//! (record count, expanded cycle count, content hash) and
//! stores the digest in a database file keyed by pattern id.
//!
//! It can optionally build on a previous database, which means
//! you can call it once per pattern across a whole pattern set.
//!
//! The digest database is later used to compare two pattern
//! generation runs.

use patlog::DigestDb;
use ciborium::{ from_reader, into_writer };
use std::fs::File;
use std::path::Path;

#[derive(clap::Parser, Debug)]
struct PatStatArgs {
    /// The input pattern log path
    log: String,
    /// The database output file path.
    db_output: String,
    /// The pattern id to store the digest under.
    ///
    /// If not specified, the log file stem is used.
    #[clap(long)]
    id: Option<String>,
    /// The optional previous database path.
    ///
    /// If not specified, a new one will be created.
    #[clap(long)]
    db_input: Option<String>,
}

fn main() {
    clilog::init_stderr_color_debug();
    let args = <PatStatArgs as clap::Parser>::parse();
    println!("args: {:?}", args);
    let mut db: DigestDb = match &args.db_input {
        Some(dbpath) => from_reader(
            File::open(dbpath).unwrap()
        ).unwrap(),
        None => DigestDb::new()
    };
    let id = args.id.clone().unwrap_or_else(|| {
        Path::new(&args.log).file_stem().unwrap()
            .to_string_lossy().into_owned()
    });
    let digest = db.feed_log(&id, Path::new(&args.log)).unwrap();
    println!("{}: {} records, {} cycles, hash {:#018x}",
             id, digest.records, digest.cycles, digest.hash);
    into_writer(
        &db,
        File::create(&args.db_output).unwrap()
    ).unwrap();
}
