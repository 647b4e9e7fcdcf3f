//! Pattern digest comparison.
//!
//! This program reads two digest databases built from two
//! pattern generation runs and reports the patterns whose
//! recorded cycles diverge.

use patlog::DigestDb;
use ciborium::from_reader;
use std::fs::File;
use std::io::BufReader;
use itertools::Itertools;

#[derive(clap::Parser, Debug)]
struct PatDiffArgs {
    /// The database 1
    db1: String,
    /// The database 2
    db2: String,
}

fn main() {
    clilog::init_stderr_color_debug();
    let args = <PatDiffArgs as clap::Parser>::parse();
    println!("args: {:#?}", args);
    let db1: DigestDb = from_reader(
        BufReader::new(File::open(&args.db1).unwrap())
    ).unwrap();
    let db2: DigestDb = from_reader(
        BufReader::new(File::open(&args.db2).unwrap())
    ).unwrap();

    let mut unchanged = 0usize;
    let mut changed = Vec::new();
    let mut only1 = Vec::new();
    for (id, d1) in db1.logs.iter() {
        match db2.logs.get(id) {
            Some(d2) if d1 == d2 => unchanged += 1,
            Some(d2) => changed.push((id, *d1, *d2)),
            None => only1.push(id),
        }
    }
    let only2: Vec<_> = db2.logs.keys()
        .filter(|id| !db1.logs.contains_key(*id))
        .collect();

    println!("total patterns: {} / {}",
             db1.logs.len(), db2.logs.len());
    println!("unchanged: {}", unchanged);
    println!("changed: {}", changed.len());
    for (id, d1, d2) in &changed {
        println!("  {}: {} -> {} records, {} -> {} cycles, \
                  hash {:#x} -> {:#x}",
                 id, d1.records, d2.records,
                 d1.cycles, d2.cycles, d1.hash, d2.hash);
    }
    if !only1.is_empty() {
        println!("only in {}: {{ {} }}",
                 args.db1, only1.iter().format(", "));
    }
    if !only2.is_empty() {
        println!("only in {}: {{ {} }}",
                 args.db2, only2.iter().format(", "));
    }
}
