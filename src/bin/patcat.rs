//! Pattern log printing.
//!
//! This program reads one pattern log and prints its records,
//! optionally expanded to one line per simulated cycle.
//! Expansion of a run-length record over its cycle count is
//! done here, on the reading side.

use patlog::{ Options, Registry };
use itertools::Itertools;
use std::path::Path;

#[derive(clap::Parser, Debug)]
struct PatCatArgs {
    /// The input pattern log path
    log: String,
    /// Print one line per cycle instead of one per record.
    #[clap(long)]
    expand: bool,
}

fn main() {
    clilog::init_stderr_color_debug();
    let args = <PatCatArgs as clap::Parser>::parse();
    let path = Path::new(&args.log);
    let dir = path.parent().unwrap_or(Path::new("."));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    let id = path.file_stem().unwrap().to_string_lossy().into_owned();

    let mut reg = Registry::new();
    let log = reg.open(
        &id, Options::read(dir).filename(name)
    ).unwrap();
    let mut cycle: u64 = 0;
    while let Some(rec) = log.read_cycle().unwrap() {
        if args.expand {
            for _ in 0..rec.cycles {
                println!("{:>8} {}", cycle,
                         rec.ops.iter().format("; "));
                cycle += 1;
            }
        } else {
            println!("{:>8} x{:<8} {}", cycle, rec.cycles,
                     rec.ops.iter().format("; "));
            cycle += rec.cycles;
        }
    }
    reg.close(&id).unwrap();
    println!("total cycles: {}", cycle);
}
