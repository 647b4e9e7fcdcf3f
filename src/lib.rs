//! ## `patlog`: cycle-accurate pattern operation logs
//!
//! This contains the core functionality and data structures
//! for recording and replaying the operations applied to
//! test-vector state, one simulated clock cycle at a time,
//! with run-length compression of repeated cycles, plus the
//! multi-valued (0-F / x / z) data values that ATE pattern
//! formats require.
//!
//! See the binaries for example usage.

pub mod digest;
pub mod error;
pub mod line;
pub mod log;
pub mod registry;
pub mod value;

pub use digest::{ DigestDb, LogDigest };
pub use error::{ Error, Result };
pub use line::{ OpLine, Operation, Record, Resolver };
pub use log::{ CycleLog, Mode, Options };
pub use registry::Registry;
pub use value::{ Bit, Digit, Value };
