//! One cycle's worth of recorded operations.
//!
//! A stored record is one text line:
//! `<op1>;<op2>;...;<opN>;<count>` where each op is
//! `target,method[,arg,...]` and `count` is how many
//! consecutive cycles the operations were held for.
//! Fields must not themselves contain `;` or `,`; no escaping
//! is performed.

use crate::error::{ Error, Result };
use compact_str::CompactString;
use serde::{ Serialize, Deserialize };
use std::fmt;

/// Separator between operations on a line.
const OP_SEP: char = ';';
/// Separator between fields inside one operation.
const ARG_SEP: char = ',';

/// One recorded operation, all fields verbatim string tokens.
///
/// Turning `target` back into a live object is the caller's
/// concern, see [`Resolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub target: CompactString,
    pub method: CompactString,
    pub args: Vec<CompactString>,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.target, ARG_SEP, self.method)?;
        for arg in &self.args {
            write!(f, "{}{}", ARG_SEP, arg)?;
        }
        Ok(())
    }
}

/// A decoded run-length record: the operations of one distinct
/// cycle state and how many consecutive cycles they repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub ops: Vec<Operation>,
    pub cycles: u64,
}

/// Maps a recorded target token back to a live object.
///
/// Replay never evaluates tokens; the caller registers
/// whatever lookup it needs and each decoded token is handed
/// to it verbatim. Any `Fn(&str) -> Option<T>` qualifies.
pub trait Resolver {
    type Target;

    fn resolve(&self, token: &str) -> Option<Self::Target>;
}

impl<T, F: Fn(&str) -> Option<T>> Resolver for F {
    type Target = T;

    #[inline]
    fn resolve(&self, token: &str) -> Option<T> {
        self(token)
    }
}

impl Record {
    /// Resolve every operation's target through `resolver`,
    /// failing on the first token it does not know.
    pub fn resolve<R: Resolver>(
        &self, resolver: &R
    ) -> Result<Vec<(R::Target, &Operation)>> {
        self.ops.iter().map(|op| {
            match resolver.resolve(&op.target) {
                Some(t) => Ok((t, op)),
                None => Err(Error::UnresolvedTarget(op.target.to_string())),
            }
        }).collect()
    }
}

/// Accumulates the operations of the current, not yet
/// committed cycle.
#[derive(Debug, Clone, Default)]
pub struct OpLine {
    ops: Vec<Operation>,
}

impl OpLine {
    pub fn record(&mut self, target: &str, method: &str, args: &[&str]) {
        self.ops.push(Operation {
            target: target.into(),
            method: method.into(),
            args: args.iter().map(|a| CompactString::from(*a)).collect(),
        });
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Render the operations part of a line, each operation
    /// followed by the separator. The cycle count is appended
    /// by the log when the record is flushed.
    pub fn render(&self) -> String {
        self.ops.iter()
            .map(|op| format!("{}{}", op, OP_SEP))
            .collect()
    }

    /// Decode one raw log line into a [`Record`].
    pub fn decode(line: &str) -> Result<Record> {
        let malformed =
            |why: &'static str| Error::MalformedLine(line.to_string(), why);
        let mut fields: Vec<&str> = line.trim().split(OP_SEP).collect();
        let cycles = fields.pop()
            .and_then(|f| f.parse::<u64>().ok())
            .ok_or_else(|| malformed("bad cycle count"))?;
        if fields.is_empty() {
            return Err(malformed("no operations"));
        }
        let mut ops = Vec::with_capacity(fields.len());
        for field in fields {
            if field.split(ARG_SEP).any(|p| p.is_empty()) {
                return Err(malformed("empty operation field"));
            }
            let mut parts = field.split(ARG_SEP);
            match (parts.next(), parts.next()) {
                (Some(target), Some(method)) => ops.push(Operation {
                    target: target.into(),
                    method: method.into(),
                    args: parts.map(CompactString::from).collect(),
                }),
                _ => return Err(malformed("operation without a method")),
            }
        }
        Ok(Record { ops, cycles })
    }
}
