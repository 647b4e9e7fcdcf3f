//! The open-log registry.
//!
//! All [`CycleLog`]s are created and destroyed here, which is
//! what enforces "at most one open log per id". The registry
//! also broadcasts the global cycle tick to every open writer
//! so concurrently recorded logs stay in lockstep.
//!
//! The registry is an explicit owned object: construct one at
//! session start and pass it to whoever records or replays.

use crate::error::{ Error, Result };
use crate::log::{ CycleLog, Mode, Options };
use indexmap::IndexMap;

#[derive(Default)]
pub struct Registry {
    logs: IndexMap<String, CycleLog>,
}

impl Registry {
    #[inline]
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Open a new log under `id` and return a borrow of it.
    ///
    /// Ids compare by exact string equality and stay taken
    /// until [`close`](Registry::close).
    pub fn open(
        &mut self, id: &str, options: Options
    ) -> Result<&mut CycleLog> {
        if self.logs.contains_key(id) {
            return Err(Error::DuplicateOpen(id.to_string()));
        }
        let log = CycleLog::open(id, options)?;
        Ok(self.logs.entry(id.to_string()).or_insert(log))
    }

    /// Scoped form of open: run `f` on the freshly opened log,
    /// then close it whether or not `f` succeeded.
    pub fn open_with<T>(
        &mut self, id: &str, options: Options,
        f: impl FnOnce(&mut CycleLog) -> Result<T>,
    ) -> Result<T> {
        let log = self.open(id, options)?;
        let out = f(log);
        self.close(id)?;
        out
    }

    /// Close the log under `id`, flushing its final buffered
    /// record, and free the id for reuse.
    pub fn close(&mut self, id: &str) -> Result<()> {
        match self.logs.shift_remove(id) {
            Some(mut log) => log.close(),
            None => Err(Error::UnknownId(id.to_string())),
        }
    }

    /// The log under `id`, or with no id the most recently
    /// opened still-open log.
    pub fn get(&mut self, id: Option<&str>) -> Result<&mut CycleLog> {
        match id {
            Some(id) => self.logs.get_mut(id)
                .ok_or_else(|| Error::UnknownId(id.to_string())),
            None => {
                self.logs.len().checked_sub(1)
                    .and_then(|i| self.logs.get_index_mut(i))
                    .map(|(_, log)| log)
                    .ok_or_else(|| {
                        Error::UnknownId("(last opened)".to_string())
                    })
            }
        }
    }

    #[inline]
    pub fn is_open(&self, id: &str) -> bool {
        self.logs.contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Advance every open writer by one cycle. Readers have no
    /// cycle state and are skipped.
    pub fn cycle(&mut self) -> Result<()> {
        for (_, log) in self.logs.iter_mut() {
            if log.mode() == Mode::Write {
                log.cycle()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn enforces_one_open_log_per_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = Registry::new();
        reg.open("flash", Options::write(dir.path())).unwrap();
        assert!(matches!(
            reg.open("flash", Options::write(dir.path())),
            Err(Error::DuplicateOpen(_))
        ));
        reg.close("flash").unwrap();
        // the id is free again after close
        reg.open("flash", Options::write(dir.path())).unwrap();
        reg.close("flash").unwrap();
    }

    #[test]
    fn unknown_ids_fail() {
        let mut reg = Registry::new();
        assert!(matches!(
            reg.close("nope"),
            Err(Error::UnknownId(_))
        ));
        assert!(matches!(
            reg.get(Some("nope")),
            Err(Error::UnknownId(_))
        ));
        assert!(matches!(reg.get(None), Err(Error::UnknownId(_))));
    }

    #[test]
    fn get_defaults_to_most_recently_opened() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = Registry::new();
        reg.open("a", Options::write(dir.path())).unwrap();
        reg.open("b", Options::write(dir.path())).unwrap();
        assert_eq!(reg.get(None).unwrap().id(), "b");
        reg.close("b").unwrap();
        assert_eq!(reg.get(None).unwrap().id(), "a");
        reg.close("a").unwrap();
    }

    #[test]
    fn broadcasts_cycles_to_every_open_writer() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = Registry::new();
        reg.open("a", Options::write(dir.path())).unwrap();
        reg.open("b", Options::write(dir.path())).unwrap();
        // a reader in the mix must not break the broadcast
        reg.open("r", Options::read(dir.path())).unwrap();
        for _ in 0..3 {
            reg.get(Some("a")).unwrap()
                .record("pa", "drive", &["1"]).unwrap();
            reg.get(Some("b")).unwrap()
                .record("pb", "drive", &["0"]).unwrap();
            reg.cycle().unwrap();
        }
        reg.close("a").unwrap();
        reg.close("b").unwrap();
        reg.close("r").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("a.plog")).unwrap(),
            "pa,drive,1;3\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("b.plog")).unwrap(),
            "pb,drive,0;3\n"
        );
    }

    #[test]
    fn open_with_closes_on_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = Registry::new();
        reg.open_with("scoped", Options::write(dir.path()), |log| {
            log.record("pins", "drive", &["1"])?;
            log.cycle()
        }).unwrap();
        assert!(!reg.is_open("scoped"));
        assert_eq!(
            fs::read_to_string(dir.path().join("scoped.plog")).unwrap(),
            "pins,drive,1;1\n"
        );
    }
}
