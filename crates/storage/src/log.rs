use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

/// Number of log entries kept by [`MemoryLog`].
pub const CAPACITY: usize = 100;

pub static LOG: Mutex<Option<Arc<dyn Repository>>> = Mutex::new(None);

#[allow(clippy::missing_errors_doc)]
pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

static LOGGER: Logger = Logger;

/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(repository: Arc<dyn Repository>, level: LevelFilter) -> Result<(), SetLoggerError> {
    if let Ok(mut log) = LOG.lock() {
        *log = Some(repository);
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let repository = match LOG.lock() {
            Ok(log) => log.clone(),
            Err(_) => None,
        };

        if let Some(repository) = repository {
            let _ = repository.write_entry(Entry {
                time: Local::now().format("%b %d %H:%M:%S").to_string(),
                level: record.level(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}

/// Log entries kept in memory, newest first.
#[derive(Default)]
pub struct MemoryLog {
    entries: Mutex<VecDeque<Entry>>,
}

impl Repository for MemoryLog {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|err| Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: Entry) -> Result<(), Error> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| Error::Unknown(err.to_string()))?;
        entries.push_front(entry);
        entries.truncate(CAPACITY);
        Ok(())
    }
}
