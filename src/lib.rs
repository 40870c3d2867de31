pub mod db;
pub mod drill;
pub mod error;
pub mod prom_metrics;
pub mod session;
pub mod web;

pub use db::{ClueStore, Database, InMemoryStore};
pub use error::{DrillError, ErrorKind};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering from poisoning.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
