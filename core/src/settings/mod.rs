//! Settings façades: the `sync` / `apply` contract the panels talk to.
//!
//! Each façade hides how many documents sit behind it. `sync()` always
//! re-reads from disk and hands the result to every subscribed observer;
//! `apply()` persists caller-supplied values. Observation is one-shot per
//! `sync()`: nothing watches the files in between.

pub mod ntrip;
pub mod other;

use std::collections::BTreeMap;

use crate::codec::ParamValue;
use crate::error::Result;
use crate::key::ParameterKey;
use crate::schema::Schema;

pub use ntrip::NtripSettings;
pub use other::OtherSettings;

/// Flat settings mapping as exchanged with callers.
pub type ParamMap<K> = BTreeMap<K, ParamValue>;

/// Callback invoked with the mapping produced by a successful `sync()`.
pub type SyncObserver<K> = Box<dyn Fn(&ParamMap<K>) + Send>;


/// Uniform contract over one or more parameter documents.
pub trait SettingsFacade {
    /// How callers address a parameter through this façade.
    type Key: Ord + Clone;

    /// Re-read the backing documents and notify observers.
    fn sync(&mut self) -> Result<ParamMap<Self::Key>>;

    /// Persist `settings`.
    fn apply(&mut self, settings: &ParamMap<Self::Key>) -> Result<()>;

    /// Register an observer for future `sync()` results.
    fn subscribe(&mut self, observer: SyncObserver<Self::Key>);
}


/// Observer list shared by the façade implementations.
pub struct Observers<K> {
    observers: Vec<SyncObserver<K>>,
}

impl<K> Observers<K> {
    pub fn new() -> Self {
        Observers {
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: SyncObserver<K>) {
        self.observers.push(observer);
    }

    /// Call every observer, in subscription order.
    pub fn notify_all(&self, settings: &ParamMap<K>) {
        for observer in &self.observers {
            observer(settings);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

/// Normalise `value` through `schema` unless it equals what the document
/// currently holds. Stored values pass through verbatim, so applying the
/// result of a `sync()` never rewrites or rejects them.
pub(crate) fn normalize_changed(
    schema: &Schema,
    key: &ParameterKey,
    value: &ParamValue,
    current: Option<&ParamValue>,
) -> Result<ParamValue> {
    if current == Some(value) {
        return Ok(value.clone());
    }
    schema.normalize(key, value)
}


impl<K> Default for Observers<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> std::fmt::Debug for Observers<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Observers({})", self.observers.len())
    }
}
