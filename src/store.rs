//! Generic keyed record store backed by a headerless CSV file.
//!
//! One file per store, one row per record, no header. Row order defines
//! iteration order for the lifetime of the loaded state, and `save`
//! rewrites the whole file in that order. There is no locking: a store
//! instance has exactly one logical owner, the domain layer above it.

use crate::error::{BackofficeError, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::File;
use std::hash::Hash;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// Key projection for a stored record type.
///
/// Every record carries its own key; the store never invents one.
pub trait Keyed {
    /// Key type, unique across all records in one store.
    type Key: Eq + Hash + Clone + Debug;

    /// Extracts this record's key.
    fn key(&self) -> Self::Key;
}

/// In-memory map of records keyed by their [`Keyed`] projection, loaded
/// from and persisted to a single CSV file.
pub struct KeyedStore<V: Keyed> {
    path: PathBuf,
    order: Vec<V::Key>,
    records: HashMap<V::Key, V>,
}

impl<V: Keyed> KeyedStore<V> {
    /// Creates an empty store backed by the given file path.
    ///
    /// Nothing is read until [`load`](Self::load) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        KeyedStore {
            path: path.into(),
            order: Vec::new(),
            records: HashMap::new(),
        }
    }

    /// Clears in-memory state and reloads every record from the backing file.
    ///
    /// A missing file, a malformed row or a duplicate key aborts the load
    /// with an error; the only guarantee after a failed load is that the
    /// previous in-memory state is gone.
    pub fn load(&mut self) -> Result<()>
    where
        V: DeserializeOwned,
    {
        self.order.clear();
        self.records.clear();

        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        for row in reader.deserialize::<V>() {
            let record = row?;
            let key = record.key();
            if !self.add(record) {
                return Err(BackofficeError::DuplicateKey {
                    path: self.path.display().to_string(),
                    key: format!("{:?}", key),
                });
            }
        }

        debug!(
            "loaded {} records from {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Serializes every record, in iteration order, fully overwriting the
    /// backing file.
    pub fn save(&self) -> Result<()>
    where
        V: Serialize,
    {
        let file = File::create(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        for record in self.iter() {
            writer.serialize(record)?;
        }
        writer.flush()?;

        debug!(
            "saved {} records to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Returns `true` if a record with the given key exists.
    pub fn contains_key(&self, key: &V::Key) -> bool {
        self.records.contains_key(key)
    }

    /// Looks up a record by key.
    pub fn get(&self, key: &V::Key) -> Option<&V> {
        self.records.get(key)
    }

    /// Looks up a record by key for mutation.
    ///
    /// The key projection of a record must never change while it is in the
    /// store; callers mutate non-key fields only.
    pub fn get_mut(&mut self, key: &V::Key) -> Option<&mut V> {
        self.records.get_mut(key)
    }

    /// Inserts a record under its own key.
    ///
    /// Returns `false` without mutating anything if the key is taken.
    pub fn add(&mut self, record: V) -> bool {
        let key = record.key();
        if self.records.contains_key(&key) {
            return false;
        }
        self.order.push(key.clone());
        self.records.insert(key, record);
        true
    }

    /// Removes the record with the given key. Returns `false` if absent.
    pub fn remove(&mut self, key: &V::Key) -> bool {
        if self.records.remove(key).is_none() {
            return false;
        }
        self.order.retain(|k| k != key);
        true
    }

    /// Iterates over all records in insertion (row) order.
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.order.iter().map(|key| &self.records[key])
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
