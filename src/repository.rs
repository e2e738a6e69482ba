use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::Entity;
use crate::storage::{read_json, write_json, KeyValueStore};

/// Returns the id a new record would get in `records`: one past the largest id, or 1.
pub fn next_id<E: Entity>(records: &[E]) -> u64 {
    max_id(records) + 1
}

fn max_id<E: Entity>(records: &[E]) -> u64 {
    records.iter().map(|r| r.id()).max().unwrap_or(0)
}

/// Result of reading a collection.
#[derive(Debug, Clone)]
pub struct Loaded<E> {
    pub records: Vec<E>,
    /// Set when the stored data was malformed and the seed was written in its place.
    pub recovered: bool,
}

/// Read/modify/write access to one entity collection.
///
/// Every mutation re-reads the whole collection, changes it in memory and
/// writes it back with a single `set`. Besides the collection itself the
/// repository keeps a high-water mark under `<key>_seq` so deleted ids are
/// never handed out again.
pub struct Repository<'s, E: Entity> {
    store: &'s dyn KeyValueStore,
    seed: Vec<E>,
}

impl<'s, E: Entity> Repository<'s, E> {
    /// Repository seeded with the entity's default records.
    pub fn new(store: &'s dyn KeyValueStore) -> Self {
        Self::with_seed(store, E::seed())
    }

    pub fn with_seed(store: &'s dyn KeyValueStore, seed: Vec<E>) -> Self {
        Repository { store, seed }
    }

    pub fn store(&self) -> &'s dyn KeyValueStore {
        self.store
    }

    fn seq_key() -> String {
        format!("{}_seq", E::KEY)
    }

    /// First free backup key: `<key>.corrupt`, then `<key>.corrupt.1`, `.2`, ...
    fn corrupt_key(&self) -> Result<String, StoreError> {
        let base = format!("{}.corrupt", E::KEY);
        if self.store.get(&base)?.is_none() {
            return Ok(base);
        }
        let mut n = 1u32;
        loop {
            let key = format!("{}.{}", base, n);
            if self.store.get(&key)?.is_none() {
                return Ok(key);
            }
            n += 1;
        }
    }

    /// Whether the collection key has ever been written.
    pub fn is_initialized(&self) -> Result<bool, StoreError> {
        Ok(self.store.get(E::KEY)?.is_some())
    }

    /// Writes the seed records as the collection and returns them.
    pub fn initialize(&self) -> Result<Vec<E>, StoreError> {
        let seed = self.seed.clone();
        self.persist(&seed, 0)?;
        info!(collection = E::KEY, records = seed.len(), "seeded collection");
        Ok(seed)
    }

    /// Loads the collection, seeding it on first access.
    ///
    /// Malformed data is moved aside to `<key>.corrupt` (or the next free
    /// `<key>.corrupt.N`) and replaced by the seed.
    pub fn load(&self) -> Result<Loaded<E>, StoreError> {
        match read_json::<Vec<E>>(self.store, E::KEY) {
            Ok(Some(records)) => Ok(Loaded { records, recovered: false }),
            Ok(None) => Ok(Loaded { records: self.initialize()?, recovered: false }),
            Err(StoreError::Corrupt { key, source }) => {
                warn!(collection = %key, error = %source, "malformed collection, restoring defaults");
                if let Some(raw) = self.store.get(E::KEY)? {
                    let backup = self.corrupt_key()?;
                    self.store.set(&backup, &raw)?;
                    warn!(collection = E::KEY, %backup, "kept malformed data");
                }
                Ok(Loaded { records: self.initialize()?, recovered: true })
            }
            Err(e) => Err(e),
        }
    }

    pub fn load_all(&self) -> Result<Vec<E>, StoreError> {
        self.load().map(|l| l.records)
    }

    pub fn get(&self, id: u64) -> Result<Option<E>, StoreError> {
        Ok(self.load_all()?.into_iter().find(|r| r.id() == id))
    }

    /// Largest id ever issued. A malformed mark is rebuilt from `fallback`.
    fn high_water_mark(&self, fallback: u64) -> Result<u64, StoreError> {
        let raw = match self.store.get(&Self::seq_key())? {
            Some(raw) => raw,
            None => return Ok(0),
        };
        match raw.trim().parse::<u64>() {
            Ok(n) => Ok(n),
            Err(_) => {
                warn!(collection = E::KEY, value = %raw, rebuilt = fallback, "malformed id sequence, rebuilding");
                self.store.set(&Self::seq_key(), &fallback.to_string())?;
                Ok(fallback)
            }
        }
    }

    fn allocate(&self, records: &[E]) -> Result<u64, StoreError> {
        Ok(next_id(records).max(self.high_water_mark(max_id(records))? + 1))
    }

    /// Id the next created record will receive.
    pub fn next_id(&self) -> Result<u64, StoreError> {
        let records = self.load_all()?;
        self.allocate(&records)
    }

    /// Writes `records`, raising the high-water mark to cover them and `floor`.
    fn persist(&self, records: &[E], floor: u64) -> Result<(), StoreError> {
        let top = max_id(records).max(floor);
        if top > self.high_water_mark(top)? {
            self.store.set(&Self::seq_key(), &top.to_string())?;
        }
        write_json(self.store, E::KEY, records)
    }

    /// Runs `f` over the full collection and writes the result back once.
    ///
    /// Nothing is written when `f` fails.
    pub fn mutate<R, Err, F>(&self, f: F) -> Result<R, Err>
    where
        F: FnOnce(&mut Vec<E>) -> Result<R, Err>,
        Err: From<StoreError>,
    {
        let mut records = self.load_all()?;
        let floor = max_id(&records);
        let out = f(&mut records)?;
        self.persist(&records, floor)?;
        Ok(out)
    }

    /// Creates `record` with a fresh id, or replaces the row with the same id when `is_edit`.
    pub fn upsert(&self, mut record: E, is_edit: bool) -> Result<E, StoreError> {
        let mut records = self.load_all()?;
        let floor = max_id(&records);
        if is_edit {
            let id = record.id();
            let slot = records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or(StoreError::NotFound { entity: E::LABEL, id })?;
            *slot = record.clone();
            debug!(collection = E::KEY, id, "updated record");
        } else {
            let id = self.allocate(&records)?;
            record.set_id(id);
            records.push(record.clone());
            debug!(collection = E::KEY, id, "created record");
        }
        self.persist(&records, floor)?;
        Ok(record)
    }

    /// Deletes the record with `id`. Returns false when there was none.
    pub fn remove(&self, id: u64) -> Result<bool, StoreError> {
        let mut records = self.load_all()?;
        let floor = max_id(&records);
        let len_before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == len_before {
            return Ok(false);
        }
        self.persist(&records, floor)?;
        debug!(collection = E::KEY, id, "removed record");
        Ok(true)
    }

    /// Drops the stored collection so the next read seeds it again.
    /// The id high-water mark is kept.
    pub fn discard(&self) -> Result<(), StoreError> {
        self.store.remove(E::KEY)
    }
}
