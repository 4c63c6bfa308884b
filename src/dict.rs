use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::PutError;
use crate::hash_table::Entry;
use crate::hash_table::HashTable;
use crate::hash_table::MIN_CAPACITY;
use crate::hasher::string_hash;
use crate::release::DropRelease;
use crate::release::Release;

/// Owned copy of a caller's key.
type Key = Box<[u8]>;

/// A dictionary from byte-string keys to value handles.
///
/// Keys are copied into storage owned by the dictionary on insert, so the
/// caller's buffer may be dropped or reused as soon as the call returns.
/// Values are owned by the dictionary until it is destroyed, at which point
/// each remaining value is handed to the releaser `R` exactly once. Values
/// displaced by an overwrite are returned to the caller rather than released.
///
/// # Examples
///
/// ```rust
/// use strdict::Dict;
///
/// let mut dict = Dict::new();
/// dict.insert("alpha", 1).unwrap();
///
/// assert_eq!(dict.get("alpha"), Some(&1));
/// assert_eq!(dict.get("beta"), None);
/// ```
pub struct Dict<V, R = DropRelease>
where
    R: Release<V>,
{
    table: HashTable<(Key, V)>,
    release: R,
}

impl<V, R> Debug for Dict<V, R>
where
    V: Debug,
    R: Release<V>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(&String::from_utf8_lossy(k), v);
        }
        map.finish()
    }
}

impl<V> Dict<V> {
    /// Creates an empty dictionary that drops its values on destruction.
    ///
    /// # Panics
    ///
    /// Panics if the initial slot array cannot be allocated.
    pub fn new() -> Self {
        Self::with_release(DropRelease)
    }
}

impl<V> Default for Dict<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, R> Dict<V, R>
where
    R: Release<V>,
{
    /// Creates an empty dictionary that hands its values to `release` when
    /// destroyed.
    ///
    /// # Panics
    ///
    /// Panics if the initial slot array cannot be allocated.
    pub fn with_release(release: R) -> Self {
        Self {
            table: HashTable::new(),
            release,
        }
    }

    /// Fallible form of [`with_release`](Self::with_release).
    pub fn try_with_release(release: R) -> Result<Self, PutError> {
        Ok(Self {
            table: HashTable::try_with_capacity(MIN_CAPACITY)?,
            release,
        })
    }

    /// Returns the number of keys stored.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots in the backing table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of slots examined by lookups and inserts so far.
    pub fn probe_count(&self) -> u64 {
        self.table.probe_count()
    }

    /// Inserts `value` under `key`, treating `None` for either as an absent
    /// handle.
    ///
    /// An absent key or value is rejected with [`PutError::InvalidArgument`]
    /// and leaves the dictionary untouched. A value passed alongside an absent
    /// key is dropped on return; it is never handed to the releaser, which
    /// only sees values the dictionary stored. Otherwise this behaves like
    /// [`insert`](Self::insert).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strdict::Dict;
    /// use strdict::PutError;
    ///
    /// let mut dict: Dict<u32> = Dict::new();
    /// assert_eq!(dict.put(None::<&str>, Some(1)), Err(PutError::InvalidArgument));
    /// assert_eq!(dict.put(Some("k"), None), Err(PutError::InvalidArgument));
    /// assert!(dict.is_empty());
    ///
    /// assert_eq!(dict.put(Some("k"), Some(1)), Ok(None));
    /// ```
    pub fn put<K>(&mut self, key: Option<&K>, value: Option<V>) -> Result<Option<V>, PutError>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        match (key, value) {
            (Some(key), Some(value)) => self.insert(key, value),
            _ => Err(PutError::InvalidArgument),
        }
    }

    /// Inserts `value` under a copy of `key`.
    ///
    /// Returns the value previously stored under `key`, if any. That value is
    /// handed back to the caller, not to the releaser. The entry count only
    /// changes when the key is new.
    ///
    /// If the key cannot be copied, [`PutError::AllocationFailure`] is returned
    /// and the stored entries are unchanged. The rejected `value` is dropped,
    /// not released.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strdict::Dict;
    ///
    /// let mut dict = Dict::new();
    /// assert_eq!(dict.insert("k", 1), Ok(None));
    /// assert_eq!(dict.insert("k", 2), Ok(Some(1)));
    /// assert_eq!(dict.get("k"), Some(&2));
    /// assert_eq!(dict.len(), 1);
    /// ```
    pub fn insert<K>(&mut self, key: &K, value: V) -> Result<Option<V>, PutError>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        match self.table.entry(string_hash(key), |(k, _)| **k == *key)? {
            Entry::Occupied(mut entry) => {
                Ok(Some(core::mem::replace(&mut entry.get_mut().1, value)))
            }
            Entry::Vacant(entry) => {
                entry.insert((duplicate_key(key)?, value));
                Ok(None)
            }
        }
    }

    /// Returns the value stored under `key`.
    pub fn get<K>(&self, key: &K) -> Option<&V>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        self.table
            .find(string_hash(key), |(k, _)| **k == *key)
            .map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut<K>(&mut self, key: &K) -> Option<&mut V>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        self.table
            .find_mut(string_hash(key), |(k, _)| **k == *key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if a value is stored under `key`.
    pub fn contains_key<K>(&self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns an iterator over keys and values, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &V)> + '_ {
        self.table.iter().map(|(k, v)| (&**k, v))
    }

    /// Counts, for every stored key, the probe steps a lookup needs to reach
    /// it.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> crate::hash_table::ProbeHistogram {
        self.table.probe_histogram()
    }

    /// Summarizes occupancy and probe lengths.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }
}

impl<V, R> Drop for Dict<V, R>
where
    R: Release<V>,
{
    fn drop(&mut self) {
        for (_key, value) in self.table.drain() {
            self.release.release(value);
        }
    }
}

/// Copies `key` into a new allocation, reporting failure instead of aborting.
fn duplicate_key(key: &[u8]) -> Result<Key, PutError> {
    let mut owned = Vec::new();
    owned.try_reserve_exact(key.len())?;
    owned.extend_from_slice(key);
    Ok(owned.into_boxed_slice())
}
