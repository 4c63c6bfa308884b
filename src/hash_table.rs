//! The raw open-addressing table underneath [`Dict`](crate::Dict).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt::Debug;
use core::mem;

use crate::error::PutError;
use crate::log;
use crate::probe::ProbeSeq;

/// Initial and smallest number of slots in a table.
pub const MIN_CAPACITY: usize = 512;

/// Whether holding `populated` entries in `capacity` slots reaches the 2/3
/// load factor.
#[inline(always)]
fn at_load_limit(populated: usize, capacity: usize) -> bool {
    populated.saturating_mul(3) >= capacity.saturating_mul(2)
}

enum Slot<V> {
    Empty,
    Occupied { hash: u64, value: V },
}

impl<V> Slot<V> {
    #[inline(always)]
    fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// Allocates `capacity` empty slots, reporting failure instead of aborting.
fn alloc_slots<V>(capacity: usize) -> Result<Box<[Slot<V>]>, PutError> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity)?;
    slots.resize_with(capacity, || Slot::Empty);
    Ok(slots.into_boxed_slice())
}

/// Moves `value` into the first empty slot along its probe sequence.
///
/// `slots` must contain at least one empty slot.
fn place<V>(slots: &mut [Slot<V>], hash: u64, value: V) {
    for index in ProbeSeq::new(hash, slots.len()) {
        if slots[index].is_empty() {
            slots[index] = Slot::Occupied { hash, value };
            return;
        }
    }
}

/// Probe-length statistics for a table.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries in the table
    pub populated: usize,
    /// Total number of slots
    pub capacity: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Probe steps performed over the table's lifetime
    pub probe_count: u64,
    /// Longest probe walk needed to reach any stored entry
    pub max_probe_length: usize,
    /// Mean probe walk needed to reach a stored entry
    pub mean_probe_length: f64,
    /// Bytes used by the slot array
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Dict Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Lifetime probe steps: {}", self.probe_count);
        println!("Slot array: {} bytes", self.total_bytes);
    }
}

/// Histogram of how many probe steps each stored entry needs to be found.
///
/// `counts[i]` is the number of entries found on probe step `i + 1`.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// Entry counts indexed by probe length minus one
    pub counts: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Pretty-print the histogram.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let total: usize = self.counts.iter().sum();
        println!("=== Probe Length Histogram ===");
        for (i, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let share = count as f64 / total.max(1) as f64;
            println!(
                "{:>4}: {:>8} ({:>6.2}%) {}",
                i + 1,
                count,
                share * 100.0,
                "#".repeat((share * 60.0).ceil() as usize)
            );
        }
    }
}

/// An open-addressing hash table with perturbed probing.
///
/// `HashTable<V>` stores values of type `V` in a power-of-two array of slots.
/// Like a raw table, it does not hash anything itself: every operation is
/// given the digest of the value's key and an equality predicate, and the
/// digest is stored next to the value so that growing never needs it again.
///
/// The table grows (doubling) before an insert would take it to a load factor
/// of 2/3 or more, and never shrinks. Entries cannot be removed individually.
///
/// ## Example
///
/// ```rust
/// use strdict::hash_table::Entry;
/// use strdict::hash_table::HashTable;
/// use strdict::hasher::string_hash;
///
/// let mut table: HashTable<(&str, u32)> = HashTable::new();
/// let hash = string_hash(b"answer");
///
/// match table.entry(hash, |&(k, _)| k == "answer").unwrap() {
///     Entry::Vacant(entry) => {
///         entry.insert(("answer", 42));
///     }
///     Entry::Occupied(_) => unreachable!(),
/// }
///
/// assert_eq!(table.find(hash, |&(k, _)| k == "answer"), Some(&("answer", 42)));
/// assert_eq!(table.capacity(), 512);
/// ```
pub struct HashTable<V> {
    slots: Box<[Slot<V>]>,
    populated: usize,
    probes: Cell<u64>,
    /// Largest slot count growth may reach, standing in for an allocator
    /// that refuses bigger arrays.
    #[cfg(test)]
    growth_limit: Option<usize>,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("capacity", &self.capacity())
            .field("probe_count", &self.probe_count())
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with [`MIN_CAPACITY`] slots.
    ///
    /// # Panics
    ///
    /// Panics if the slot array cannot be allocated.
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Creates an empty table with at least `capacity` slots.
    ///
    /// The slot count is rounded up to a power of two and is never smaller
    /// than [`MIN_CAPACITY`]. Note that this is a slot count, not a number of
    /// entries: the table grows once it is two thirds full.
    ///
    /// # Panics
    ///
    /// Panics if the slot array cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use strdict::hash_table::HashTable;
    /// #
    /// let table: HashTable<u32> = HashTable::with_capacity(600);
    /// assert_eq!(table.capacity(), 1024);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).expect("slot array allocation failed")
    }

    /// Fallible form of [`with_capacity`](Self::with_capacity).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use strdict::PutError;
    /// # use strdict::hash_table::HashTable;
    /// #
    /// let table = HashTable::<u64>::try_with_capacity(usize::MAX / 4);
    /// assert_eq!(table.err(), Some(PutError::AllocationFailure));
    /// ```
    pub fn try_with_capacity(capacity: usize) -> Result<Self, PutError> {
        let capacity = capacity
            .max(MIN_CAPACITY)
            .checked_next_power_of_two()
            .ok_or(PutError::AllocationFailure)?;

        Ok(Self {
            slots: alloc_slots(capacity)?,
            populated: 0,
            probes: Cell::new(0),
            #[cfg(test)]
            growth_limit: None,
        })
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of slots examined by lookups and inserts over the
    /// table's lifetime.
    ///
    /// Moving entries while growing is not counted.
    pub fn probe_count(&self) -> u64 {
        self.probes.get()
    }

    /// Walks the probe sequence for `hash`.
    ///
    /// Returns `Ok(index)` for the slot holding a matching value, or
    /// `Err(index)` for the empty slot that ended the walk.
    fn probe(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Result<usize, usize> {
        for index in ProbeSeq::new(hash, self.slots.len()) {
            self.probes.set(self.probes.get() + 1);
            match &self.slots[index] {
                Slot::Empty => return Err(index),
                Slot::Occupied { hash: stored, value } if *stored == hash && eq(value) => {
                    return Ok(index);
                }
                Slot::Occupied { .. } => {}
            }
        }

        unreachable!("probe sequences never end")
    }

    /// Finds the value matching `eq` among entries with digest `hash`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use strdict::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.entry(7, |&v| v == 7).unwrap().or_insert(7);
    ///
    /// assert_eq!(table.find(7, |&v| v == 7), Some(&7));
    /// assert_eq!(table.find(8, |&v| v == 8), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.probe(hash, eq).ok()?;
        match &self.slots[index] {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Empty => None,
        }
    }

    /// Finds the value matching `eq` and returns a mutable reference to it.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.probe(hash, eq).ok()?;
        match &mut self.slots[index] {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Empty => None,
        }
    }

    /// Gets the entry for the value matching `eq`, growing the table first if
    /// one more entry would reach the 2/3 load factor.
    ///
    /// A failed grow is not an error: the table keeps its capacity and the
    /// lookup proceeds. It only fails with [`PutError::AllocationFailure`] when
    /// the table could not grow and the vacant slot found is the last empty
    /// one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use strdict::hash_table::Entry;
    /// # use strdict::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<(u64, &str)> = HashTable::new();
    /// table.entry(1, |&(k, _)| k == 1).unwrap().or_insert((1, "one"));
    ///
    /// match table.entry(1, |&(k, _)| k == 1).unwrap() {
    ///     Entry::Occupied(mut entry) => entry.get_mut().1 = "uno",
    ///     Entry::Vacant(_) => unreachable!(),
    /// }
    /// assert_eq!(table.find(1, |&(k, _)| k == 1), Some(&(1, "uno")));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Result<Entry<'_, V>, PutError> {
        if at_load_limit(self.populated + 1, self.capacity()) {
            self.grow();
        }

        match self.probe(hash, eq) {
            Ok(index) => Ok(Entry::Occupied(OccupiedEntry { table: self, index })),
            Err(index) => {
                // Lookups stop at empty slots, so one must always remain.
                if self.populated + 1 >= self.capacity() {
                    return Err(PutError::AllocationFailure);
                }
                Ok(Entry::Vacant(VacantEntry {
                    table: self,
                    hash,
                    index,
                }))
            }
        }
    }

    #[cold]
    fn grow(&mut self) -> bool {
        let capacity = self.capacity();
        match capacity.checked_mul(2) {
            Some(new_capacity) => self.grow_to(new_capacity),
            None => {
                log::warn!(capacity, "slot count cannot double; keeping current capacity");
                false
            }
        }
    }

    /// Rehashes every entry into a freshly allocated array of `new_capacity`
    /// slots and only then replaces the live array.
    ///
    /// On allocation failure the table is left untouched and `false` is
    /// returned.
    fn grow_to(&mut self, new_capacity: usize) -> bool {
        debug_assert!(new_capacity.is_power_of_two() && new_capacity > self.capacity());

        #[cfg(test)]
        let refused = self.growth_limit.is_some_and(|limit| new_capacity > limit);
        #[cfg(not(test))]
        let refused = false;

        let allocated = if refused {
            Err(PutError::AllocationFailure)
        } else {
            alloc_slots::<V>(new_capacity)
        };
        let mut fresh = match allocated {
            Ok(slots) => slots,
            Err(_) => {
                log::warn!(
                    capacity = self.capacity(),
                    requested = new_capacity,
                    "slot array allocation failed; keeping current capacity"
                );
                return false;
            }
        };

        // Values are moved, never copied or released.
        for slot in self.slots.iter_mut() {
            if let Slot::Occupied { hash, value } = mem::replace(slot, Slot::Empty) {
                place(&mut fresh, hash, value);
            }
        }

        log::debug!(
            from = self.capacity(),
            to = new_capacity,
            entries = self.populated,
            "grew table"
        );
        self.slots = fresh;
        true
    }

    /// Returns an iterator over all values, in no particular order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Removes and yields every value, keeping the allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use strdict::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// for v in 0..10u64 {
    ///     table.entry(v, |&x| x == v).unwrap().or_insert(v);
    /// }
    ///
    /// let mut drained: Vec<u64> = table.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, (0..10).collect::<Vec<_>>());
    /// assert!(table.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            next_index: 0,
        }
    }

    /// Counts, for every stored entry, the probe steps a lookup needs to
    /// reach it.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut counts = Vec::new();
        let capacity = self.capacity();

        for (index, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied { hash, .. } = slot {
                let length = ProbeSeq::new(*hash, capacity)
                    .position(|candidate| candidate == index)
                    .map_or(0, |position| position + 1);
                if counts.len() < length {
                    counts.resize(length, 0);
                }
                if length > 0 {
                    counts[length - 1] += 1;
                }
            }
        }

        ProbeHistogram { counts }
    }

    /// Summarizes occupancy and probe lengths.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let total_steps: usize = histogram
            .counts
            .iter()
            .enumerate()
            .map(|(i, &count)| (i + 1) * count)
            .sum();

        DebugStats {
            populated: self.populated,
            capacity: self.capacity(),
            load_factor: self.populated as f64 / self.capacity() as f64,
            probe_count: self.probe_count(),
            max_probe_length: histogram.counts.len(),
            mean_probe_length: if self.populated == 0 {
                0.0
            } else {
                total_steps as f64 / self.populated as f64
            },
            total_bytes: self.capacity() * mem::size_of::<Slot<V>>(),
        }
    }
}

/// A view into a single slot of a [`HashTable`], found by
/// [`HashTable::entry`].
pub enum Entry<'a, V> {
    /// The slot holds a matching value.
    Occupied(OccupiedEntry<'a, V>),
    /// No matching value exists; the slot is the empty one the probe ended
    /// at.
    Vacant(VacantEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Returns the matching value, inserting `default` if there is none.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Returns the matching value, inserting the result of `default` if there
    /// is none.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }
}

/// An occupied slot holding the value that matched.
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Returns a reference to the stored value.
    pub fn get(&self) -> &V {
        match &self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            Slot::Empty => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Returns a mutable reference to the stored value.
    pub fn get_mut(&mut self) -> &mut V {
        match &mut self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            Slot::Empty => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Converts the entry into a mutable reference bound to the table.
    pub fn into_mut(self) -> &'a mut V {
        match &mut self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            Slot::Empty => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Replaces the stored value, returning the old one.
    pub fn replace(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }
}

/// The empty slot where a new value with the probed digest belongs.
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
    index: usize,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Returns the digest the entry was looked up with.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Stores `value` in the slot and returns a reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        table.populated += 1;
        let slot = &mut table.slots[self.index];
        *slot = Slot::Occupied {
            hash: self.hash,
            value,
        };

        match slot {
            Slot::Occupied { value, .. } => value,
            Slot::Empty => unreachable!(),
        }
    }
}

/// Iterator over the values of a [`HashTable`].
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Slot::Occupied { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// Draining iterator over the values of a [`HashTable`].
///
/// Values not consumed are dropped when the iterator is. The table's count
/// drops as each value is taken, so leaking the iterator leaves the remaining
/// entries in place and accounted for.
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    next_index: usize,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        while self.table.populated > 0 && self.next_index < self.table.slots.len() {
            let slot = &mut self.table.slots[self.next_index];
            self.next_index += 1;
            if let Slot::Occupied { value, .. } = mem::replace(slot, Slot::Empty) {
                self.table.populated -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        self.for_each(drop);
    }
}
