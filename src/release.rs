//! The value-release capability a host supplies to a [`Dict`](crate::Dict).

/// Releases a stored value when its dictionary is destroyed.
///
/// A dictionary hands every value it still holds to its releaser exactly once,
/// from `Drop`. Values displaced by an overwrite are returned to the caller
/// instead, and growing the table moves values without releasing them.
///
/// Any `FnMut(V)` closure is a releaser:
///
/// ```rust
/// use core::cell::Cell;
///
/// use strdict::Dict;
///
/// let released = Cell::new(0);
/// {
///     let mut dict = Dict::with_release(|_: u32| released.set(released.get() + 1));
///     dict.insert("a", 1).unwrap();
///     dict.insert("b", 2).unwrap();
/// }
/// assert_eq!(released.get(), 2);
/// ```
pub trait Release<V> {
    /// Takes ownership of `value` and frees whatever it refers to.
    fn release(&mut self, value: V);
}

/// Releases values by dropping them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DropRelease;

impl<V> Release<V> for DropRelease {
    #[inline]
    fn release(&mut self, value: V) {
        drop(value);
    }
}

impl<V, F> Release<V> for F
where
    F: FnMut(V),
{
    #[inline]
    fn release(&mut self, value: V) {
        self(value)
    }
}
