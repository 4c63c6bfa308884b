//! Perturbed open-addressing probe sequence.

/// Number of bits shifted out of the perturbation on every step.
const PERTURB_SHIFT: u32 = 5;

/// The ordered, unbounded sequence of slot indices examined for a digest.
///
/// The first index is `hash & mask`. Each subsequent index is
/// `(5 * index + perturb + 1) & mask` after shifting `perturb` right by five
/// bits. Once the perturbation has been shifted out entirely the recurrence
/// `i -> 5i + 1 (mod capacity)` has full period, so for a power-of-two
/// capacity every slot is eventually visited.
///
/// # Examples
///
/// ```rust
/// use strdict::probe::ProbeSeq;
///
/// let seq: Vec<usize> = ProbeSeq::new(0, 8).take(8).collect();
/// assert_eq!(seq, [0, 1, 6, 7, 4, 5, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct ProbeSeq {
    index: usize,
    perturb: u64,
    mask: usize,
}

impl ProbeSeq {
    /// Starts the sequence for `hash` over a table of `capacity` slots.
    ///
    /// `capacity` must be a non-zero power of two.
    #[inline]
    pub fn new(hash: u64, capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        let mask = capacity - 1;
        Self {
            index: hash as usize & mask,
            perturb: hash,
            mask,
        }
    }
}

impl Iterator for ProbeSeq {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        let current = self.index;
        self.perturb >>= PERTURB_SHIFT;
        self.index = self
            .index
            .wrapping_mul(5)
            .wrapping_add(self.perturb as usize)
            .wrapping_add(1)
            & self.mask;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn starts_at_masked_hash() {
        let mut seq = ProbeSeq::new(0xdead_beef, 512);
        assert_eq!(seq.next(), Some(0xdead_beef & 511));
    }

    #[test]
    fn follows_perturbed_recurrence() {
        let hash = 0x0123_4567_89ab_cdefu64;
        let mask = 1023usize;
        let mut expected_index = hash as usize & mask;
        let mut perturb = hash;

        for index in ProbeSeq::new(hash, 1024).take(64) {
            assert_eq!(index, expected_index);
            perturb >>= 5;
            expected_index = (expected_index * 5 + perturb as usize + 1) & mask;
        }
    }

    #[test]
    fn visits_every_slot() {
        for &hash in &[0u64, 1, 12_416_037_344, u64::MAX, 0x8000_0000_0000_0000] {
            let capacity = 512;
            let mut seen = vec![false; capacity];
            // 13 steps drain a 64-bit perturbation, after which the plain
            // recurrence needs at most `capacity` more.
            for index in ProbeSeq::new(hash, capacity).take(13 + capacity) {
                seen[index] = true;
            }
            assert!(seen.iter().all(|&s| s), "hash {hash:#x} missed a slot");
        }
    }
}
