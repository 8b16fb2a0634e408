//! The sieve container: owns the compressed bitmap, grows it on demand,
//! and answers primality and iteration queries.

use bitvec::prelude::*;
use rayon::prelude::*;

use crate::iter::{BackwardPrimes, ForwardPrimes};
use crate::kernel;
use crate::layout::{
    isqrt, packed_bit, segment_of, MAX_THREADS, SPAN_PER_SEGMENT, WORDS_PER_SEGMENT,
};

/// An incrementally growing prime sieve over 64-bit unsigned integers.
///
/// The sieve covers a prefix of the number line one segment at a time and
/// extends itself whenever a query or iterator reaches past the computed
/// prefix. Growth is the only operation that blocks; queries against an
/// already-covered range are constant time.
///
/// Practical limit: memory. Each segment costs ~32 KB for ~510510 integers,
/// so bounds much past 2^42 exhaust memory long before any index arithmetic
/// can overflow.
pub struct PrimeSieve {
    bits: BitVec<u64, Lsb0>,
    segs_computed: usize,
    num_threads: usize,
}

impl PrimeSieve {
    /// An empty sieve with an auto-detected thread count. Nothing is
    /// computed until the first query.
    pub fn new() -> Self {
        Self::with_limit_and_threads(0, 0)
    }

    /// A sieve precomputed so that every query `<= limit` is served without
    /// further growth.
    pub fn with_limit(limit: u64) -> Self {
        Self::with_limit_and_threads(limit, 0)
    }

    /// A sieve precomputed up to `limit` using `threads` workers per growth
    /// call. `threads == 0` auto-detects from the host; any value is
    /// clamped to `[1, MAX_THREADS]`.
    pub fn with_limit_and_threads(limit: u64, threads: usize) -> Self {
        let num_threads = if threads == 0 {
            rayon::current_num_threads().clamp(1, MAX_THREADS)
        } else {
            threads.min(MAX_THREADS)
        };
        let mut sieve = PrimeSieve {
            bits: BitVec::new(),
            segs_computed: 0,
            num_threads,
        };
        sieve.grow_to(limit);
        sieve
    }

    /// Number of segments whose bits are valid. Never decreases.
    pub fn segments_computed(&self) -> usize {
        self.segs_computed
    }

    /// Ensure the sieve covers every integer `<= x`. No-op for `x < 3`.
    pub fn grow_to(&mut self, x: u64) {
        if x >= 3 {
            self.grow_to_internal(((x - 1) / SPAN_PER_SEGMENT) as usize + 1);
        }
    }

    /// Primality of `x`, growing the sieve if `x` lies past the computed
    /// prefix.
    pub fn is_prime(&mut self, x: u64) -> bool {
        if x == 2 {
            return true;
        }
        if x < 2 || x & 1 == 0 {
            return false;
        }
        let seg = segment_of(x);
        if seg >= self.segs_computed {
            self.grow_to_internal(seg + 1);
        }
        !self.bits[packed_bit(x) as usize]
    }

    /// Iterate primes strictly greater than `x` in ascending order. The
    /// sequence is unbounded: walking past the computed prefix grows the
    /// sieve one segment at a time. Begins at 2 when `x < 2`.
    pub fn iter_from(&mut self, x: u64) -> ForwardPrimes<'_> {
        ForwardPrimes::new(self, x)
    }

    /// Iterate primes strictly less than `x` in descending order, ending
    /// after 2. Empty for `x <= 2`. The sieve is grown here, once; the
    /// returned iterator never grows it.
    pub fn iter_back_from(&mut self, x: u64) -> BackwardPrimes<'_> {
        if x > 2 {
            let seg = segment_of(x);
            if seg >= self.segs_computed {
                self.grow_to_internal(seg + 1);
            }
        }
        BackwardPrimes::new(self, x)
    }

    /// All primes in ascending order, starting at 2.
    pub fn primes(&mut self) -> ForwardPrimes<'_> {
        self.iter_from(0)
    }

    /// The first prime strictly greater than `x`.
    pub fn next_prime(&mut self, x: u64) -> u64 {
        self.iter_from(x).next_value()
    }

    /// The first prime strictly less than `x`, or `None` for `x <= 2`.
    pub fn prev_prime(&mut self, x: u64) -> Option<u64> {
        self.iter_back_from(x).next()
    }

    /// Word `i` of the packed bitmap. `i` must lie inside the computed
    /// prefix.
    #[inline]
    pub(crate) fn word(&self, i: usize) -> u64 {
        self.bits.as_raw_slice()[i]
    }

    /// One-past-the-end word index of the computed prefix.
    #[inline]
    pub(crate) fn end_word(&self) -> usize {
        self.segs_computed * WORDS_PER_SEGMENT
    }

    /// Extend the computed prefix by `extra` segments.
    pub(crate) fn grow_segments(&mut self, extra: usize) {
        self.grow_to_internal(self.segs_computed + extra);
    }

    fn grow_to_internal(&mut self, new_segs: usize) {
        if new_segs <= self.segs_computed {
            return;
        }
        self.bits.resize(new_segs * WORDS_PER_SEGMENT * 64, false);
        self.compute_to_internal(new_segs);
    }

    /// Fill segments `[segs_computed, new_segs)`, splitting the work across
    /// up to `num_threads` workers when the batch is large enough to repay
    /// dispatch overhead. Workers write disjoint whole-segment word ranges,
    /// so the only synchronization is the implicit join.
    fn compute_to_internal(&mut self, new_segs: usize) {
        let first = self.segs_computed;
        let todo = new_segs - first;
        let strike = kernel::strike_primes(isqrt(new_segs as u64 * SPAN_PER_SEGMENT));

        let fresh = &mut self.bits.as_raw_mut_slice()
            [first * WORDS_PER_SEGMENT..new_segs * WORDS_PER_SEGMENT];

        if todo < self.num_threads {
            kernel::sieve_segments(fresh, first, new_segs, &strike);
        } else {
            let segs_per_chunk = todo.div_ceil(self.num_threads);
            fresh
                .par_chunks_mut(segs_per_chunk * WORDS_PER_SEGMENT)
                .enumerate()
                .for_each(|(i, chunk)| {
                    let s0 = first + i * segs_per_chunk;
                    let s1 = s0 + chunk.len() / WORDS_PER_SEGMENT;
                    kernel::sieve_segments(chunk, s0, s1, &strike);
                });
        }

        self.segs_computed = new_segs;
    }
}

impl Default for PrimeSieve {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a mut PrimeSieve {
    type Item = u64;
    type IntoIter = ForwardPrimes<'a>;

    fn into_iter(self) -> ForwardPrimes<'a> {
        self.primes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PAD_BITS_PER_SEGMENT;

    #[test]
    fn small_primality_table() {
        let mut sieve = PrimeSieve::new();
        assert!(!sieve.is_prime(0));
        assert!(!sieve.is_prime(1));
        assert!(sieve.is_prime(2));
        assert!(sieve.is_prime(3));
        assert!(!sieve.is_prime(4));
        assert!(sieve.is_prime(17));
        assert!(!sieve.is_prime(25));
        assert!(sieve.is_prime(97));
        assert!(!sieve.is_prime(510_511)); // 19 * 97 * 277, first value of segment 1
        assert!(sieve.is_prime(524_287)); // 2^19 - 1
    }

    #[test]
    fn growth_is_idempotent_and_monotone() {
        let mut sieve = PrimeSieve::new();
        sieve.grow_to(1_000_000);
        let segs = sieve.segments_computed();
        let words = sieve.bits.as_raw_slice().to_vec();

        sieve.grow_to(1_000_000);
        assert_eq!(sieve.segments_computed(), segs);
        assert_eq!(sieve.bits.as_raw_slice(), &words[..]);

        sieve.grow_to(500); // a smaller bound never shrinks coverage
        assert_eq!(sieve.segments_computed(), segs);

        sieve.grow_to(2_000_000);
        assert!(sieve.segments_computed() > segs);
        assert_eq!(&sieve.bits.as_raw_slice()[..words.len()], &words[..]);
    }

    #[test]
    fn thread_count_does_not_change_the_bitmap() {
        let a = PrimeSieve::with_limit_and_threads(10_000_000, 1);
        let b = PrimeSieve::with_limit_and_threads(10_000_000, 4);
        let c = PrimeSieve::with_limit_and_threads(10_000_000, MAX_THREADS + 100);
        assert_eq!(a.segs_computed, b.segs_computed);
        assert_eq!(a.bits.as_raw_slice(), b.bits.as_raw_slice());
        assert_eq!(a.bits.as_raw_slice(), c.bits.as_raw_slice());
    }

    #[test]
    fn padding_bits_stay_set_in_every_segment() {
        let mut sieve = PrimeSieve::with_limit(3_000_000);
        sieve.grow_to(5_000_000);
        let words = sieve.bits.as_raw_slice();
        for s in 0..sieve.segs_computed {
            let top = words[(s + 1) * WORDS_PER_SEGMENT - 1];
            assert!(
                top.leading_ones() as u64 >= PAD_BITS_PER_SEGMENT,
                "segment {s}"
            );
        }
    }

    #[test]
    fn initial_limit_precomputes_enough_segments() {
        let sieve = PrimeSieve::with_limit(SPAN_PER_SEGMENT);
        assert_eq!(sieve.segments_computed(), 1);
        let sieve = PrimeSieve::with_limit(SPAN_PER_SEGMENT + 1);
        assert_eq!(sieve.segments_computed(), 2);
        let sieve = PrimeSieve::with_limit(2);
        assert_eq!(sieve.segments_computed(), 0);
    }

    #[test]
    fn queries_on_covered_range_do_not_grow() {
        let mut sieve = PrimeSieve::with_limit(100_000);
        let segs = sieve.segments_computed();
        assert!(sieve.is_prime(99_991));
        assert_eq!(sieve.segments_computed(), segs);
    }
}
