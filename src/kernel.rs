//! Segment compute kernel: a segmented sieve of Eratosthenes over the
//! wheel-compressed bitmap.
//!
//! Strategy:
//!   1. Every segment starts as a copy of a fixed template in which every
//!      multiple of 3, 5, 7, 11, 13, 17 and every padding bit is set. One
//!      wheel period equals exactly one segment, so the same template
//!      applies at every segment offset.
//!   2. Segment 0 gets fixups: 1 is composite, the wheel primes themselves
//!      are prime.
//!   3. Remaining composites are struck with odd primes >= 19 drawn from a
//!      small flat bootstrap sieve, starting at max(p^2, segment start) and
//!      stepping 2p.
//!
//! Set bit = composite or padding, clear bit = prime.

use std::sync::OnceLock;

use crate::layout::{
    isqrt, smart_rem, BITS_PER_SEGMENT, PAD_BITS_PER_SEGMENT, SPAN_PER_SEGMENT, WORDS_PER_SEGMENT,
};

/// The odd primes folded into the wheel. Their multiples are pre-marked by
/// the template rather than struck per prime.
pub const WHEEL_PRIMES: [u64; 6] = [3, 5, 7, 11, 13, 17];

static WHEEL_TEMPLATE: OnceLock<Vec<u64>> = OnceLock::new();

/// One segment's worth of words with all wheel multiples and padding bits
/// set. Built once, shared by every worker.
fn wheel_template() -> &'static [u64] {
    WHEEL_TEMPLATE.get_or_init(|| {
        let mut words = vec![0u64; WORDS_PER_SEGMENT];
        for q in WHEEL_PRIMES {
            // Bit b holds 2b + 1, so the first odd multiple of q sits at
            // bit (q - 1) / 2 and recurs every q bits.
            let mut b = ((q - 1) / 2) as usize;
            while b < BITS_PER_SEGMENT as usize {
                words[b >> 6] |= 1u64 << (b & 63);
                b += q as usize;
            }
        }
        words[WORDS_PER_SEGMENT - 1] |= u64::MAX << (BITS_PER_SEGMENT & 63);
        debug_assert_eq!(
            words[WORDS_PER_SEGMENT - 1].leading_ones() as u64,
            PAD_BITS_PER_SEGMENT
        );
        words
    })
}

/// Odd primes in `[19, limit]`, found with a flat bit-packed odd-only
/// sieve. These are the primes the segment kernel strikes with; the wheel
/// primes below 19 never need striking.
pub fn strike_primes(limit: u64) -> Vec<u64> {
    if limit < 19 {
        return Vec::new();
    }
    // Bit i holds the odd number 2i + 1.
    let half = limit / 2;
    let mut bits = vec![u64::MAX; (half >> 6) as usize + 1];
    bits[0] ^= 1; // 1 is not prime
    for i in 1..=(isqrt(limit) / 2) {
        if bits[(i >> 6) as usize] >> (i & 63) & 1 == 1 {
            let step = 2 * i + 1;
            let mut j = 2 * i * (i + 1); // bit of (2i + 1)^2
            while j <= half {
                bits[(j >> 6) as usize] &= !(1u64 << (j & 63));
                j += step;
            }
        }
    }

    let mut primes = Vec::new();
    for (w, &word) in bits.iter().enumerate() {
        let mut rest = word;
        while rest != 0 {
            let i = (w << 6) as u64 + rest.trailing_zeros() as u64;
            let p = 2 * i + 1;
            if p > limit {
                return primes;
            }
            if p >= 19 {
                primes.push(p);
            }
            rest &= rest - 1;
        }
    }
    primes
}

/// Fill `words` with the sieve bits for segments `[seg_start, seg_end)`.
/// `words` must cover exactly that range. `strike` must contain every odd
/// prime p >= 19 with p^2 <= the last value of the range, in ascending
/// order.
pub fn sieve_segments(words: &mut [u64], seg_start: usize, seg_end: usize, strike: &[u64]) {
    debug_assert_eq!(words.len(), (seg_end - seg_start) * WORDS_PER_SEGMENT);
    let template = wheel_template();

    for (i, seg) in words.chunks_exact_mut(WORDS_PER_SEGMENT).enumerate() {
        let s = (seg_start + i) as u64;
        seg.copy_from_slice(template);

        if s == 0 {
            // 1 is composite; the wheel primes were only marked because
            // their own multiples were being pre-struck.
            seg[0] |= 1;
            for q in WHEEL_PRIMES {
                seg[0] &= !(1u64 << ((q - 1) / 2));
            }
        }

        let lo = s * SPAN_PER_SEGMENT + 1; // first candidate, odd
        let hi = lo + SPAN_PER_SEGMENT - 2; // last candidate, odd

        for &p in strike {
            if p * p > hi {
                break;
            }
            let mut m = if p * p >= lo {
                p * p
            } else {
                let rem = smart_rem(lo, p);
                let mut m = if rem == 0 { lo } else { lo + (p - rem) };
                if m & 1 == 0 {
                    m += p;
                }
                m
            };
            let step = 2 * p;
            while m <= hi {
                let b = ((m >> 1) - s * BITS_PER_SEGMENT) as usize;
                seg[b >> 6] |= 1u64 << (b & 63);
                m += step;
            }
        }
    }
}
