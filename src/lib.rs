//! A prime number oracle for 64-bit unsigned integers.
//!
//! The core is an incrementally-extensible, bit-packed, wheel-factorized
//! segmented sieve of Eratosthenes. Integers divisible by 2, 3, 5, 7, 11,
//! 13 or 17 never cost a strike: their bits are pre-set from a per-segment
//! template whose period (3 * 5 * 7 * 11 * 13 * 17 odd integers) equals
//! exactly one segment. Primality queries are constant time once a range
//! is covered, and both iteration directions scan raw words with hardware
//! bit primitives.
//!
//! ```
//! use primewheel::PrimeSieve;
//!
//! let mut sieve = PrimeSieve::new();
//! assert!(sieve.is_prime(524_287));
//! assert_eq!(sieve.next_prime(14), 17);
//! assert_eq!(sieve.prev_prime(20), Some(19));
//!
//! let first: Vec<u64> = sieve.primes().take(5).collect();
//! assert_eq!(first, [2, 3, 5, 7, 11]);
//! ```

pub mod iter;
pub mod kernel;
pub mod layout;
pub mod sieve;

pub use iter::{BackwardPrimes, ForwardPrimes};
pub use sieve::PrimeSieve;
