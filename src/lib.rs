//! ElGamal over a prime-order subgroup, sigma-protocol proofs, and Helios-style ballots
use crypto_bigint::U2048;

/// Use the same big integer type everywhere. Group elements and exponents are both held at the
/// width of the modulus, so groups with a `p` wider than 2048 bits are rejected when loaded.
pub type BigInt = U2048;
pub const LIMBS: usize = BigInt::LIMBS;

pub mod arithmetics;
pub mod ballot;
pub mod elgamal;
pub mod election;
pub mod error;
pub mod keys;
pub mod proofs;
pub mod rng;
pub mod samples;
pub mod tally;

pub use error::{Error, Result};
