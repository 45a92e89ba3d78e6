//! Helios-style encrypted ballots
//!
//! A ballot starts out [`Unsealed`](answer::Unsealed): it still holds the voter's selections and
//! the encryption randomness, which is what a voter needs to audit a ballot before casting it.
//! Casting consumes it into the [`Sealed`](answer::Sealed) state, after which neither the
//! selections nor the randomness can be reached.

pub mod answer;
pub mod vote;
