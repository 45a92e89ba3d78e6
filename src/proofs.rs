//! Sigma protocols made non-interactive through an injected challenge generator:
//! - knowledge of the secret exponent behind a public key (Schnorr)
//! - equality of two discrete logs (Chaum-Pedersen), with honest-verifier simulation
//! - disjunctive composition of Chaum-Pedersen proofs

pub mod challenge;
pub mod ddh;
pub mod disjunctive;
pub mod knowledge;
