//! Error types
//!
//! A proof that does not hold is not an error: verification functions return `false` so that a
//! batch of ballots can be checked past a bad one. The variants below are reserved for inputs
//! that are malformed, and for randomness that cannot be produced.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("helios-elgamal: invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("helios-elgamal: operands belong to different keys or groups")]
    KeyMismatch,

    #[error("helios-elgamal: invalid plaintext: {0}")]
    InvalidPlaintext(String),

    #[error("helios-elgamal: invalid proof statement: {0}")]
    InvalidStatement(String),

    #[error("helios-elgamal: invalid selection: {0}")]
    InvalidSelection(String),

    #[error("helios-elgamal: malformed answer: {0}")]
    MalformedAnswer(String),

    #[error("helios-elgamal: malformed vote: {0}")]
    MalformedVote(String),

    #[error("helios-elgamal: randomness source has not been seeded")]
    NotSeeded,

    #[error("helios-elgamal: randomness source failed: {0}")]
    Randomness(#[from] rand::Error),

    #[error("helios-elgamal: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
