//! Challenge generation for the sigma protocols
//!
//! Provers and verifiers never pick a challenge themselves. They lay the public values of the
//! proof out in a [`Transcript`] and hand it to a [`ChallengeGenerator`] supplied by the caller.
//! In production that is [`FiatShamir`], which hashes the transcript; tests can substitute a
//! constant with [`FixedChallenge`] or any closure.
use crate::{keys::GroupParams, BigInt};
use crypto_bigint::Encoding;
use digest::Digest;
use sha3::Sha3_512;
use std::marker::PhantomData;

pub const KNOWLEDGE_LABEL: &[u8] = b"helios-elgamal/knowledge";
pub const DDH_LABEL: &[u8] = b"helios-elgamal/ddh";
pub const DISJUNCTIVE_LABEL: &[u8] = b"helios-elgamal/disjunctive";

/// The ordered public values a challenge must be bound to, under a domain label
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Transcript {
    label: &'static [u8],
    elements: Vec<BigInt>,
}

impl Transcript {
    pub fn new(label: &'static [u8]) -> Self {
        return Self {
            label,
            elements: vec![],
        };
    }

    pub fn append(&mut self, element: &BigInt) {
        self.elements.push(*element);
    }

    pub fn get_label(&self) -> &'static [u8] {
        self.label
    }

    pub fn get_elements(&self) -> &[BigInt] {
        &self.elements
    }
}

pub trait ChallengeGenerator {
    /// Map the transcript to a challenge in [0, q). Values outside that range are reduced by
    /// the callers anyway.
    fn challenge(&self, transcript: &Transcript, params: &GroupParams) -> BigInt;
}

impl<F> ChallengeGenerator for F
where
    F: Fn(&Transcript, &GroupParams) -> BigInt,
{
    fn challenge(&self, transcript: &Transcript, params: &GroupParams) -> BigInt {
        self(transcript, params)
    }
}

/// Always answer with the same challenge. Only useful in tests: a constant challenge lets anyone
/// forge proofs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FixedChallenge(pub BigInt);

impl ChallengeGenerator for FixedChallenge {
    fn challenge(&self, _transcript: &Transcript, params: &GroupParams) -> BigInt {
        params.exponents().reduce(&self.0)
    }
}

/// Hash the transcript into the challenge. An optional context, such as the election and
/// question a ballot proof belongs to, is absorbed first so that a proof cannot be replayed in
/// another context.
pub struct FiatShamir<D = Sha3_512> {
    context: Vec<u8>,
    _digest: PhantomData<fn() -> D>,
}

impl<D: Digest> FiatShamir<D> {
    pub fn new() -> Self {
        Self::with_context(vec![])
    }

    pub fn with_context(context: impl Into<Vec<u8>>) -> Self {
        return Self {
            context: context.into(),
            _digest: PhantomData,
        };
    }

    pub fn get_context(&self) -> &[u8] {
        &self.context
    }
}

impl<D: Digest> Default for FiatShamir<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for FiatShamir<D> {
    fn clone(&self) -> Self {
        return Self {
            context: self.context.clone(),
            _digest: PhantomData,
        };
    }
}

impl<D> std::fmt::Debug for FiatShamir<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FiatShamir")
            .field("context", &hex::encode(&self.context))
            .finish()
    }
}

impl<D: Digest> ChallengeGenerator for FiatShamir<D> {
    fn challenge(&self, transcript: &Transcript, params: &GroupParams) -> BigInt {
        let mut hasher = D::new();
        // variable-length fields are prefixed with their length; elements are fixed width
        hasher.update((self.context.len() as u64).to_be_bytes());
        hasher.update(&self.context);
        hasher.update((transcript.get_label().len() as u64).to_be_bytes());
        hasher.update(transcript.get_label());
        hasher.update((transcript.get_elements().len() as u64).to_be_bytes());
        for element in transcript.get_elements() {
            hasher.update(element.to_be_bytes());
        }
        let hash = hasher.finalize();

        let take = hash.len().min(BigInt::BYTES);
        let mut wide = [0u8; BigInt::BYTES];
        wide[BigInt::BYTES - take..].copy_from_slice(&hash[hash.len() - take..]);
        return params.exponents().reduce(&BigInt::from_be_slice(&wide));
    }
}
