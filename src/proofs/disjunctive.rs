//! Disjunctive proof that one of several Chaum-Pedersen statements holds, without revealing
//! which one.
//!
//! The prover knows the witness for the statement at one index only. For every other index the
//! challenge and response are picked at random and the commitment is simulated. All commitments
//! are then hashed into one overall challenge, and the real branch receives whatever challenge
//! makes the branch challenges sum to it (mod q). Because the simulated challenges had to be
//! fixed before the overall challenge was known, at most one branch can have been simulated
//! after the fact; the verifier checks every branch and the sum.
use crate::{
    keys::GroupParams,
    proofs::{
        challenge::{ChallengeGenerator, Transcript, DISJUNCTIVE_LABEL},
        ddh::{DdhProof, DdhStatement},
    },
    rng::RandomSource,
    BigInt, Error, Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct DisjunctiveProof {
    pub proofs: Vec<DdhProof>,
}

impl DisjunctiveProof {
    /// The overall challenge is bound to the external values (typically the ciphertext) and to
    /// every branch commitment in index order
    fn transcript(bound: &[BigInt], proofs: &[DdhProof]) -> Transcript {
        let mut transcript = Transcript::new(DISJUNCTIVE_LABEL);
        for val in bound {
            transcript.append(val);
        }
        for proof in proofs {
            transcript.append(&proof.commitment.a);
            transcript.append(&proof.commitment.b);
        }
        return transcript;
    }

    /// Produce the proof, given the witness for the statement at index `real`
    pub fn generate<G, R>(
        params: &GroupParams,
        statements: &[DdhStatement],
        real: usize,
        witness: &BigInt,
        bound: &[BigInt],
        generator: &G,
        rng: &mut R,
    ) -> Result<Self>
    where
        G: ChallengeGenerator + ?Sized,
        R: RandomSource + ?Sized,
    {
        if real >= statements.len() {
            return Err(Error::InvalidStatement(format!(
                "real index {real} out of {} statements",
                statements.len()
            )));
        }
        let q = params.get_q();
        let exponents = params.exponents();

        let mut proofs = Vec::with_capacity(statements.len());
        let mut w = BigInt::ZERO;
        let mut simulated_sum = BigInt::ZERO;
        for (i, statement) in statements.iter().enumerate() {
            if i == real {
                w = rng.random_integer(q)?;
                proofs.push(DdhProof {
                    commitment: DdhProof::commit(params, statement, &w),
                    challenge: BigInt::ZERO,
                    response: BigInt::ZERO,
                });
            } else {
                let challenge = rng.random_integer(q)?;
                let response = rng.random_integer(q)?;
                simulated_sum = exponents.add(&simulated_sum, &challenge);
                proofs.push(DdhProof::simulate(params, statement, &challenge, &response)?);
            }
        }

        let overall =
            exponents.reduce(&generator.challenge(&Self::transcript(bound, &proofs), params));
        let challenge = exponents.sub(&overall, &simulated_sum);
        let response = DdhProof::respond(params, &w, &challenge, witness);
        proofs[real].challenge = challenge;
        proofs[real].response = response;
        return Ok(Self { proofs });
    }

    /// Check every branch against its statement and that the branch challenges add up to the
    /// overall challenge. Either check alone is not sufficient.
    pub fn verify<G: ChallengeGenerator + ?Sized>(
        &self,
        params: &GroupParams,
        statements: &[DdhStatement],
        bound: &[BigInt],
        generator: &G,
    ) -> bool {
        if self.proofs.is_empty() || self.proofs.len() != statements.len() {
            return false;
        }
        let branches_hold = self
            .proofs
            .iter()
            .zip(statements.iter())
            .all(|(proof, statement)| proof.verify_equations(params, statement));
        if !branches_hold {
            return false;
        }
        let exponents = params.exponents();
        let sum = self
            .proofs
            .iter()
            .map(|proof| &proof.challenge)
            .fold(BigInt::ZERO, |acc, c| exponents.add(&acc, c));
        let overall =
            exponents.reduce(&generator.challenge(&Self::transcript(bound, &self.proofs), params));
        return sum == overall;
    }
}
