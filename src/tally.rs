//! Homomorphic tally: the product of the choice ciphertexts of every valid vote encrypts
//! g^(number of approvals) for each answer
use crate::{
    ballot::{answer::AnswerState, vote::EncryptedVote},
    elgamal::Ciphertext,
    election::Election,
    keys::SecretKey,
    proofs::{challenge::ChallengeGenerator, ddh::DdhProof},
    rng::RandomSource,
    BigInt, Error, Result,
};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct EncryptedTally<'e> {
    election: &'e Election,
    election_hash: String,
    num_tallied: usize,
    ciphertexts: Vec<Vec<Ciphertext>>,
}

/// A trustee's decryption factor for one tally ciphertext, with the proof that it is honest
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct DecryptionFactor {
    pub factor: BigInt,
    pub proof: DdhProof,
}

impl<'e> EncryptedTally<'e> {
    /// Start from an encryption of g^0 with zero randomness for every answer
    pub fn new(election: &'e Election) -> Result<Self> {
        let pk = election.get_public_key();
        let ciphertexts = election
            .get_questions()
            .iter()
            .map(|question| {
                question
                    .get_answers()
                    .iter()
                    .map(|_| Ciphertext::new(BigInt::ONE, BigInt::ONE, pk.clone()))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(Self {
            election,
            election_hash: election.hash()?,
            num_tallied: 0,
            ciphertexts,
        });
    }

    /// Verify the vote and fold it into the tally. An invalid vote leaves the tally untouched and
    /// returns false.
    pub fn add_vote<S: AnswerState>(&mut self, vote: &EncryptedVote<'_, S>) -> Result<bool> {
        if vote.get_election_hash() != self.election_hash {
            warn!(
                election = self.election.get_uuid(),
                "vote belongs to another election"
            );
            return Ok(false);
        }
        let questions = self.election.get_questions();
        if !vote.verify_encryption(questions, self.election.get_public_key())? {
            warn!(election = self.election.get_uuid(), "rejected invalid vote");
            return Ok(false);
        }

        let mut ciphertexts = self.ciphertexts.clone();
        for (totals, answer) in ciphertexts.iter_mut().zip(vote.get_encrypted_answers()) {
            if totals.len() != answer.get_choices().len() {
                return Err(Error::MalformedVote("answer does not match its question".into()));
            }
            for (total, choice) in totals.iter_mut().zip(answer.get_choices()) {
                *total = total.multiply(choice)?;
            }
        }
        self.ciphertexts = ciphertexts;
        self.num_tallied += 1;
        debug!(num_tallied = self.num_tallied, "added vote to tally");
        return Ok(true);
    }

    /// The tally ciphertexts, indexed by question and then by answer
    pub fn get_ciphertexts(&self) -> &[Vec<Ciphertext>] {
        &self.ciphertexts
    }

    pub fn get_num_tallied(&self) -> usize {
        self.num_tallied
    }

    /// A trustee's decryption factor of every tally ciphertext, each with its proof. Combining
    /// the factors of all trustees is left to the caller.
    pub fn decryption_factors<G, R>(
        &self,
        sk: &SecretKey,
        generator: &G,
        rng: &mut R,
    ) -> Result<Vec<Vec<DecryptionFactor>>>
    where
        G: ChallengeGenerator + ?Sized,
        R: RandomSource + ?Sized,
    {
        let mut factors = Vec::with_capacity(self.ciphertexts.len());
        for totals in &self.ciphertexts {
            let mut question_factors = Vec::with_capacity(totals.len());
            for total in totals {
                let (factor, proof) = sk.decryption_factor_and_proof(total, generator, rng)?;
                question_factors.push(DecryptionFactor { factor, proof });
            }
            factors.push(question_factors);
        }
        return Ok(factors);
    }
}
