//! Proof of knowledge of the secret key, adapted to be offline using Fiat-Shamir
//! statement: y = g^x
//! commit: a = g^w for random w
//! challenge: c = H(y, a)
//! response: s = w + cx (mod q)
//! verify: g^s == a * y^c (mod p)
use crate::{
    arithmetics::decimal,
    keys::{PublicKey, SecretKey},
    proofs::challenge::{ChallengeGenerator, Transcript, KNOWLEDGE_LABEL},
    rng::RandomSource,
    BigInt, Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct KnowledgeProof {
    #[serde(with = "decimal")]
    pub commitment: BigInt,

    #[serde(with = "decimal")]
    pub challenge: BigInt,

    #[serde(with = "decimal")]
    pub response: BigInt,
}

impl KnowledgeProof {
    fn transcript(pk: &PublicKey, commitment: &BigInt) -> Transcript {
        let mut transcript = Transcript::new(KNOWLEDGE_LABEL);
        transcript.append(pk.get_y());
        transcript.append(commitment);
        return transcript;
    }

    pub fn generate<G, R>(sk: &SecretKey, generator: &G, rng: &mut R) -> Result<Self>
    where
        G: ChallengeGenerator + ?Sized,
        R: RandomSource + ?Sized,
    {
        let params = sk.get_pk().get_params();
        let w = rng.random_integer(params.get_q())?;
        let commitment = params.g_pow(&w);
        let challenge = params
            .exponents()
            .reduce(&generator.challenge(&Self::transcript(sk.get_pk(), &commitment), params));
        let exponents = params.exponents();
        let response = exponents.add(&w, &exponents.mul(&challenge, sk.get_x()));
        return Ok(Self {
            commitment,
            challenge,
            response,
        });
    }

    /// Given a public transcript of the proof, check the range of each value, the challenge, and
    /// the verification equation
    pub fn verify<G: ChallengeGenerator + ?Sized>(&self, pk: &PublicKey, generator: &G) -> bool {
        let params = pk.get_params();
        if self.commitment >= *params.get_p()
            || self.challenge >= *params.get_q()
            || self.response >= *params.get_q()
        {
            return false;
        }
        let expected_challenge = params
            .exponents()
            .reduce(&generator.challenge(&Self::transcript(pk, &self.commitment), params));
        if expected_challenge != self.challenge {
            return false;
        }
        let lhs = params.g_pow(&self.response);
        let rhs = params.mul(&self.commitment, &params.pow(pk.get_y(), &self.challenge));
        return lhs == rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        proofs::challenge::{FiatShamir, FixedChallenge},
        rng::OsSource,
        samples,
    };

    /// Test that an honest prover can prove to an honest verifier
    #[test]
    fn test_correctness() {
        let mut rng = OsSource::new();
        let params = samples::group_params().unwrap();
        let sk = params.generate(&mut rng).unwrap();
        let pk = sk.get_pk();
        let generator: FiatShamir = FiatShamir::new();
        let proof = sk.prove_knowledge(&generator, &mut rng).unwrap();
        assert!(proof.challenge < *params.get_q());
        assert!(proof.response < *params.get_q());
        assert!(proof.commitment < *params.get_p());
        assert!(pk.verify_knowledge_of_secret_key(&proof, &generator));

        let fixed = FixedChallenge(BigInt::from_u64(12345));
        let proof = sk.prove_knowledge(&fixed, &mut rng).unwrap();
        assert!(pk.verify_knowledge_of_secret_key(&proof, &fixed));
    }

    #[test]
    fn test_reject_tampered_or_foreign_proof() {
        let mut rng = OsSource::new();
        let params = samples::group_params().unwrap();
        let sk = params.generate(&mut rng).unwrap();
        let other = params.generate(&mut rng).unwrap();
        let generator: FiatShamir = FiatShamir::new();
        let proof = sk.prove_knowledge(&generator, &mut rng).unwrap();

        let (pk, other_pk) = (sk.get_pk(), other.get_pk());
        assert!(!other_pk.verify_knowledge_of_secret_key(&proof, &generator));

        let mut tampered = proof.clone();
        tampered.response = params.exponents().add(&tampered.response, &BigInt::ONE);
        assert!(!pk.verify_knowledge_of_secret_key(&tampered, &generator));

        let mut out_of_range = proof.clone();
        out_of_range.challenge = *params.get_q();
        assert!(!pk.verify_knowledge_of_secret_key(&out_of_range, &generator));
    }

    #[test]
    fn test_json_shape() {
        let mut rng = OsSource::new();
        let sk = samples::group_params().unwrap().generate(&mut rng).unwrap();
        let generator: FiatShamir = FiatShamir::new();
        let proof = sk.prove_knowledge(&generator, &mut rng).unwrap();
        let value = serde_json::to_value(&proof).unwrap();
        assert!(value["commitment"].is_string());
        assert!(value["challenge"].is_string());
        assert!(value["response"].is_string());
        let reloaded: KnowledgeProof = serde_json::from_value(value).unwrap();
        assert_eq!(reloaded, proof);
    }
}
