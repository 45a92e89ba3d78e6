//! Chaum-Pedersen proof that two discrete logs are equal
//! statement: value_g = base_g^t and value_h = base_h^t for a common secret t
//! commit: A = base_g^w, B = base_h^w for random w
//! challenge: c = H(statement, A, B)
//! response: s = w + ct (mod q)
//! verify: base_g^s == A * value_g^c and base_h^s == B * value_h^c (mod p)
//!
//! A ciphertext (alpha, beta) = (g^r, m * y^r) encrypts m iff (g, y, alpha, beta/m) is such a
//! statement with t = r. A decryption factor f = alpha^x is honest iff (g, alpha, y, f) is one
//! with t = x.
use crate::{
    arithmetics::decimal,
    elgamal::{Ciphertext, Plaintext},
    keys::{GroupParams, PublicKey},
    proofs::challenge::{ChallengeGenerator, Transcript, DDH_LABEL},
    rng::RandomSource,
    BigInt, Error, Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct DdhStatement {
    pub base_g: BigInt,
    pub base_h: BigInt,
    pub value_g: BigInt,
    pub value_h: BigInt,
}

impl DdhStatement {
    pub fn new(base_g: BigInt, base_h: BigInt, value_g: BigInt, value_h: BigInt) -> Self {
        return Self {
            base_g,
            base_h,
            value_g,
            value_h,
        };
    }

    /// The statement that the ciphertext encrypts the plaintext: (g, y, alpha, beta / m)
    pub fn encryption(ciphertext: &Ciphertext, plaintext: &Plaintext) -> Result<Self> {
        let pk = ciphertext.get_pk();
        let params = pk.get_params();
        let m_inv = params
            .invert(plaintext.get_m())
            .ok_or_else(|| Error::InvalidPlaintext("plaintext has no inverse (mod p)".into()))?;
        return Ok(Self::new(
            *params.get_g(),
            *pk.get_y(),
            *ciphertext.get_alpha(),
            params.mul(ciphertext.get_beta(), &m_inv),
        ));
    }

    /// The statement that value_h was obtained by raising alpha to the secret exponent behind
    /// the given key: (g, alpha, y, value_h). With several trustees the key is the trustee's own,
    /// not the one the ciphertext was encrypted under.
    pub fn decryption(pk: &PublicKey, ciphertext: &Ciphertext, value_h: &BigInt) -> Self {
        return Self::new(
            *pk.get_params().get_g(),
            *ciphertext.get_alpha(),
            *pk.get_y(),
            *value_h,
        );
    }

    fn append_to(&self, transcript: &mut Transcript) {
        transcript.append(&self.base_g);
        transcript.append(&self.base_h);
        transcript.append(&self.value_g);
        transcript.append(&self.value_h);
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Commitment {
    #[serde(rename = "A", with = "decimal")]
    pub a: BigInt,

    #[serde(rename = "B", with = "decimal")]
    pub b: BigInt,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct DdhProof {
    pub commitment: Commitment,

    #[serde(with = "decimal")]
    pub challenge: BigInt,

    #[serde(with = "decimal")]
    pub response: BigInt,
}

impl DdhProof {
    /// A = base_g^w, B = base_h^w
    pub fn commit(params: &GroupParams, statement: &DdhStatement, w: &BigInt) -> Commitment {
        return Commitment {
            a: params.pow(&statement.base_g, w),
            b: params.pow(&statement.base_h, w),
        };
    }

    /// s = w + c * witness (mod q)
    pub fn respond(
        params: &GroupParams,
        w: &BigInt,
        challenge: &BigInt,
        witness: &BigInt,
    ) -> BigInt {
        let exponents = params.exponents();
        return exponents.add(w, &exponents.mul(challenge, witness));
    }

    fn transcript(statement: &DdhStatement, commitment: &Commitment) -> Transcript {
        let mut transcript = Transcript::new(DDH_LABEL);
        statement.append_to(&mut transcript);
        transcript.append(&commitment.a);
        transcript.append(&commitment.b);
        return transcript;
    }

    /// Prove the statement using the common exponent as the witness
    pub fn generate<G, R>(
        params: &GroupParams,
        statement: &DdhStatement,
        witness: &BigInt,
        generator: &G,
        rng: &mut R,
    ) -> Result<Self>
    where
        G: ChallengeGenerator + ?Sized,
        R: RandomSource + ?Sized,
    {
        let w = rng.random_integer(params.get_q())?;
        let commitment = Self::commit(params, statement, &w);
        let challenge = params
            .exponents()
            .reduce(&generator.challenge(&Self::transcript(statement, &commitment), params));
        let response = Self::respond(params, &w, &challenge, witness);
        return Ok(Self {
            commitment,
            challenge,
            response,
        });
    }

    /// Work backwards from a chosen challenge and response to the only commitment that satisfies
    /// the verification equations:
    /// A = base_g^s * value_g^(-c), B = base_h^s * value_h^(-c)
    /// No witness is needed, which is what makes the protocol honest-verifier zero-knowledge.
    pub fn simulate(
        params: &GroupParams,
        statement: &DdhStatement,
        challenge: &BigInt,
        response: &BigInt,
    ) -> Result<Self> {
        let challenge = params.exponents().reduce(challenge);
        let response = params.exponents().reduce(response);
        let unwind = |base: &BigInt, value: &BigInt| -> Result<BigInt> {
            let value_to_c = params.pow(value, &challenge);
            let inverse = params.invert(&value_to_c).ok_or_else(|| {
                Error::InvalidStatement("statement value has no inverse (mod p)".into())
            })?;
            return Ok(params.mul(&params.pow(base, &response), &inverse));
        };
        let commitment = Commitment {
            a: unwind(&statement.base_g, &statement.value_g)?,
            b: unwind(&statement.base_h, &statement.value_h)?,
        };
        return Ok(Self {
            commitment,
            challenge,
            response,
        });
    }

    /// Check the range of each value and the two verification equations, but not how the
    /// challenge was derived
    pub fn verify_equations(&self, params: &GroupParams, statement: &DdhStatement) -> bool {
        let p = params.get_p();
        let q = params.get_q();
        if self.commitment.a >= *p
            || self.commitment.b >= *p
            || self.challenge >= *q
            || self.response >= *q
        {
            return false;
        }
        let first = params.pow(&statement.base_g, &self.response)
            == params.mul(
                &self.commitment.a,
                &params.pow(&statement.value_g, &self.challenge),
            );
        let second = params.pow(&statement.base_h, &self.response)
            == params.mul(
                &self.commitment.b,
                &params.pow(&statement.value_h, &self.challenge),
            );
        return first && second;
    }

    /// Full verification: the equations hold and the challenge is the one the generator assigns
    /// to this transcript
    pub fn verify<G: ChallengeGenerator + ?Sized>(
        &self,
        params: &GroupParams,
        statement: &DdhStatement,
        generator: &G,
    ) -> bool {
        if !self.verify_equations(params, statement) {
            return false;
        }
        let expected = params
            .exponents()
            .reduce(&generator.challenge(&Self::transcript(statement, &self.commitment), params));
        return expected == self.challenge;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{proofs::challenge::FiatShamir, rng::OsSource, samples};

    /// Build a random statement with a known common exponent
    fn statement(params: &GroupParams, rng: &mut OsSource) -> (DdhStatement, BigInt) {
        let q = params.get_q();
        let h = params.g_pow(&rng.random_integer(q).unwrap());
        let t = rng.random_integer(q).unwrap();
        let g = *params.get_g();
        let statement = DdhStatement::new(g, h, params.g_pow(&t), params.pow(&h, &t));
        return (statement, t);
    }

    #[test]
    fn test_correctness() {
        let mut rng = OsSource::new();
        let params = samples::group_params().unwrap();
        let generator: FiatShamir = FiatShamir::new();
        let (statement, t) = statement(&params, &mut rng);
        let proof = DdhProof::generate(&params, &statement, &t, &generator, &mut rng).unwrap();
        assert!(proof.verify(&params, &statement, &generator));
    }

    /// A proof made with the wrong witness, or checked against another statement, fails
    #[test]
    fn test_soundness() {
        let mut rng = OsSource::new();
        let params = samples::group_params().unwrap();
        let generator: FiatShamir = FiatShamir::new();
        let (statement, t) = statement(&params, &mut rng);

        let wrong_witness = params.exponents().add(&t, &BigInt::ONE);
        let proof =
            DdhProof::generate(&params, &statement, &wrong_witness, &generator, &mut rng).unwrap();
        assert!(!proof.verify(&params, &statement, &generator));

        let mut other = statement.clone();
        other.value_h = params.g_pow(&rng.random_integer(params.get_q()).unwrap());
        let proof = DdhProof::generate(&params, &statement, &t, &generator, &mut rng).unwrap();
        assert!(!proof.verify(&params, &other, &generator));
    }

    /// A simulated transcript satisfies the equations without any witness, but not the challenge
    /// derivation
    #[test]
    fn test_simulation() {
        let mut rng = OsSource::new();
        let params = samples::group_params().unwrap();
        let generator: FiatShamir = FiatShamir::new();
        let (statement, _) = statement(&params, &mut rng);
        let challenge = rng.random_integer(params.get_q()).unwrap();
        let response = rng.random_integer(params.get_q()).unwrap();
        let proof = DdhProof::simulate(&params, &statement, &challenge, &response).unwrap();
        assert_eq!(proof.challenge, challenge);
        assert_eq!(proof.response, response);
        assert!(proof.verify_equations(&params, &statement));
        assert!(!proof.verify(&params, &statement, &generator));
    }

    #[test]
    fn test_reject_out_of_range() {
        let mut rng = OsSource::new();
        let params = samples::group_params().unwrap();
        let generator: FiatShamir = FiatShamir::new();
        let (statement, t) = statement(&params, &mut rng);
        let proof = DdhProof::generate(&params, &statement, &t, &generator, &mut rng).unwrap();

        let mut shifted = proof.clone();
        shifted.response = shifted.response.wrapping_add(params.get_q());
        assert!(!shifted.verify_equations(&params, &statement));

        let mut shifted = proof.clone();
        shifted.commitment.a = *params.get_p();
        assert!(!shifted.verify_equations(&params, &statement));
    }
}
