//! ElGamal encryption over the order-q subgroup
//!
//! A plaintext m is encrypted under y = g^x with randomness r as (alpha, beta) = (g^r, m * y^r).
//! Multiplying two ciphertexts component-wise encrypts the product of their plaintexts, which
//! is what the homomorphic tally relies on when plaintexts are of the form g^v.
use crate::{
    arithmetics::decimal,
    keys::{PublicKey, SecretKey},
    proofs::{
        challenge::ChallengeGenerator,
        ddh::{DdhProof, DdhStatement},
        disjunctive::DisjunctiveProof,
    },
    rng::RandomSource,
    BigInt, Error, Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Plaintext {
    m: BigInt,
    pk: Option<PublicKey>,
}

impl Plaintext {
    pub fn new(m: BigInt) -> Self {
        return Self { m, pk: None };
    }

    /// The encoding g^v of a small count v, such as whether a choice was selected
    pub fn from_exponent(v: u64, pk: &PublicKey) -> Self {
        let params = pk.get_params();
        let m = params.g_pow(&params.exponents().reduce(&BigInt::from_u64(v)));
        return Self {
            m,
            pk: Some(pk.clone()),
        };
    }

    pub fn get_m(&self) -> &BigInt {
        &self.m
    }

    pub fn get_pk(&self) -> Option<&PublicKey> {
        self.pk.as_ref()
    }
}

/// The wire form of a ciphertext; the key it belongs to travels separately
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct CiphertextJson {
    #[serde(with = "decimal")]
    pub alpha: BigInt,

    #[serde(with = "decimal")]
    pub beta: BigInt,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Ciphertext {
    alpha: BigInt,
    beta: BigInt,
    pk: PublicKey,
}

impl Ciphertext {
    /// Both components must be members of the order-q subgroup, which also puts them in [1, p).
    /// Outside the subgroup a choice encrypting p - 1 passes the 0-or-1 proof whenever its
    /// challenge is even.
    pub fn new(alpha: BigInt, beta: BigInt, pk: PublicKey) -> Result<Self> {
        let params = pk.get_params();
        if !params.in_subgroup(&alpha) || !params.in_subgroup(&beta) {
            return Err(Error::InvalidParameters(
                "ciphertext components must be members of the subgroup".into(),
            ));
        }
        return Ok(Self { alpha, beta, pk });
    }

    pub fn from_json(json: CiphertextJson, pk: PublicKey) -> Result<Self> {
        Self::new(json.alpha, json.beta, pk)
    }

    pub fn to_json(&self) -> CiphertextJson {
        CiphertextJson {
            alpha: self.alpha,
            beta: self.beta,
        }
    }

    pub fn get_alpha(&self) -> &BigInt {
        &self.alpha
    }

    pub fn get_beta(&self) -> &BigInt {
        &self.beta
    }

    pub fn get_pk(&self) -> &PublicKey {
        &self.pk
    }

    /// Component-wise product, which encrypts the product of the two plaintexts
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        if self.pk != other.pk {
            return Err(Error::KeyMismatch);
        }
        let params = self.pk.get_params();
        return Ok(Self {
            alpha: params.mul(&self.alpha, &other.alpha),
            beta: params.mul(&self.beta, &other.beta),
            pk: self.pk.clone(),
        });
    }

    /// Prove that this ciphertext encrypts the plaintext, using the encryption randomness
    pub fn generate_proof<G, R>(
        &self,
        plaintext: &Plaintext,
        randomness: &BigInt,
        generator: &G,
        rng: &mut R,
    ) -> Result<DdhProof>
    where
        G: ChallengeGenerator + ?Sized,
        R: RandomSource + ?Sized,
    {
        let statement = DdhStatement::encryption(self, plaintext)?;
        return DdhProof::generate(self.pk.get_params(), &statement, randomness, generator, rng);
    }

    /// A transcript for the given challenge and response that satisfies the equations for the
    /// plaintext, produced without the encryption randomness
    pub fn simulate_proof(
        &self,
        plaintext: &Plaintext,
        challenge: &BigInt,
        response: &BigInt,
    ) -> Result<DdhProof> {
        let statement = DdhStatement::encryption(self, plaintext)?;
        return DdhProof::simulate(self.pk.get_params(), &statement, challenge, response);
    }

    pub fn verify_proof<G: ChallengeGenerator + ?Sized>(
        &self,
        plaintext: &Plaintext,
        proof: &DdhProof,
        generator: &G,
    ) -> bool {
        match DdhStatement::encryption(self, plaintext) {
            Ok(statement) => proof.verify(self.pk.get_params(), &statement, generator),
            Err(_) => false,
        }
    }

    fn encryption_statements(&self, plaintexts: &[Plaintext]) -> Result<Vec<DdhStatement>> {
        plaintexts
            .iter()
            .map(|plaintext| DdhStatement::encryption(self, plaintext))
            .collect()
    }

    /// Prove that this ciphertext encrypts one of the plaintexts, given that it encrypts the one
    /// at index `real` with the given randomness
    pub fn generate_disjunctive_proof<G, R>(
        &self,
        plaintexts: &[Plaintext],
        real: usize,
        randomness: &BigInt,
        generator: &G,
        rng: &mut R,
    ) -> Result<DisjunctiveProof>
    where
        G: ChallengeGenerator + ?Sized,
        R: RandomSource + ?Sized,
    {
        let statements = self.encryption_statements(plaintexts)?;
        return DisjunctiveProof::generate(
            self.pk.get_params(),
            &statements,
            real,
            randomness,
            &[self.alpha, self.beta],
            generator,
            rng,
        );
    }

    pub fn verify_disjunctive_proof<G: ChallengeGenerator + ?Sized>(
        &self,
        plaintexts: &[Plaintext],
        proof: &DisjunctiveProof,
        generator: &G,
    ) -> bool {
        match self.encryption_statements(plaintexts) {
            Ok(statements) => proof.verify(
                self.pk.get_params(),
                &statements,
                &[self.alpha, self.beta],
                generator,
            ),
            Err(_) => false,
        }
    }

    /// Check a proof that this ciphertext decrypts to the plaintext under the key's owner
    pub fn verify_decryption_proof<G: ChallengeGenerator + ?Sized>(
        &self,
        plaintext: &Plaintext,
        proof: &DdhProof,
        generator: &G,
    ) -> bool {
        let params = self.pk.get_params();
        let m_inv = match params.invert(plaintext.get_m()) {
            Some(m_inv) => m_inv,
            None => return false,
        };
        let factor = params.mul(&self.beta, &m_inv);
        let statement = DdhStatement::decryption(&self.pk, self, &factor);
        return proof.verify(params, &statement, generator);
    }
}

impl PublicKey {
    /// Encrypt with fresh randomness drawn from [0, q)
    pub fn encrypt<R: RandomSource + ?Sized>(
        &self,
        plaintext: &Plaintext,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        let r = rng.random_integer(self.get_params().get_q())?;
        return self.encrypt_with_randomness(plaintext, &r);
    }

    /// Encrypt with caller-chosen randomness, which must be reduced (mod q)
    pub fn encrypt_with_randomness(
        &self,
        plaintext: &Plaintext,
        randomness: &BigInt,
    ) -> Result<Ciphertext> {
        let params = self.get_params();
        let m = plaintext.get_m();
        if *m == BigInt::ZERO || m >= params.get_p() {
            return Err(Error::InvalidPlaintext("m must lie in (0, p)".into()));
        }
        if randomness >= params.get_q() {
            return Err(Error::InvalidPlaintext("randomness must be smaller than q".into()));
        }
        return Ok(Ciphertext {
            alpha: params.g_pow(randomness),
            beta: params.mul(m, &params.pow(self.get_y(), randomness)),
            pk: self.clone(),
        });
    }

    /// Check a trustee's decryption factor: the proof must show that the factor is alpha raised
    /// to the secret exponent behind this key
    pub fn verify_decryption_factor<G: ChallengeGenerator + ?Sized>(
        &self,
        ciphertext: &Ciphertext,
        factor: &BigInt,
        proof: &DdhProof,
        generator: &G,
    ) -> bool {
        if self.get_params() != ciphertext.get_pk().get_params() {
            return false;
        }
        let statement = DdhStatement::decryption(self, ciphertext, factor);
        return proof.verify(self.get_params(), &statement, generator);
    }
}

impl SecretKey {
    fn check_group(&self, ciphertext: &Ciphertext) -> Result<()> {
        if self.get_pk().get_params() != ciphertext.get_pk().get_params() {
            return Err(Error::KeyMismatch);
        }
        return Ok(());
    }

    /// This key's share of the decryption of the ciphertext: alpha^x (mod p)
    pub fn decryption_factor(&self, ciphertext: &Ciphertext) -> Result<BigInt> {
        self.check_group(ciphertext)?;
        return Ok(self
            .get_pk()
            .get_params()
            .pow(ciphertext.get_alpha(), self.get_x()));
    }

    /// m = beta / alpha^x (mod p)
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Plaintext> {
        let factor = self.decryption_factor(ciphertext)?;
        let params = self.get_pk().get_params();
        let factor_inv = params.invert(&factor).ok_or_else(|| {
            Error::InvalidParameters("decryption factor has no inverse (mod p)".into())
        })?;
        return Ok(Plaintext {
            m: params.mul(ciphertext.get_beta(), &factor_inv),
            pk: Some(self.get_pk().clone()),
        });
    }

    /// Decrypt, and prove that the plaintext is the correct decryption without revealing x
    pub fn decrypt_and_prove<G, R>(
        &self,
        ciphertext: &Ciphertext,
        generator: &G,
        rng: &mut R,
    ) -> Result<(Plaintext, DdhProof)>
    where
        G: ChallengeGenerator + ?Sized,
        R: RandomSource + ?Sized,
    {
        let (factor, proof) = self.decryption_factor_and_proof(ciphertext, generator, rng)?;
        let params = self.get_pk().get_params();
        let factor_inv = params.invert(&factor).ok_or_else(|| {
            Error::InvalidParameters("decryption factor has no inverse (mod p)".into())
        })?;
        let plaintext = Plaintext {
            m: params.mul(ciphertext.get_beta(), &factor_inv),
            pk: Some(self.get_pk().clone()),
        };
        return Ok((plaintext, proof));
    }

    /// The decryption factor together with a Chaum-Pedersen proof that it was computed honestly
    pub fn decryption_factor_and_proof<G, R>(
        &self,
        ciphertext: &Ciphertext,
        generator: &G,
        rng: &mut R,
    ) -> Result<(BigInt, DdhProof)>
    where
        G: ChallengeGenerator + ?Sized,
        R: RandomSource + ?Sized,
    {
        let factor = self.decryption_factor(ciphertext)?;
        let statement = DdhStatement::decryption(self.get_pk(), ciphertext, &factor);
        let proof = DdhProof::generate(
            self.get_pk().get_params(),
            &statement,
            self.get_x(),
            generator,
            rng,
        )?;
        return Ok((factor, proof));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arithmetics::discrete_log,
        proofs::challenge::{FiatShamir, FixedChallenge},
        rng::OsSource,
        samples,
    };

    fn keypair(rng: &mut OsSource) -> SecretKey {
        samples::group_params().unwrap().generate(rng).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt() {
        let mut rng = OsSource::new();
        let sk = keypair(&mut rng);
        let pt = Plaintext::new(BigInt::ONE);
        let ct = sk.get_pk().encrypt(&pt, &mut rng).unwrap();
        assert_eq!(sk.decrypt(&ct).unwrap().get_m(), &BigInt::ONE);

        let params = sk.get_pk().get_params();
        let m = params.g_pow(&BigInt::from_u64(987654321));
        let ct = sk.get_pk().encrypt(&Plaintext::new(m), &mut rng).unwrap();
        assert_eq!(sk.decrypt(&ct).unwrap().get_m(), &m);
    }

    /// g^2 * g^3 decrypts to g^5
    #[test]
    fn test_homomorphism() {
        let mut rng = OsSource::new();
        let sk = keypair(&mut rng);
        let pk = sk.get_pk();
        let params = pk.get_params();
        let two = Plaintext::from_exponent(2, pk);
        let three = Plaintext::from_exponent(3, pk);
        let c2 = pk.encrypt(&two, &mut rng).unwrap();
        let c3 = pk.encrypt(&three, &mut rng).unwrap();
        let product = c2.multiply(&c3).unwrap();
        let decrypted = sk.decrypt(&product).unwrap();
        assert_eq!(decrypted.get_m(), &params.g_pow(&BigInt::from_u8(5)));
        assert_eq!(discrete_log(params, decrypted.get_m(), 10), Some(5));
    }

    #[test]
    fn test_key_mismatch() {
        let mut rng = OsSource::new();
        let sk = keypair(&mut rng);
        let other = keypair(&mut rng);
        let pt = Plaintext::new(BigInt::ONE);
        let c1 = sk.get_pk().encrypt(&pt, &mut rng).unwrap();
        let c2 = other.get_pk().encrypt(&pt, &mut rng).unwrap();
        assert!(matches!(c1.multiply(&c2), Err(Error::KeyMismatch)));

        // a ciphertext in an unrelated group cannot be decrypted at all
        let tiny = crate::keys::GroupParams::new(
            BigInt::from_u8(23),
            BigInt::from_u8(11),
            BigInt::from_u8(4),
        )
        .unwrap();
        // 4^3 = 18 (mod 23)
        let tiny_pk = PublicKey::new(tiny, BigInt::from_u8(18)).unwrap();
        let tiny_sk = SecretKey::new(tiny_pk, BigInt::from_u8(3)).unwrap();
        let two = BigInt::from_u8(2);
        let tiny_ct = tiny_sk
            .get_pk()
            .encrypt(&Plaintext::new(two), &mut rng)
            .unwrap();
        assert_eq!(tiny_sk.decrypt(&tiny_ct).unwrap().get_m(), &two);
        assert!(matches!(sk.decrypt(&tiny_ct), Err(Error::KeyMismatch)));
        assert!(matches!(
            tiny_sk.decryption_factor(&c1),
            Err(Error::KeyMismatch)
        ));
    }

    #[test]
    fn test_reject_invalid_plaintext_and_ciphertext() {
        let mut rng = OsSource::new();
        let sk = keypair(&mut rng);
        let pk = sk.get_pk();
        let p = *pk.get_params().get_p();
        assert!(matches!(
            pk.encrypt(&Plaintext::new(BigInt::ZERO), &mut rng),
            Err(Error::InvalidPlaintext(_))
        ));
        assert!(pk.encrypt(&Plaintext::new(p), &mut rng).is_err());
        assert!(pk
            .encrypt_with_randomness(&Plaintext::new(BigInt::ONE), pk.get_params().get_q())
            .is_err());

        assert!(Ciphertext::new(BigInt::ZERO, BigInt::ONE, pk.clone()).is_err());
        assert!(Ciphertext::new(BigInt::ONE, p, pk.clone()).is_err());
        assert!(Ciphertext::new(BigInt::ONE, BigInt::ONE, pk.clone()).is_ok());
        // p - 1 has order 2
        let minus_one = p.wrapping_sub(&BigInt::ONE);
        assert!(Ciphertext::new(BigInt::ONE, minus_one, pk.clone()).is_err());
        assert!(Ciphertext::new(minus_one, BigInt::ONE, pk.clone()).is_err());
    }

    /// An encryption of p - 1 passes the 0-or-1 proof about half of the time, because
    /// (p - 1)^c = 1 for every even challenge c. It must not survive decoding.
    #[test]
    fn test_reject_choice_outside_subgroup() {
        let mut rng = OsSource::new();
        let sk = keypair(&mut rng);
        let pk = sk.get_pk();
        let params = pk.get_params();
        let minus_one = Plaintext::new(params.get_p().wrapping_sub(&BigInt::ONE));
        let zero_or_one = [0, 1].map(|v| Plaintext::from_exponent(v, pk));
        let generator: FiatShamir = FiatShamir::new();

        let mut forged = None;
        for _ in 0..64 {
            let r = rng.random_integer(params.get_q()).unwrap();
            let ct = pk.encrypt_with_randomness(&minus_one, &r).unwrap();
            let proof = ct
                .generate_disjunctive_proof(&zero_or_one, 0, &r, &generator, &mut rng)
                .unwrap();
            if ct.verify_disjunctive_proof(&zero_or_one, &proof, &generator) {
                forged = Some(ct);
                break;
            }
        }
        let forged = forged.unwrap();
        assert!(!params.in_subgroup(forged.get_beta()));

        let (alpha, beta) = (*forged.get_alpha(), *forged.get_beta());
        assert!(Ciphertext::new(alpha, beta, pk.clone()).is_err());
        assert!(Ciphertext::from_json(forged.to_json(), pk.clone()).is_err());
    }

    #[test]
    fn test_encryption_proof() {
        let mut rng = OsSource::new();
        let sk = keypair(&mut rng);
        let pk = sk.get_pk();
        let pt = Plaintext::new(BigInt::ONE);
        let r = rng.random_integer(pk.get_params().get_q()).unwrap();
        let ct = pk.encrypt_with_randomness(&pt, &r).unwrap();

        let fixed = FixedChallenge(BigInt::from_u64(12345));
        let proof = ct.generate_proof(&pt, &r, &fixed, &mut rng).unwrap();
        assert!(ct.verify_proof(&pt, &proof, &fixed));

        let generator: FiatShamir = FiatShamir::new();
        let proof = ct.generate_proof(&pt, &r, &generator, &mut rng).unwrap();
        assert!(ct.verify_proof(&pt, &proof, &generator));

        // the same proof does not hold for another plaintext
        let other = Plaintext::new(BigInt::from_u8(2));
        assert!(!ct.verify_proof(&other, &proof, &generator));
    }

    /// A simulated transcript passes verification when the verifier asks exactly the
    /// challenge it was simulated for, although the ciphertext does not encrypt that plaintext
    #[test]
    fn test_simulated_proof() {
        let mut rng = OsSource::new();
        let sk = keypair(&mut rng);
        let pk = sk.get_pk();
        let q = pk.get_params().get_q();
        let ct = pk.encrypt(&Plaintext::new(BigInt::ONE), &mut rng).unwrap();
        let claimed = Plaintext::new(BigInt::from_u8(2));

        let challenge = rng.random_integer(q).unwrap();
        let response = rng.random_integer(q).unwrap();
        let proof = ct.simulate_proof(&claimed, &challenge, &response).unwrap();
        assert!(ct.verify_proof(&claimed, &proof, &FixedChallenge(challenge)));

        let generator: FiatShamir = FiatShamir::new();
        assert!(!ct.verify_proof(&claimed, &proof, &generator));
    }

    #[test]
    fn test_disjunctive_proof() {
        let mut rng = OsSource::new();
        let sk = keypair(&mut rng);
        let pk = sk.get_pk();
        let plaintexts: Vec<Plaintext> = (1..=4u8)
            .map(|m| Plaintext::new(BigInt::from_u8(m)))
            .collect();
        let r = rng.random_integer(pk.get_params().get_q()).unwrap();
        let ct = pk.encrypt_with_randomness(&plaintexts[0], &r).unwrap();

        let generator: FiatShamir = FiatShamir::new();
        let proof = ct
            .generate_disjunctive_proof(&plaintexts, 0, &r, &generator, &mut rng)
            .unwrap();
        assert_eq!(proof.proofs.len(), 4);
        assert!(ct.verify_disjunctive_proof(&plaintexts, &proof, &generator));

        // the proof is bound to this ciphertext
        let rerandomized = ct
            .multiply(&pk.encrypt(&Plaintext::new(BigInt::ONE), &mut rng).unwrap())
            .unwrap();
        assert!(!rerandomized.verify_disjunctive_proof(&plaintexts, &proof, &generator));

        // and does not hold when the encrypted plaintext is left out of the list
        assert!(!ct.verify_disjunctive_proof(&plaintexts[1..], &proof, &generator));
        let shifted: Vec<Plaintext> = (2..=5u8)
            .map(|m| Plaintext::new(BigInt::from_u8(m)))
            .collect();
        assert!(!ct.verify_disjunctive_proof(&shifted, &proof, &generator));
    }

    #[test]
    fn test_decryption_proofs() {
        let mut rng = OsSource::new();
        let sk = keypair(&mut rng);
        let other = keypair(&mut rng);
        let pk = sk.get_pk();
        let generator: FiatShamir = FiatShamir::new();
        let three = Plaintext::from_exponent(3, pk);
        let ct = pk.encrypt(&three, &mut rng).unwrap();

        let (pt, proof) = sk.decrypt_and_prove(&ct, &generator, &mut rng).unwrap();
        assert_eq!(pt.get_m(), three.get_m());
        assert!(ct.verify_decryption_proof(&pt, &proof, &generator));
        assert!(!ct.verify_decryption_proof(&Plaintext::from_exponent(2, pk), &proof, &generator));

        let (factor, proof) = sk
            .decryption_factor_and_proof(&ct, &generator, &mut rng)
            .unwrap();
        assert_eq!(factor, sk.decryption_factor(&ct).unwrap());
        assert!(pk.verify_decryption_factor(&ct, &factor, &proof, &generator));
        assert!(!other
            .get_pk()
            .verify_decryption_factor(&ct, &factor, &proof, &generator));

        // another trustee's share of the same ciphertext, proven against their own key
        let (other_factor, other_proof) = other
            .decryption_factor_and_proof(&ct, &generator, &mut rng)
            .unwrap();
        assert!(other
            .get_pk()
            .verify_decryption_factor(&ct, &other_factor, &other_proof, &generator));
        assert!(!pk.verify_decryption_factor(&ct, &other_factor, &other_proof, &generator));
    }

    #[test]
    fn test_ciphertext_json() {
        let mut rng = OsSource::new();
        let sk = keypair(&mut rng);
        let pk = sk.get_pk();
        let ct = pk.encrypt(&Plaintext::new(BigInt::ONE), &mut rng).unwrap();
        let value = serde_json::to_value(ct.to_json()).unwrap();
        assert!(value["alpha"].is_string());
        assert!(value["beta"].is_string());
        let json: CiphertextJson = serde_json::from_value(value).unwrap();
        assert_eq!(Ciphertext::from_json(json, pk.clone()).unwrap(), ct);
    }
}
