//! The group parameters and the key pairs
use crate::{
    arithmetics::{decimal, from_decimal, OddModulus},
    proofs::{challenge::ChallengeGenerator, knowledge::KnowledgeProof},
    rng::RandomSource,
    BigInt, Error, Result,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The cyclic subgroup of order q inside the multiplicative group Z/p, generated by g
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GroupParamsJson", into = "GroupParamsJson")]
pub struct GroupParams {
    p: BigInt,
    q: BigInt,
    g: BigInt,
    p_mod: OddModulus,
    q_mod: OddModulus,
    q_bits: usize,
}

impl PartialEq for GroupParams {
    fn eq(&self, other: &Self) -> bool {
        self.p == other.p && self.q == other.q && self.g == other.g
    }
}

impl Eq for GroupParams {}

impl GroupParams {
    /// Check the shape of the parameters, though not the primality of p and q:
    /// 1. p and q are odd and q divides p - 1
    /// 2. 1 < g < p
    /// 3. g ** q == 1 (mod p)
    pub fn new(p: BigInt, q: BigInt, g: BigInt) -> Result<Self> {
        let p_mod = OddModulus::new(&p)
            .ok_or_else(|| Error::InvalidParameters("p must be odd and greater than 1".into()))?;
        let q_mod = OddModulus::new(&q)
            .ok_or_else(|| Error::InvalidParameters("q must be odd and greater than 1".into()))?;
        if q >= p || q_mod.reduce(&p) != BigInt::ONE {
            return Err(Error::InvalidParameters("q does not divide p - 1".into()));
        }
        if g <= BigInt::ONE || g >= p {
            return Err(Error::InvalidParameters("g must lie strictly between 1 and p".into()));
        }
        let params = Self {
            p,
            q,
            g,
            p_mod,
            q_mod,
            q_bits: q.bits(),
        };
        if !params.in_subgroup(&g) {
            return Err(Error::InvalidParameters("g does not have order q".into()));
        }
        return Ok(params);
    }

    pub fn get_p(&self) -> &BigInt {
        &self.p
    }

    pub fn get_q(&self) -> &BigInt {
        &self.q
    }

    pub fn get_g(&self) -> &BigInt {
        &self.g
    }

    /// Probabilistic primality test on both p and q. This is not run on load.
    pub fn is_probably_prime(&self) -> bool {
        return crypto_primes::is_prime(&self.q) && crypto_primes::is_prime(&self.p);
    }

    /// Return true iff 0 < val < p and val ** q == 1 (mod p)
    pub fn in_subgroup(&self, val: &BigInt) -> bool {
        if *val == BigInt::ZERO || *val >= self.p {
            return false;
        }
        return self.p_mod.pow(val, &self.q, self.q_bits) == BigInt::ONE;
    }

    /// base ** (exp mod q) (mod p), which is base ** exp for members of the subgroup
    pub fn pow(&self, base: &BigInt, exp: &BigInt) -> BigInt {
        let exp = self.q_mod.reduce(exp);
        return self.p_mod.pow(base, &exp, self.q_bits);
    }

    /// g ** exp (mod p)
    pub fn g_pow(&self, exp: &BigInt) -> BigInt {
        self.pow(&self.g, exp)
    }

    /// lhs * rhs (mod p)
    pub fn mul(&self, lhs: &BigInt, rhs: &BigInt) -> BigInt {
        self.p_mod.mul(lhs, rhs)
    }

    /// Multiplicative inverse (mod p); None only for multiples of p
    pub fn invert(&self, val: &BigInt) -> Option<BigInt> {
        self.p_mod.invert(val)
    }

    /// Arithmetic on exponents happens (mod q)
    pub fn exponents(&self) -> &OddModulus {
        &self.q_mod
    }

    /// Generate a key pair, with the secret exponent x drawn uniformly from [1, q)
    pub fn generate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<SecretKey> {
        // x = 0 gives the trivial key y = 1
        let x = loop {
            let x = rng.random_integer(&self.q)?;
            if x != BigInt::ZERO {
                break x;
            }
        };
        let y = self.g_pow(&x);
        debug!(q_bits = self.q_bits, "generated key pair");
        return Ok(SecretKey::new(PublicKey::new(self.clone(), y)?, x)?);
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidParameters(e.to_string()))
    }
}

#[derive(Serialize, Deserialize)]
struct GroupParamsJson {
    #[serde(with = "decimal")]
    g: BigInt,
    #[serde(with = "decimal")]
    p: BigInt,
    #[serde(with = "decimal")]
    q: BigInt,
}

impl TryFrom<GroupParamsJson> for GroupParams {
    type Error = Error;

    fn try_from(json: GroupParamsJson) -> Result<Self> {
        Self::new(json.p, json.q, json.g)
    }
}

impl From<GroupParams> for GroupParamsJson {
    fn from(params: GroupParams) -> Self {
        Self {
            g: params.g,
            p: params.p,
            q: params.q,
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyJson", into = "PublicKeyJson")]
pub struct PublicKey {
    params: GroupParams,
    y: BigInt,
}

impl PublicKey {
    /// y must be a member of the order-q subgroup other than 1
    pub fn new(params: GroupParams, y: BigInt) -> Result<Self> {
        if y == BigInt::ONE || !params.in_subgroup(&y) {
            return Err(Error::InvalidParameters(
                "y is not a non-trivial member of the subgroup".into(),
            ));
        }
        return Ok(Self { params, y });
    }

    pub fn get_params(&self) -> &GroupParams {
        &self.params
    }

    pub fn get_y(&self) -> &BigInt {
        &self.y
    }

    /// Check a Schnorr proof that the holder of this key knows its secret exponent
    pub fn verify_knowledge_of_secret_key<G: ChallengeGenerator + ?Sized>(
        &self,
        proof: &KnowledgeProof,
        generator: &G,
    ) -> bool {
        return proof.verify(self, generator);
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidParameters(e.to_string()))
    }
}

/// Keys are emitted in sorted order so that the encoding is canonical
#[derive(Serialize, Deserialize)]
struct PublicKeyJson {
    #[serde(with = "decimal")]
    g: BigInt,
    #[serde(with = "decimal")]
    p: BigInt,
    #[serde(with = "decimal")]
    q: BigInt,
    #[serde(with = "decimal")]
    y: BigInt,
}

impl TryFrom<PublicKeyJson> for PublicKey {
    type Error = Error;

    fn try_from(json: PublicKeyJson) -> Result<Self> {
        Self::new(GroupParams::new(json.p, json.q, json.g)?, json.y)
    }
}

impl From<PublicKey> for PublicKeyJson {
    fn from(pk: PublicKey) -> Self {
        Self {
            g: pk.params.g,
            p: pk.params.p,
            q: pk.params.q,
            y: pk.y,
        }
    }
}

/// The secret exponent x, together with the public key y = g ** x it belongs to. There is
/// deliberately no serde support: secret keys never travel with ballots.
#[derive(Eq, PartialEq, Clone)]
pub struct SecretKey {
    pk: PublicKey,
    x: BigInt,
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("pk", &self.pk)
            .field("x", &"<redacted>")
            .finish()
    }
}

impl SecretKey {
    /// x must be reduced (mod q) and match the public key
    pub fn new(pk: PublicKey, x: BigInt) -> Result<Self> {
        if x >= *pk.get_params().get_q() {
            return Err(Error::InvalidParameters("x must be smaller than q".into()));
        }
        if pk.get_params().g_pow(&x) != *pk.get_y() {
            return Err(Error::KeyMismatch);
        }
        return Ok(Self { pk, x });
    }

    /// Load x from its decimal encoding
    pub fn from_decimal(pk: PublicKey, x: &str) -> Result<Self> {
        Self::new(pk, from_decimal(x)?)
    }

    pub fn get_pk(&self) -> &PublicKey {
        &self.pk
    }

    pub fn get_x(&self) -> &BigInt {
        &self.x
    }

    /// Produce a Schnorr proof of knowledge of x
    pub fn prove_knowledge<G, R>(&self, generator: &G, rng: &mut R) -> Result<KnowledgeProof>
    where
        G: ChallengeGenerator + ?Sized,
        R: RandomSource + ?Sized,
    {
        return KnowledgeProof::generate(self, generator, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rng::OsSource, samples};

    #[test]
    fn test_params_json_round_trip() {
        let params = samples::group_params().unwrap();
        let json = params.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["p"], samples::P);
        assert_eq!(value["q"], samples::Q);
        assert_eq!(value["g"], samples::G);
        assert_eq!(GroupParams::from_json(&json).unwrap(), params);
    }

    #[test]
    fn test_public_key_json_round_trip() {
        let pk = samples::public_key().unwrap();
        let json = pk.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["y"], samples::Y);
        assert_eq!(PublicKey::from_json(&json).unwrap(), pk);
    }

    #[test]
    fn test_reject_malformed_params() {
        let p = from_decimal(samples::P).unwrap();
        let q = from_decimal(samples::Q).unwrap();
        let g = from_decimal(samples::G).unwrap();

        // q no longer divides p - 1
        let bad_q = q.wrapping_add(&BigInt::from_u8(2));
        assert!(matches!(
            GroupParams::new(p, bad_q, g),
            Err(Error::InvalidParameters(_))
        ));
        assert!(GroupParams::new(p, q, BigInt::ONE).is_err());
        assert!(GroupParams::new(p, q, p).is_err());
        // 2 is not in the subgroup of order q
        assert!(GroupParams::new(p, q, BigInt::from_u8(2)).is_err());
        assert!(GroupParams::new(p.wrapping_add(&BigInt::ONE), q, g).is_err());

        let truncated = r#"{"p": "23", "q": "11"}"#;
        assert!(GroupParams::from_json(truncated).is_err());
    }

    #[test]
    fn test_sample_group_is_prime() {
        assert!(samples::group_params().unwrap().is_probably_prime());
    }

    #[test]
    fn test_generate() {
        let params = samples::group_params().unwrap();
        let sk = params.generate(&mut OsSource::new()).unwrap();
        assert!(sk.get_x() < params.get_q());
        assert_eq!(params.g_pow(sk.get_x()), *sk.get_pk().get_y());
        let pk = sk.get_pk().clone();
        assert!(SecretKey::new(pk, sk.get_x().wrapping_add(&BigInt::ONE)).is_err());
    }

    /// Yields zero bytes for the first `zeros` draws, then defers to the operating system
    struct ZerosFirst {
        zeros: usize,
    }

    impl RandomSource for ZerosFirst {
        fn add_entropy(&mut self, _seed: &[u8]) {}

        fn autoseed(&mut self, _on_ready: Option<crate::rng::OnReady>) {}

        fn is_ready(&self) -> bool {
            true
        }

        fn next_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
            if self.zeros == 0 {
                return OsSource::new().next_bytes(buf);
            }
            self.zeros -= 1;
            buf.fill(0);
            return Ok(());
        }
    }

    /// A draw of x = 0 is discarded rather than failing on the trivial key
    #[test]
    fn test_generate_redraws_zero() {
        // 4 has order 11 (mod 23)
        let (p, q, g) = (BigInt::from_u8(23), BigInt::from_u8(11), BigInt::from_u8(4));
        let tiny = GroupParams::new(p, q, g).unwrap();
        let mut rng = ZerosFirst { zeros: 3 };
        let sk = tiny.generate(&mut rng).unwrap();
        assert_eq!(rng.zeros, 0);
        assert_ne!(sk.get_x(), &BigInt::ZERO);
        assert_ne!(sk.get_pk().get_y(), &BigInt::ONE);

        for _ in 0..100 {
            assert!(tiny.generate(&mut OsSource::new()).is_ok());
        }
    }

    /// Exponents are reduced (mod q), so wide exponents are not truncated
    #[test]
    fn test_pow_reduces_exponent() {
        let params = samples::group_params().unwrap();
        let g = params.get_g();
        let three = BigInt::from_u8(3);
        let wide = params.get_q().shl_vartime(300).wrapping_add(&three);
        assert!(wide.bits() > 512);
        assert_eq!(params.pow(g, &wide), params.g_pow(&three));
        let q_plus_one = params.get_q().wrapping_add(&BigInt::ONE);
        assert_eq!(params.pow(g, &q_plus_one), *g);
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        let params = samples::group_params().unwrap();
        let sk = params.generate(&mut OsSource::new()).unwrap();
        let debug = format!("{:?}", sk);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&format!("{:?}", sk.get_x())));
    }
}
