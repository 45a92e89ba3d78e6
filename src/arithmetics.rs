//! Convenience functions for arithmetics
use crate::{keys::GroupParams, BigInt, Error, Result, LIMBS};
use crypto_bigint::{
    modular::runtime_mod::{DynResidue, DynResidueParams},
    Encoding,
};
use num_bigint::BigUint;

/// Arithmetic modulo an odd number, carried out in Montgomery form
#[derive(Debug, Clone, Copy)]
pub struct OddModulus {
    params: DynResidueParams<LIMBS>,
}

impl OddModulus {
    /// Return None unless the modulus is odd and greater than 1
    pub fn new(modulus: &BigInt) -> Option<Self> {
        let odd = modulus.as_words()[0] & 1 == 1;
        if !odd || *modulus == BigInt::ONE {
            return None;
        }
        return Some(Self {
            params: DynResidueParams::new(modulus),
        });
    }

    pub fn get_modulus(&self) -> &BigInt {
        self.params.modulus()
    }

    fn residue(&self, val: &BigInt) -> DynResidue<LIMBS> {
        DynResidue::new(val, self.params)
    }

    /// val mod m, for any val
    pub fn reduce(&self, val: &BigInt) -> BigInt {
        self.residue(val).retrieve()
    }

    pub fn add(&self, lhs: &BigInt, rhs: &BigInt) -> BigInt {
        self.residue(lhs).add(&self.residue(rhs)).retrieve()
    }

    pub fn sub(&self, lhs: &BigInt, rhs: &BigInt) -> BigInt {
        self.residue(lhs).sub(&self.residue(rhs)).retrieve()
    }

    pub fn mul(&self, lhs: &BigInt, rhs: &BigInt) -> BigInt {
        self.residue(lhs).mul(&self.residue(rhs)).retrieve()
    }

    /// base ** exp, where exp must be smaller than 2 ** exp_bits
    pub fn pow(&self, base: &BigInt, exp: &BigInt, exp_bits: usize) -> BigInt {
        self.residue(base).pow_bounded_exp(exp, exp_bits).retrieve()
    }

    /// Return the multiplicative inverse, or None if val shares a factor with the modulus
    pub fn invert(&self, val: &BigInt) -> Option<BigInt> {
        let (inverse, invertible) = self.residue(val).invert();
        if invertible.into() {
            return Some(inverse.retrieve());
        }
        return None;
    }
}

/// Parse a canonical base-10 string: ASCII digits only, no sign, no leading zeros
pub fn from_decimal(digits: &str) -> Result<BigInt> {
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !(digits.len() > 1 && digits.starts_with('0'));
    if !canonical {
        return Err(Error::InvalidParameters(format!(
            "{digits:?} is not a canonical decimal integer"
        )));
    }
    let parsed = BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| Error::InvalidParameters(format!("cannot parse {digits:?}")))?;
    return from_be_bytes(&parsed.to_bytes_be());
}

/// Render as a base-10 string, the inverse of `from_decimal`
pub fn to_decimal(val: &BigInt) -> String {
    BigUint::from_bytes_be(&val.to_be_bytes()).to_str_radix(10)
}

/// Load a big-endian byte string of any length, as long as the value fits in a BigInt
pub fn from_be_bytes(bytes: &[u8]) -> Result<BigInt> {
    let first_nonzero = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let significant = &bytes[first_nonzero..];
    if significant.len() > BigInt::BYTES {
        return Err(Error::InvalidParameters(format!(
            "integer of {} bytes exceeds {} bytes",
            significant.len(),
            BigInt::BYTES
        )));
    }
    let mut padded = [0u8; BigInt::BYTES];
    padded[BigInt::BYTES - significant.len()..].copy_from_slice(significant);
    return Ok(BigInt::from_be_slice(&padded));
}

/// Brute-force discrete log of target with respect to the group generator: return the smallest
/// k <= bound such that g ** k == target (mod p). Tallies are small, so a linear scan is enough.
pub fn discrete_log(params: &GroupParams, target: &BigInt, bound: u64) -> Option<u64> {
    let mut acc = BigInt::ONE;
    for exp in 0..=bound {
        if acc == *target {
            return Some(exp);
        }
        acc = params.mul(&acc, params.get_g());
    }
    return None;
}

/// serde adapter: a BigInt as a decimal string
pub mod decimal {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(val: &BigInt, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_decimal(val))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<BigInt, D::Error>
    where
        D: Deserializer<'de>,
    {
        let digits = String::deserialize(deserializer)?;
        from_decimal(&digits).map_err(de::Error::custom)
    }
}

/// serde adapter: a sequence of BigInt as decimal strings
pub mod decimal_seq {
    use super::*;
    use serde::{de, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(vals: &[BigInt], serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(vals.len()))?;
        for val in vals {
            seq.serialize_element(&to_decimal(val))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Vec<BigInt>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let all_digits = Vec::<String>::deserialize(deserializer)?;
        all_digits
            .iter()
            .map(|digits| from_decimal(digits).map_err(de::Error::custom))
            .collect()
    }
}
