//! The encrypted answer to a single question
//!
//! Each answer slot k is encrypted as g^1 if selected and g^0 otherwise, with a disjunctive proof
//! that it encrypts one of the two. The product of all slots encrypts g^(number of selections),
//! and an overall disjunctive proof shows that this count lies in [min, max].
use crate::{
    arithmetics::{from_decimal, to_decimal},
    elgamal::{Ciphertext, CiphertextJson, Plaintext},
    election::Question,
    keys::PublicKey,
    proofs::{challenge::ChallengeGenerator, disjunctive::DisjunctiveProof},
    rng::RandomSource,
    BigInt, Error, Result,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What an answer still knows about its plaintext
pub trait AnswerState {
    fn get_selection(&self) -> Option<&[usize]>;
    fn get_randomness(&self) -> Option<&[BigInt]>;
}

/// Before casting: the selected answer indices and the randomness of every choice
#[derive(Eq, PartialEq, Clone)]
pub struct Unsealed {
    selection: Vec<usize>,
    randomness: Vec<BigInt>,
}

/// Either field opens the ballot, so neither is printed
impl std::fmt::Debug for Unsealed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsealed")
            .field("selection", &"<redacted>")
            .field("randomness", &"<redacted>")
            .finish()
    }
}

impl AnswerState for Unsealed {
    fn get_selection(&self) -> Option<&[usize]> {
        Some(&self.selection)
    }

    fn get_randomness(&self) -> Option<&[BigInt]> {
        Some(&self.randomness)
    }
}

/// After casting
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct Sealed;

impl AnswerState for Sealed {
    fn get_selection(&self) -> Option<&[usize]> {
        None
    }

    fn get_randomness(&self) -> Option<&[BigInt]> {
        None
    }
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct EncryptedAnswer<S> {
    choices: Vec<Ciphertext>,
    individual_proofs: Vec<DisjunctiveProof>,
    overall_proof: DisjunctiveProof,
    state: S,
}

/// The wire form. `randomness` is present only before casting.
#[derive(Serialize, Deserialize)]
struct AnswerJson {
    choices: Vec<CiphertextJson>,
    individual_proofs: Vec<DisjunctiveProof>,
    overall_proof: DisjunctiveProof,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    randomness: Option<Vec<String>>,
}

/// An answer read back from JSON, in whichever form it was written
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum DecodedAnswer {
    Unsealed(EncryptedAnswer<Unsealed>),
    Sealed(EncryptedAnswer<Sealed>),
}

/// The plaintexts g^0 and g^1 every choice must encrypt one of
fn zero_or_one(pk: &PublicKey) -> [Plaintext; 2] {
    [
        Plaintext::from_exponent(0, pk),
        Plaintext::from_exponent(1, pk),
    ]
}

/// The plaintexts g^min, ..., g^max the sum of all choices must encrypt one of
fn allowed_counts(question: &Question, pk: &PublicKey) -> Vec<Plaintext> {
    (question.get_min()..=question.max_approvals())
        .map(|count| Plaintext::from_exponent(count as u64, pk))
        .collect()
}

/// The selection must consist of distinct answer indices, and the number of them must be allowed
fn check_selection(question: &Question, selection: &[usize]) -> Result<()> {
    let num_answers = question.get_answers().len();
    let mut seen = vec![false; num_answers];
    for &index in selection {
        if index >= num_answers {
            return Err(Error::InvalidSelection(format!("answer {index} out of {num_answers}")));
        }
        if seen[index] {
            return Err(Error::InvalidSelection(format!("answer {index} selected twice")));
        }
        seen[index] = true;
    }
    if selection.len() < question.get_min() || selection.len() > question.max_approvals() {
        return Err(Error::InvalidSelection(format!(
            "{} answers selected, between {} and {} allowed",
            selection.len(),
            question.get_min(),
            question.max_approvals()
        )));
    }
    return Ok(());
}

impl EncryptedAnswer<Unsealed> {
    pub fn encrypt<G, R>(
        question: &Question,
        selection: &[usize],
        pk: &PublicKey,
        generator: &G,
        rng: &mut R,
    ) -> Result<Self>
    where
        G: ChallengeGenerator + ?Sized,
        R: RandomSource + ?Sized,
    {
        check_selection(question, selection)?;
        let params = pk.get_params();
        let plaintexts = zero_or_one(pk);

        let num_answers = question.get_answers().len();
        let mut choices = Vec::with_capacity(num_answers);
        let mut individual_proofs = Vec::with_capacity(num_answers);
        let mut randomness = Vec::with_capacity(num_answers);
        for k in 0..num_answers {
            let selected = selection.contains(&k) as usize;
            let r = rng.random_integer(params.get_q())?;
            let choice = pk.encrypt_with_randomness(&plaintexts[selected], &r)?;
            let proof =
                choice.generate_disjunctive_proof(&plaintexts, selected, &r, generator, rng)?;
            individual_proofs.push(proof);
            choices.push(choice);
            randomness.push(r);
        }

        let (sum, sum_randomness) = Self::sum(&choices, &randomness, pk)?;
        let overall_proof = sum.generate_disjunctive_proof(
            &allowed_counts(question, pk),
            selection.len() - question.get_min(),
            &sum_randomness,
            generator,
            rng,
        )?;

        let mut selection = selection.to_vec();
        selection.sort_unstable();
        return Ok(Self {
            choices,
            individual_proofs,
            overall_proof,
            state: Unsealed {
                selection,
                randomness,
            },
        });
    }

    fn sum(
        choices: &[Ciphertext],
        randomness: &[BigInt],
        pk: &PublicKey,
    ) -> Result<(Ciphertext, BigInt)> {
        let exponents = pk.get_params().exponents();
        let mut sum = Ciphertext::new(BigInt::ONE, BigInt::ONE, pk.clone())?;
        let mut sum_randomness = BigInt::ZERO;
        for (choice, r) in choices.iter().zip(randomness.iter()) {
            sum = sum.multiply(choice)?;
            sum_randomness = exponents.add(&sum_randomness, r);
        }
        return Ok((sum, sum_randomness));
    }

    /// Discard the selection and the randomness. Only the ciphertexts and proofs remain.
    pub fn clear_plaintexts(self) -> EncryptedAnswer<Sealed> {
        return EncryptedAnswer {
            choices: self.choices,
            individual_proofs: self.individual_proofs,
            overall_proof: self.overall_proof,
            state: Sealed,
        };
    }

    /// The selected answer indices, in increasing order
    pub fn get_selection(&self) -> &[usize] {
        &self.state.selection
    }
}

impl<S: AnswerState> EncryptedAnswer<S> {
    pub fn get_choices(&self) -> &[Ciphertext] {
        &self.choices
    }

    pub fn get_individual_proofs(&self) -> &[DisjunctiveProof] {
        &self.individual_proofs
    }

    pub fn get_overall_proof(&self) -> &DisjunctiveProof {
        &self.overall_proof
    }

    /// The encryption randomness, if it has not been cleared
    pub fn randomness(&self) -> Option<&[BigInt]> {
        self.state.get_randomness()
    }

    /// Check the shape of the answer against the question. Anything wrong here means the input is
    /// malformed, not that a proof is in dispute.
    fn check_shape(&self, question: &Question, pk: &PublicKey) -> Result<()> {
        let num_answers = question.get_answers().len();
        if self.choices.len() != num_answers || self.individual_proofs.len() != num_answers {
            return Err(Error::MalformedAnswer(format!(
                "{} choices and {} proofs for {num_answers} answers",
                self.choices.len(),
                self.individual_proofs.len()
            )));
        }
        if self.individual_proofs.iter().any(|p| p.proofs.len() != 2) {
            return Err(Error::MalformedAnswer("every choice proof must have two branches".into()));
        }
        let num_counts = (question.max_approvals() + 1).saturating_sub(question.get_min());
        if self.overall_proof.proofs.len() != num_counts {
            return Err(Error::MalformedAnswer(format!(
                "overall proof has {} branches, expected {num_counts}",
                self.overall_proof.proofs.len()
            )));
        }
        if self.choices.iter().any(|choice| choice.get_pk() != pk) {
            return Err(Error::KeyMismatch);
        }
        return Ok(());
    }

    /// Verify every proof of the answer, reporting the result for each choice as it is known.
    /// All proofs are checked even after one fails.
    pub(crate) fn verify_each<G, F>(
        &self,
        question: &Question,
        pk: &PublicKey,
        generator: &G,
        mut on_choice: F,
    ) -> Result<bool>
    where
        G: ChallengeGenerator + ?Sized,
        F: FnMut(usize, bool),
    {
        self.check_shape(question, pk)?;
        let zero_one = zero_or_one(pk);
        let mut valid = true;
        let mut sum = Ciphertext::new(BigInt::ONE, BigInt::ONE, pk.clone())?;
        for (k, (choice, proof)) in self
            .choices
            .iter()
            .zip(self.individual_proofs.iter())
            .enumerate()
        {
            let choice_valid = choice.verify_disjunctive_proof(&zero_one, proof, generator);
            if !choice_valid {
                warn!(choice = k, "choice proof does not hold");
            }
            on_choice(k, choice_valid);
            valid &= choice_valid;
            sum = sum.multiply(choice)?;
        }
        let overall_valid = sum.verify_disjunctive_proof(
            &allowed_counts(question, pk),
            &self.overall_proof,
            generator,
        );
        if !overall_valid {
            warn!("overall proof does not hold");
        }
        return Ok(valid && overall_valid);
    }

    /// Check that every choice encrypts 0 or 1 and that the number of selections is allowed by
    /// the question. Returns an error only for malformed answers.
    pub fn verify_encryption<G: ChallengeGenerator + ?Sized>(
        &self,
        question: &Question,
        pk: &PublicKey,
        generator: &G,
    ) -> Result<bool> {
        self.verify_each(question, pk, generator, |_, _| {})
    }

    /// The JSON form, including the randomness unless it has been cleared
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        let json = AnswerJson {
            choices: self.choices.iter().map(Ciphertext::to_json).collect(),
            individual_proofs: self.individual_proofs.clone(),
            overall_proof: self.overall_proof.clone(),
            randomness: self
                .randomness()
                .map(|randomness| randomness.iter().map(to_decimal).collect()),
        };
        return Ok(serde_json::to_value(json)?);
    }
}

impl EncryptedAnswer<Sealed> {
    /// Read an answer in either form. When the randomness is present, each choice is reopened
    /// with it to recover the selection; a choice that does not open to g^0 or g^1 is malformed.
    pub fn decode(value: serde_json::Value, pk: &PublicKey) -> Result<DecodedAnswer> {
        let json: AnswerJson =
            serde_json::from_value(value).map_err(|e| Error::MalformedAnswer(e.to_string()))?;
        if json.individual_proofs.len() != json.choices.len() {
            return Err(Error::MalformedAnswer(format!(
                "{} proofs for {} choices",
                json.individual_proofs.len(),
                json.choices.len()
            )));
        }
        let choices = json
            .choices
            .into_iter()
            .map(|choice| Ciphertext::from_json(choice, pk.clone()))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| Error::MalformedAnswer(e.to_string()))?;
        let sealed = EncryptedAnswer {
            choices,
            individual_proofs: json.individual_proofs,
            overall_proof: json.overall_proof,
            state: Sealed,
        };

        let randomness = match json.randomness {
            None => return Ok(DecodedAnswer::Sealed(sealed)),
            Some(randomness) => randomness,
        };
        if randomness.len() != sealed.choices.len() {
            return Err(Error::MalformedAnswer(format!(
                "{} randomness values for {} choices",
                randomness.len(),
                sealed.choices.len()
            )));
        }
        let randomness = randomness
            .iter()
            .map(|digits| from_decimal(digits))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| Error::MalformedAnswer(e.to_string()))?;

        let mut selection = vec![];
        for (k, (choice, r)) in sealed.choices.iter().zip(randomness.iter()).enumerate() {
            if Self::reopen(choice, r, pk)? {
                selection.push(k);
            }
        }
        return Ok(DecodedAnswer::Unsealed(EncryptedAnswer {
            choices: sealed.choices,
            individual_proofs: sealed.individual_proofs,
            overall_proof: sealed.overall_proof,
            state: Unsealed {
                selection,
                randomness,
            },
        }));
    }

    /// Return whether the choice opens to g^1 under the randomness
    fn reopen(choice: &Ciphertext, r: &BigInt, pk: &PublicKey) -> Result<bool> {
        let [zero, one] = zero_or_one(pk);
        if r >= pk.get_params().get_q() {
            return Err(Error::MalformedAnswer("randomness must be smaller than q".into()));
        }
        let reencrypted = |plaintext: &Plaintext| pk.encrypt_with_randomness(plaintext, r);
        if reencrypted(&one)? == *choice {
            return Ok(true);
        }
        if reencrypted(&zero)? == *choice {
            return Ok(false);
        }
        return Err(Error::MalformedAnswer(
            "choice does not open to 0 or 1 under its randomness".into(),
        ));
    }
}
