//! A complete ballot: one encrypted answer per question, bound to the election it was cast in
use crate::{
    ballot::answer::{AnswerState, DecodedAnswer, EncryptedAnswer, Sealed, Unsealed},
    election::{Election, Question},
    keys::PublicKey,
    proofs::challenge::FiatShamir,
    rng::RandomSource,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Reported by [`EncryptedVote::verify_proofs`] in order: once for every choice of every answer,
/// then once with the verdict on the whole vote
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Progress {
    Choice {
        answer: usize,
        choice: usize,
        valid: bool,
    },
    Complete {
        valid: bool,
    },
}

/// What a voter needs to audit a ballot they decided not to cast
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct AuditTrail {
    /// The serialized vote, including the randomness of every choice
    pub vote: String,
    pub plaintext_answers: Vec<Vec<usize>>,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct EncryptedVote<'e, S> {
    election: &'e Election,
    election_hash: String,
    encrypted_answers: Vec<EncryptedAnswer<S>>,
}

#[derive(Serialize, Deserialize)]
struct VoteJson {
    answers: Vec<serde_json::Value>,
    election_hash: String,
    election_uuid: String,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum DecodedVote<'e> {
    Unsealed(EncryptedVote<'e, Unsealed>),
    Sealed(EncryptedVote<'e, Sealed>),
}

/// Proofs for question `index` of the election are bound to the election hash and the index
fn question_generator(election_hash: &str, index: usize) -> FiatShamir {
    let mut context = election_hash.as_bytes().to_vec();
    context.extend_from_slice(&(index as u64).to_be_bytes());
    return FiatShamir::with_context(context);
}

impl<'e> EncryptedVote<'e, Unsealed> {
    /// Encrypt one selection per question of the election
    pub fn new<R: RandomSource + ?Sized>(
        election: &'e Election,
        selections: &[Vec<usize>],
        rng: &mut R,
    ) -> Result<Self> {
        if !rng.is_ready() {
            return Err(Error::NotSeeded);
        }
        let questions = election.get_questions();
        if selections.len() != questions.len() {
            return Err(Error::InvalidSelection(format!(
                "{} selections for {} questions",
                selections.len(),
                questions.len()
            )));
        }
        let election_hash = election.hash()?;
        let pk = election.get_public_key();
        let encrypted_answers = questions
            .iter()
            .zip(selections.iter())
            .enumerate()
            .map(|(i, (question, selection))| {
                let generator = question_generator(&election_hash, i);
                EncryptedAnswer::encrypt(question, selection, pk, &generator, &mut *rng)
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(
            election = election.get_uuid(),
            questions = questions.len(),
            "encrypted vote"
        );
        return Ok(Self {
            election,
            election_hash,
            encrypted_answers,
        });
    }

    /// The serialized vote with its randomness, and the selections it encrypts. Once the vote
    /// is sealed none of this can be produced any more.
    pub fn get_audit_trail(&self) -> Result<AuditTrail> {
        let vote = serde_json::to_string(&self.to_json_value()?)?;
        let plaintext_answers = self
            .encrypted_answers
            .iter()
            .map(|answer| answer.get_selection().to_vec())
            .collect();
        return Ok(AuditTrail {
            vote,
            plaintext_answers,
        });
    }

    /// Cast the vote: every answer forgets its selection and randomness
    pub fn clear_plaintexts(self) -> EncryptedVote<'e, Sealed> {
        debug!(election = self.election.get_uuid(), "sealed vote");
        return EncryptedVote {
            election: self.election,
            election_hash: self.election_hash,
            encrypted_answers: self
                .encrypted_answers
                .into_iter()
                .map(EncryptedAnswer::clear_plaintexts)
                .collect(),
        };
    }
}

impl<'e, S: AnswerState> EncryptedVote<'e, S> {
    pub fn get_election(&self) -> &'e Election {
        self.election
    }

    pub fn get_election_hash(&self) -> &str {
        &self.election_hash
    }

    pub fn get_encrypted_answers(&self) -> &[EncryptedAnswer<S>] {
        &self.encrypted_answers
    }

    /// A vote claiming another election's hash is never valid for this one
    fn bound_to_election(&self) -> Result<bool> {
        let expected = self.election.hash()?;
        if self.election_hash != expected {
            warn!(
                election = self.election.get_uuid(),
                claimed = %self.election_hash,
                "vote is bound to another election"
            );
            return Ok(false);
        }
        return Ok(true);
    }

    fn check_answer_count(&self, questions: &[Question]) -> Result<()> {
        if questions.len() != self.encrypted_answers.len() {
            return Err(Error::MalformedVote(format!(
                "{} answers for {} questions",
                self.encrypted_answers.len(),
                questions.len()
            )));
        }
        return Ok(());
    }

    /// Verify every answer against its question
    pub fn verify_encryption(&self, questions: &[Question], pk: &PublicKey) -> Result<bool> {
        self.check_answer_count(questions)?;
        if !self.bound_to_election()? {
            return Ok(false);
        }
        let mut valid = true;
        for (i, (answer, question)) in self
            .encrypted_answers
            .iter()
            .zip(questions.iter())
            .enumerate()
        {
            let generator = question_generator(&self.election_hash, i);
            if !answer.verify_encryption(question, pk, &generator)? {
                warn!(answer = i, "answer does not verify");
                valid = false;
            }
        }
        return Ok(valid);
    }

    /// Verify the proofs of every answer against the election's questions, reporting each
    /// choice as it is checked and the verdict at the end
    pub fn verify_proofs<F: FnMut(Progress)>(
        &self,
        pk: &PublicKey,
        mut progress: F,
    ) -> Result<bool> {
        let questions = self.election.get_questions();
        self.check_answer_count(questions)?;
        if !self.bound_to_election()? {
            progress(Progress::Complete { valid: false });
            return Ok(false);
        }
        let mut valid = true;
        for (i, (answer, question)) in self
            .encrypted_answers
            .iter()
            .zip(questions.iter())
            .enumerate()
        {
            let generator = question_generator(&self.election_hash, i);
            let answer_valid = answer.verify_each(question, pk, &generator, |choice, valid| {
                progress(Progress::Choice {
                    answer: i,
                    choice,
                    valid,
                })
            })?;
            if !answer_valid {
                warn!(answer = i, "answer proofs do not hold");
            }
            valid &= answer_valid;
        }
        progress(Progress::Complete { valid });
        return Ok(valid);
    }

    /// `{answers, election_hash, election_uuid}`, with randomness in the answers unless the vote
    /// has been sealed
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        let json = VoteJson {
            answers: self
                .encrypted_answers
                .iter()
                .map(EncryptedAnswer::to_json_value)
                .collect::<Result<Vec<_>>>()?,
            election_hash: self.election_hash.clone(),
            election_uuid: self.election.get_uuid().to_string(),
        };
        return Ok(serde_json::to_value(json)?);
    }
}

impl<'e> EncryptedVote<'e, Sealed> {
    /// Read a vote for the election in either form. All answers must be in the same form.
    pub fn decode(json: &str, election: &'e Election) -> Result<DecodedVote<'e>> {
        let json: VoteJson =
            serde_json::from_str(json).map_err(|e| Error::MalformedVote(e.to_string()))?;
        if json.election_uuid != election.get_uuid() {
            return Err(Error::MalformedVote(format!(
                "vote for election {} read against election {}",
                json.election_uuid,
                election.get_uuid()
            )));
        }
        if json.answers.len() != election.get_questions().len() {
            return Err(Error::MalformedVote(format!(
                "{} answers for {} questions",
                json.answers.len(),
                election.get_questions().len()
            )));
        }

        let mut unsealed = vec![];
        let mut sealed = vec![];
        for value in json.answers {
            match EncryptedAnswer::decode(value, election.get_public_key())? {
                DecodedAnswer::Unsealed(answer) => unsealed.push(answer),
                DecodedAnswer::Sealed(answer) => sealed.push(answer),
            }
        }
        let election_hash = json.election_hash;
        match (unsealed.is_empty(), sealed.is_empty()) {
            (true, _) => Ok(DecodedVote::Sealed(EncryptedVote {
                election,
                election_hash,
                encrypted_answers: sealed,
            })),
            (false, true) => Ok(DecodedVote::Unsealed(EncryptedVote {
                election,
                election_hash,
                encrypted_answers: unsealed,
            })),
            (false, false) => Err(Error::MalformedVote(
                "vote mixes sealed and unsealed answers".into(),
            )),
        }
    }
}
