//! The election definition ballots are cast against
//!
//! Fields are declared in lexicographic order, so that serializing an election yields the same
//! canonical JSON regardless of how the input was laid out. The election hash is computed over
//! that canonical form.
use crate::{keys::PublicKey, Error, Result};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    answer_urls: Vec<Option<String>>,
    answers: Vec<String>,
    choice_type: String,
    max: Option<usize>,
    min: usize,
    question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result_type: Option<String>,
    short_name: String,
    tally_type: String,
}

impl Question {
    pub fn get_answers(&self) -> &[String] {
        &self.answers
    }

    pub fn get_min(&self) -> usize {
        self.min
    }

    pub fn get_max(&self) -> Option<usize> {
        self.max
    }

    pub fn get_question(&self) -> &str {
        &self.question
    }

    pub fn get_short_name(&self) -> &str {
        &self.short_name
    }

    pub fn get_tally_type(&self) -> &str {
        &self.tally_type
    }

    /// The most answers a voter may approve; without an explicit max that is all of them
    pub fn max_approvals(&self) -> usize {
        self.max.unwrap_or(self.answers.len())
    }

    /// The question must offer at least one answer and 0 <= min <= max <= #answers
    pub fn validate(&self) -> Result<()> {
        if self.answers.is_empty() {
            return Err(Error::InvalidParameters(format!(
                "question {:?} has no answers",
                self.short_name
            )));
        }
        let max = self.max_approvals();
        if self.min > max || max > self.answers.len() {
            return Err(Error::InvalidParameters(format!(
                "question {:?} requires {} to {} of {} answers",
                self.short_name,
                self.min,
                max,
                self.answers.len()
            )));
        }
        if !self.answer_urls.is_empty() && self.answer_urls.len() != self.answers.len() {
            return Err(Error::InvalidParameters(format!(
                "question {:?} has {} answer urls for {} answers",
                self.short_name,
                self.answer_urls.len(),
                self.answers.len()
            )));
        }
        return Ok(());
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Election {
    cast_url: String,
    description: String,
    frozen_at: Option<String>,
    name: String,
    #[serde(default)]
    openreg: bool,
    public_key: PublicKey,
    questions: Vec<Question>,
    short_name: String,
    #[serde(default)]
    use_voter_aliases: bool,
    uuid: String,
    voters_hash: Option<String>,
    voting_ends_at: Option<String>,
    voting_starts_at: Option<String>,
}

impl Election {
    /// Parse an election and check every question
    pub fn from_json_str(json: &str) -> Result<Self> {
        let election: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidParameters(e.to_string()))?;
        for question in &election.questions {
            question.validate()?;
        }
        return Ok(election);
    }

    /// The canonical JSON encoding
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Hex-encoded SHA3-256 of the canonical JSON. Votes carry this value so that they cannot be
    /// replayed against another election.
    pub fn hash(&self) -> Result<String> {
        let digest = Sha3_256::digest(self.to_json()?.as_bytes());
        return Ok(hex::encode(digest));
    }

    /// The same election under another public key
    pub fn with_public_key(&self, public_key: PublicKey) -> Self {
        return Self {
            public_key,
            ..self.clone()
        };
    }

    pub fn get_uuid(&self) -> &str {
        &self.uuid
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_short_name(&self) -> &str {
        &self.short_name
    }

    pub fn get_cast_url(&self) -> &str {
        &self.cast_url
    }

    pub fn get_public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn get_questions(&self) -> &[Question] {
        &self.questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rng::OsSource, samples};

    #[test]
    fn test_sample_election() {
        let election = samples::election().unwrap();
        assert_eq!(election.get_uuid(), "2603c4ea-7c81-11e1-9608-12313f028a58");
        assert_eq!(election.get_public_key(), &samples::public_key().unwrap());
        assert_eq!(election.get_questions().len(), 2);

        let first = &election.get_questions()[0];
        assert_eq!(first.get_answers(), ["a", "b", "c"]);
        assert_eq!((first.get_min(), first.max_approvals()), (0, 1));
        let second = &election.get_questions()[1];
        assert_eq!((second.get_min(), second.max_approvals()), (1, 2));
    }

    /// The canonical form carries exactly the fields of the input
    #[test]
    fn test_json_round_trip() {
        let election = samples::election().unwrap();
        let reencoded: serde_json::Value =
            serde_json::from_str(&election.to_json().unwrap()).unwrap();
        let original: serde_json::Value = serde_json::from_str(samples::ELECTION_JSON).unwrap();
        assert_eq!(reencoded, original);
        assert_eq!(
            Election::from_json_str(&election.to_json().unwrap()).unwrap(),
            election
        );
    }

    #[test]
    fn test_hash() {
        let election = samples::election().unwrap();
        let hash = election.hash().unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, election.hash().unwrap());

        // whitespace in the input does not matter, content does
        let pretty = serde_json::to_string_pretty(&election).unwrap();
        let reparsed = Election::from_json_str(&pretty).unwrap();
        assert_eq!(reparsed.hash().unwrap(), hash);

        let sk = election
            .get_public_key()
            .get_params()
            .generate(&mut OsSource::new())
            .unwrap();
        let rekeyed = election.with_public_key(sk.get_pk().clone());
        assert_ne!(rekeyed.hash().unwrap(), hash);
        assert_eq!(rekeyed.get_uuid(), election.get_uuid());
    }

    #[test]
    fn test_max_defaults_to_all_answers() {
        let json = r#"{"answers": ["a", "b", "c", "d"], "choice_type": "approval", "max": null,
            "min": 1, "question": "q?", "short_name": "q", "tally_type": "homomorphic"}"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.max_approvals(), 4);
        question.validate().unwrap();
    }

    #[test]
    fn test_reject_invalid_questions() {
        let inverted = r#"{"answers": ["a", "b"], "choice_type": "approval", "max": 1,
            "min": 2, "question": "q?", "short_name": "q", "tally_type": "homomorphic"}"#;
        let question: Question = serde_json::from_str(inverted).unwrap();
        assert!(matches!(
            question.validate(),
            Err(Error::InvalidParameters(_))
        ));

        let too_many = r#"{"answers": ["a"], "choice_type": "approval", "max": 2,
            "min": 0, "question": "q?", "short_name": "q", "tally_type": "homomorphic"}"#;
        let question: Question = serde_json::from_str(too_many).unwrap();
        assert!(question.validate().is_err());

        let broken =
            samples::ELECTION_JSON.replace(r#""max": 2, "min": 1"#, r#""max": 2, "min": 3"#);
        assert!(Election::from_json_str(&broken).is_err());
        assert!(Election::from_json_str("{}").is_err());
    }
}
