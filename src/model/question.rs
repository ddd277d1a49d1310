use std::borrow::Cow;

use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

pub const OPTION_COUNT: usize = 4;

/// Answer key as it appears in the bank files: either a zero-based option
/// index or the literal text of the correct option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerKey {
    Index(i64),
    Literal(String),
}

/// A question record exactly as stored on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(alias = "text")]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, alias = "correct")]
    pub answer: Option<AnswerKey>,
}

impl RawQuestion {
    pub fn new(question: &str, options: [&str; OPTION_COUNT], answer: AnswerKey) -> Self {
        Self {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer: Some(answer),
        }
    }

    /// Resolve the answer key to a canonical index and check the option count.
    pub fn normalize(self, location: &str) -> Result<QuestionData, DataError> {
        let found = self.options.len();
        let options: [String; OPTION_COUNT] =
            self.options
                .try_into()
                .map_err(|_| DataError::WrongOptionCount {
                    location: location.to_string(),
                    found,
                })?;

        let correct = match self.answer {
            None => {
                return Err(DataError::MissingAnswer {
                    location: location.to_string(),
                });
            }
            Some(AnswerKey::Index(index)) => usize::try_from(index)
                .ok()
                .filter(|&i| i < OPTION_COUNT)
                .ok_or_else(|| DataError::AnswerOutOfRange {
                    location: location.to_string(),
                    index,
                })?,
            Some(AnswerKey::Literal(answer)) => {
                let wanted = nfc(&answer);
                options
                    .iter()
                    .position(|opt| nfc(opt) == wanted)
                    .ok_or_else(|| DataError::UnknownLiteral {
                        location: location.to_string(),
                        answer: answer.clone(),
                    })?
            }
        };

        Ok(QuestionData {
            text: self.question,
            options,
            correct,
        })
    }
}

fn nfc(s: &str) -> Cow<'_, str> {
    ComposingNormalizerBorrowed::new_nfc().normalize(s.trim())
}

/// A validated pool entry: four options and one correct index in 0..4.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionData {
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct: usize,
}

impl QuestionData {
    pub fn new(text: &str, options: [&str; OPTION_COUNT], correct: usize) -> Self {
        assert!(correct < OPTION_COUNT, "correct index out of range");
        Self {
            text: text.to_string(),
            options: options.map(str::to_string),
            correct,
        }
    }

    /// Mean option length in characters.
    pub fn mean_option_len(&self) -> f64 {
        let total: usize = self.options.iter().map(|o| o.chars().count()).sum();
        total as f64 / OPTION_COUNT as f64
    }

    pub fn to_raw(&self) -> RawQuestion {
        RawQuestion {
            question: self.text.clone(),
            options: self.options.to_vec(),
            answer: Some(AnswerKey::Index(self.correct as i64)),
        }
    }
}
