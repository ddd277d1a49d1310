use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::model::category::Category;
use crate::model::question::{QuestionData, RawQuestion};

/// Title fragment of information-retrieval passages (rendered as tables).
const TABLE_LAYOUT_MARKER: &str = "情報検索";

pub type VocabularyChapter = BTreeMap<Category, Vec<QuestionData>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoPassage {
    pub image: String,
    pub questions: Vec<QuestionData>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextPassage {
    pub title: String,
    pub text: String,
    pub questions: Vec<QuestionData>,
}

impl TextPassage {
    /// Leading chapter numeral of the title ("3 主張理解" -> 3).
    pub fn leading_number(&self) -> Option<u32> {
        let digits: String = self
            .title
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    pub fn in_chapter(&self, chapter: u32) -> bool {
        self.title.starts_with(&format!("{chapter} "))
    }

    pub fn is_table_layout(&self) -> bool {
        self.title.contains(TABLE_LAYOUT_MARKER)
    }
}

/// Every source pool a session can draw from. Absent sources are empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pools {
    pub vocabulary: Vec<QuestionData>,
    pub vocabulary_chapters: Vec<VocabularyChapter>,
    pub grammar: Vec<QuestionData>,
    pub grammar_starred: Vec<QuestionData>,
    pub grammar_chapters: Vec<Vec<QuestionData>>,
    pub photo_passages: Vec<PhotoPassage>,
    pub text_passages: Vec<TextPassage>,
}

impl Pools {
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
            && self.vocabulary_chapters.is_empty()
            && self.grammar.is_empty()
            && self.grammar_starred.is_empty()
            && self.grammar_chapters.is_empty()
            && self.photo_passages.is_empty()
            && self.text_passages.is_empty()
    }
}

// --- On-disk shapes ---

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawPhotoPassage {
    pub image: String,
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawTextPassage {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

pub type RawVocabularyChapter = BTreeMap<Category, Vec<RawQuestion>>;

pub fn normalize_questions(
    raw: Vec<RawQuestion>,
    source: &str,
) -> Result<Vec<QuestionData>, DataError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, q)| q.normalize(&format!("{source}[{i}]")))
        .collect()
}

pub fn normalize_vocabulary_chapters(
    raw: Vec<RawVocabularyChapter>,
    source: &str,
) -> Result<Vec<VocabularyChapter>, DataError> {
    raw.into_iter()
        .enumerate()
        .map(|(ch, chapter)| {
            chapter
                .into_iter()
                .map(|(category, qs)| -> Result<_, DataError> {
                    let location = format!("{source}[{ch}].{}", category.to_key());
                    Ok((category, normalize_questions(qs, &location)?))
                })
                .collect::<Result<VocabularyChapter, DataError>>()
        })
        .collect()
}

pub fn normalize_grammar_chapters(
    raw: Vec<Vec<RawQuestion>>,
    source: &str,
) -> Result<Vec<Vec<QuestionData>>, DataError> {
    raw.into_iter()
        .enumerate()
        .map(|(ch, qs)| normalize_questions(qs, &format!("{source}[{ch}]")))
        .collect()
}

pub fn normalize_photo_passages(
    raw: Vec<RawPhotoPassage>,
    source: &str,
) -> Result<Vec<PhotoPassage>, DataError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, p)| -> Result<_, DataError> {
            Ok(PhotoPassage {
                questions: normalize_questions(p.questions, &format!("{source}[{i}].questions"))?,
                image: p.image,
            })
        })
        .collect()
}

pub fn normalize_text_passages(
    raw: Vec<RawTextPassage>,
    source: &str,
) -> Result<Vec<TextPassage>, DataError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, p)| -> Result<_, DataError> {
            Ok(TextPassage {
                questions: normalize_questions(p.questions, &format!("{source}[{i}].questions"))?,
                title: p.title,
                text: p.text,
            })
        })
        .collect()
}
