use serde::{Deserialize, Serialize};

use crate::model::category::Category;
use crate::model::question::{OPTION_COUNT, QuestionData};

/// Exam section a question was drawn for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Vocabulary,
    Grammar,
    /// Sentence-ordering grammar (the ★ problems).
    StarredGrammar,
    Reading,
}

impl QuestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Vocabulary => "vocabulary",
            QuestionKind::Grammar => "grammar",
            QuestionKind::StarredGrammar => "starred_grammar",
            QuestionKind::Reading => "reading",
        }
    }

    pub fn is_grammar(self) -> bool {
        matches!(self, QuestionKind::Grammar | QuestionKind::StarredGrammar)
    }
}

/// One atomic question as presented in a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub kind: QuestionKind,
    pub category: Option<Category>,
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct: usize,
    pub user_answer: Option<usize>,
}

impl Question {
    pub fn from_data(
        data: &QuestionData,
        kind: QuestionKind,
        category: Option<Category>,
        id: String,
    ) -> Self {
        Self {
            id,
            kind,
            category,
            text: data.text.clone(),
            options: data.options.clone(),
            correct: data.correct,
            user_answer: None,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.user_answer.is_some()
    }

    /// `None` until answered.
    pub fn is_correct(&self) -> Option<bool> {
        self.user_answer.map(|a| a == self.correct)
    }

    pub fn is_missed(&self) -> bool {
        self.is_correct() == Some(false)
    }

    /// Equal apart from the per-session id and answer state.
    pub fn same_content(&self, other: &Question) -> bool {
        self.kind == other.kind
            && self.category == other.category
            && self.text == other.text
            && self.options == other.options
            && self.correct == other.correct
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PassageSource {
    Image(String),
    Text(String),
}

/// Sub-questions sharing one reading passage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageGroup {
    pub id: String,
    pub source: PassageSource,
    pub title: Option<String>,
    /// Monospaced rendering for tabular passages.
    pub table_layout: bool,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Question(Question),
    Passage(PassageGroup),
}

impl Item {
    pub fn id(&self) -> &str {
        match self {
            Item::Question(q) => &q.id,
            Item::Passage(p) => &p.id,
        }
    }

    /// Atomic questions carried by this item, in display order.
    pub fn questions(&self) -> &[Question] {
        match self {
            Item::Question(q) => std::slice::from_ref(q),
            Item::Passage(p) => &p.questions,
        }
    }

    pub fn question_count(&self) -> usize {
        self.questions().len()
    }

    pub fn as_passage(&self) -> Option<&PassageGroup> {
        match self {
            Item::Passage(p) => Some(p),
            Item::Question(_) => None,
        }
    }

    pub fn same_content(&self, other: &Item) -> bool {
        match (self, other) {
            (Item::Question(a), Item::Question(b)) => a.same_content(b),
            (Item::Passage(a), Item::Passage(b)) => {
                a.source == b.source
                    && a.title == b.title
                    && a.questions.len() == b.questions.len()
                    && a.questions
                        .iter()
                        .zip(&b.questions)
                        .all(|(x, y)| x.same_content(y))
            }
            _ => false,
        }
    }
}

/// Address of an atomic question inside an item sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionRef {
    pub item: usize,
    pub sub: Option<usize>,
}

/// Walk every atomic question of `items` with its address.
pub fn flatten(items: &[Item]) -> impl Iterator<Item = (QuestionRef, &Question)> {
    items.iter().enumerate().flat_map(|(idx, item)| {
        let grouped = matches!(item, Item::Passage(_));
        item.questions().iter().enumerate().map(move |(sub, q)| {
            let sub = grouped.then_some(sub);
            (QuestionRef { item: idx, sub }, q)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: &str, kind: QuestionKind) -> Question {
        Question::from_data(
            &QuestionData::new("t", ["a", "b", "c", "d"], 1),
            kind,
            None,
            id.to_string(),
        )
    }

    #[test]
    fn flatten_expands_passages() {
        let items = vec![
            Item::Question(q("a", QuestionKind::Grammar)),
            Item::Passage(PassageGroup {
                id: "p".to_string(),
                source: PassageSource::Text("本文".to_string()),
                title: None,
                table_layout: false,
                questions: vec![q("p0", QuestionKind::Reading), q("p1", QuestionKind::Reading)],
            }),
        ];
        let refs: Vec<QuestionRef> = flatten(&items).map(|(r, _)| r).collect();
        assert_eq!(
            refs,
            vec![
                QuestionRef { item: 0, sub: None },
                QuestionRef { item: 1, sub: Some(0) },
                QuestionRef { item: 1, sub: Some(1) },
            ]
        );
    }

    #[test]
    fn correctness_is_none_until_answered() {
        let mut question = q("a", QuestionKind::Vocabulary);
        assert_eq!(question.is_correct(), None);
        question.user_answer = Some(0);
        assert_eq!(question.is_correct(), Some(false));
        assert!(question.is_missed());
    }

    #[test]
    fn same_content_ignores_id() {
        assert!(q("a", QuestionKind::Grammar).same_content(&q("b", QuestionKind::Grammar)));
        assert!(!q("a", QuestionKind::Grammar).same_content(&q("a", QuestionKind::Reading)));
    }
}
