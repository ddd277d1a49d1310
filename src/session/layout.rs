use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::engine::mode::Mode;
use crate::model::category::{Category, exam_vocabulary_total};
use crate::model::item::{Item, PassageGroup, PassageSource, Question, QuestionKind, QuestionRef};

/// Vocabulary problems that precede the grammar section in a full sitting.
pub const MID_EXAM_START: u32 = exam_vocabulary_total() as u32;

/// Image passages whose file name is a zero-padded number already print the
/// question text inside the picture.
pub const PROMPT_IMAGE_PATTERN: &str = r"(?i)/0\d+\.(png|jpg|jpeg)$";

const GRAMMAR_HEADER: &str =
    "問題7　次の文の（　）に入れるのに最もよいものを、１・２・３・４から一つ選びなさい。";
const STARRED_HEADER: &str =
    "問題8　次の文の　★　に入る最もよいものを、１・２・３・４から一つ選びなさい。";
const PHOTO_HEADER: &str = "読解 (Reading Comprehension)";

/// One numbered question slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub question: QuestionRef,
    pub number: u32,
    pub show_prompt: bool,
}

/// A rendered unit: a lone question, or a passage with its questions.
/// Consecutive passage groups that share the same source collapse into
/// one block so the passage is only shown once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Block {
    pub passage: Option<PassageSource>,
    pub title: Option<String>,
    pub table_layout: bool,
    pub entries: Vec<Entry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Section {
    pub key: String,
    pub header: Option<String>,
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub sections: Vec<Section>,
}

impl Layout {
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.sections
            .iter()
            .flat_map(|s| &s.blocks)
            .flat_map(|b| &b.entries)
    }

    pub fn number_of(&self, question: QuestionRef) -> Option<u32> {
        self.entries()
            .find(|e| e.question == question)
            .map(|e| e.number)
    }

    pub fn question_count(&self) -> usize {
        self.entries().count()
    }
}

/// Display number of the first question in the set, minus one.
pub fn number_offset(mode: Mode, items: &[Item]) -> u32 {
    let has_grammar = items
        .iter()
        .flat_map(Item::questions)
        .any(|q| q.kind.is_grammar());
    if mode.starts_mid_exam() && has_grammar {
        MID_EXAM_START
    } else {
        0
    }
}

static DEFAULT_PROMPT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PROMPT_IMAGE_PATTERN).expect("valid prompt image pattern"));

pub fn default_prompt_pattern() -> &'static Regex {
    &DEFAULT_PROMPT_PATTERN
}

/// Arrange items into headed sections and number every atomic question.
pub fn build_layout(mode: Mode, items: &[Item], prompt_pattern: &Regex) -> Layout {
    let mut layout = Layout::default();
    let mut number = number_offset(mode, items);

    for (idx, item) in items.iter().enumerate() {
        // A repeated passage joins the previous block even when its title
        // would open a new section.
        if let Item::Passage(group) = item
            && let Some(block) = layout
                .sections
                .last_mut()
                .and_then(|s| s.blocks.last_mut())
                .filter(|b| b.passage.as_ref() == Some(&group.source))
        {
            let entries = passage_entries(idx, group, prompt_pattern, &mut number);
            block.entries.extend(entries);
            continue;
        }

        let (key, header) = section_of(item);
        if layout.sections.last().map(|s| s.key.as_str()) != Some(key.as_str()) {
            layout.sections.push(Section {
                key,
                header,
                blocks: Vec::new(),
            });
        }
        let Some(section) = layout.sections.last_mut() else {
            continue;
        };

        match item {
            Item::Question(_) => {
                number += 1;
                section.blocks.push(Block {
                    passage: None,
                    title: None,
                    table_layout: false,
                    entries: vec![Entry {
                        question: QuestionRef { item: idx, sub: None },
                        number,
                        show_prompt: true,
                    }],
                });
            }
            Item::Passage(group) => {
                let entries = passage_entries(idx, group, prompt_pattern, &mut number);
                section.blocks.push(Block {
                    passage: Some(group.source.clone()),
                    title: group.title.clone(),
                    table_layout: group.table_layout,
                    entries,
                });
            }
        }
    }
    layout
}

fn passage_entries(
    idx: usize,
    group: &PassageGroup,
    prompt_pattern: &Regex,
    number: &mut u32,
) -> Vec<Entry> {
    let show_prompt = match &group.source {
        PassageSource::Image(path) => !prompt_pattern.is_match(path),
        PassageSource::Text(_) => true,
    };
    (0..group.questions.len())
        .map(|sub| {
            *number += 1;
            Entry {
                question: QuestionRef {
                    item: idx,
                    sub: Some(sub),
                },
                number: *number,
                show_prompt,
            }
        })
        .collect()
}

fn section_of(item: &Item) -> (String, Option<String>) {
    match item {
        Item::Question(q) => question_section(q),
        Item::Passage(group) => match &group.source {
            PassageSource::Image(_) => ("photo_reading".to_string(), Some(PHOTO_HEADER.to_string())),
            PassageSource::Text(_) => {
                let title = group.title.clone().unwrap_or_default();
                (format!("text_{title}"), (!title.is_empty()).then_some(title))
            }
        },
    }
}

fn question_section(q: &Question) -> (String, Option<String>) {
    match q.kind {
        QuestionKind::Vocabulary => match q.category {
            Some(c) => (format!("vocabulary_{}", c.to_key()), Some(category_header(c))),
            None => ("vocabulary_misc".to_string(), None),
        },
        QuestionKind::Grammar => ("grammar".to_string(), Some(GRAMMAR_HEADER.to_string())),
        QuestionKind::StarredGrammar => {
            ("grammar_starred".to_string(), Some(STARRED_HEADER.to_string()))
        }
        QuestionKind::Reading => ("reading".to_string(), None),
    }
}

fn category_header(c: Category) -> String {
    format!("問題{}　{}", c.problem_number(), c.instructions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionData;

    fn q(id: &str, kind: QuestionKind, category: Option<Category>) -> Question {
        Question::from_data(
            &QuestionData::new("t", ["a", "b", "c", "d"], 0),
            kind,
            category,
            id.to_string(),
        )
    }

    fn passage(id: &str, source: PassageSource, title: Option<&str>, n: usize) -> Item {
        Item::Passage(PassageGroup {
            id: id.to_string(),
            source,
            title: title.map(str::to_string),
            table_layout: false,
            questions: (0..n)
                .map(|i| q(&format!("{id}_{i}"), QuestionKind::Reading, None))
                .collect(),
        })
    }

    fn grammar_set() -> Vec<Item> {
        vec![
            Item::Question(q("g0", QuestionKind::Grammar, None)),
            Item::Question(q("g1", QuestionKind::Grammar, None)),
            Item::Question(q("s0", QuestionKind::StarredGrammar, None)),
            passage("photo_0", PassageSource::Image("img/3/01.png".to_string()), None, 2),
        ]
    }

    #[test]
    fn grammar_reading_numbers_after_vocabulary() {
        let layout = build_layout(Mode::GrammarReading, &grammar_set(), default_prompt_pattern());
        let numbers: Vec<u32> = layout.entries().map(|e| e.number).collect();
        assert_eq!(numbers, vec![33, 34, 35, 36, 37]);
    }

    #[test]
    fn other_modes_number_from_one() {
        let layout = build_layout(Mode::Combined, &grammar_set(), default_prompt_pattern());
        assert_eq!(layout.entries().next().map(|e| e.number), Some(1));
    }

    #[test]
    fn reading_only_set_numbers_from_one_even_mid_exam() {
        let items = vec![passage("photo_0", PassageSource::Image("a/1.png".to_string()), None, 3)];
        let layout = build_layout(Mode::GrammarReading, &items, default_prompt_pattern());
        assert_eq!(layout.number_of(QuestionRef { item: 0, sub: Some(2) }), Some(3));
    }

    #[test]
    fn sections_follow_kind_changes_with_headers() {
        let items = vec![
            Item::Question(q("v0", QuestionKind::Vocabulary, Some(Category::Reading))),
            Item::Question(q("v1", QuestionKind::Vocabulary, Some(Category::Reading))),
            Item::Question(q("v2", QuestionKind::Vocabulary, Some(Category::Usage))),
        ];
        let mut all = items;
        all.extend(grammar_set());
        let layout = build_layout(Mode::Combined, &all, default_prompt_pattern());
        let keys: Vec<&str> = layout.sections.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "vocabulary_reading",
                "vocabulary_usage",
                "grammar",
                "grammar_starred",
                "photo_reading"
            ]
        );
        assert!(layout.sections[0].header.as_deref().is_some_and(|h| h.starts_with("問題1")));
        assert!(layout.sections[1].header.as_deref().is_some_and(|h| h.starts_with("問題6")));
        assert_eq!(layout.sections[2].header.as_deref(), Some(GRAMMAR_HEADER));
        assert_eq!(layout.sections[3].header.as_deref(), Some(STARRED_HEADER));
        assert_eq!(layout.question_count(), 8);
    }

    #[test]
    fn zero_padded_images_hide_prompts() {
        let items = vec![
            passage("a", PassageSource::Image("img/3/01.PNG".to_string()), None, 1),
            passage("b", PassageSource::Image("img/3/12.png".to_string()), None, 1),
        ];
        let layout = build_layout(Mode::MockTest, &items, default_prompt_pattern());
        let prompts: Vec<bool> = layout.entries().map(|e| e.show_prompt).collect();
        assert_eq!(prompts, vec![false, true]);
    }

    #[test]
    fn repeated_passage_text_merges_into_one_block() {
        let text = PassageSource::Text("同じ本文".to_string());
        let items = vec![
            passage("t0", text.clone(), Some("3 内容理解"), 1),
            passage("t1", text.clone(), Some("3 内容理解"), 2),
            passage("t2", PassageSource::Text("別".to_string()), Some("3 内容理解"), 1),
        ];
        let layout = build_layout(Mode::ReadingDrill, &items, default_prompt_pattern());
        assert_eq!(layout.sections.len(), 1);
        let blocks = &layout.sections[0].blocks;
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].entries.len(), 3);
        let numbers: Vec<u32> = blocks[0].entries.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(layout.sections[0].header.as_deref(), Some("3 内容理解"));
    }

    #[test]
    fn new_title_opens_new_section() {
        let items = vec![
            passage("t0", PassageSource::Text("x".to_string()), Some("1 短文"), 1),
            passage("t1", PassageSource::Text("y".to_string()), Some("2 短文"), 1),
        ];
        let layout = build_layout(Mode::ReadingDrill, &items, default_prompt_pattern());
        assert_eq!(layout.sections.len(), 2);
        assert_eq!(layout.sections[1].blocks[0].entries[0].number, 2);
    }

    #[test]
    fn shared_passage_merges_across_titles() {
        let body = PassageSource::Text("same body".to_string());
        let items = vec![
            passage("t0", body.clone(), Some("1 A"), 1),
            passage("t1", body.clone(), Some("2 B"), 2),
        ];
        let layout = build_layout(Mode::ReadingDrill, &items, default_prompt_pattern());
        let blocks: Vec<&Block> = layout.sections.iter().flat_map(|s| &s.blocks).collect();
        assert_eq!(layout.sections.len(), 1);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].title.as_deref(), Some("1 A"));
        let numbers: Vec<u32> = blocks[0].entries.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn custom_pattern_is_honored() {
        let items = vec![passage("a", PassageSource::Image("img/q.jpg".to_string()), None, 1)];
        let pattern = Regex::new(r"q\.jpg$").unwrap();
        let layout = build_layout(Mode::MockTest, &items, &pattern);
        assert!(!layout.entries().next().unwrap().show_prompt);
    }
}
