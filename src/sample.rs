//! Deterministic synthetic question bank.
//!
//! Produces every bank file with enough material for each mode: structured
//! chapters, flat pools that classify into all six vocabulary categories,
//! photo passages (some with the prompt baked into the image) and text
//! passages for each drill band.

use std::path::Path;

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::DataError;
use crate::model::category::Category;
use crate::model::pools::{
    Pools, RawPhotoPassage, RawTextPassage, RawVocabularyChapter, normalize_grammar_chapters,
    normalize_photo_passages, normalize_questions, normalize_text_passages,
    normalize_vocabulary_chapters,
};
use crate::model::question::{AnswerKey, OPTION_COUNT, RawQuestion};
use crate::store::json_store::{BankFiles, JsonStore};

pub const DEFAULT_CHAPTERS: usize = 5;
pub const DEFAULT_SEED: u64 = 42;

const REGULAR_GRAMMAR_PER_CHAPTER: usize = 12;
const STARRED_GRAMMAR_PER_CHAPTER: usize = 5;
const PASSAGES_PER_BAND: usize = 2;

const DRILL_KINDS: [&str; 6] = [
    "内容理解（短文）",
    "内容理解（中文）",
    "内容理解（長文）",
    "統合理解",
    "主張理解",
    "情報検索",
];

struct Template {
    options: [&'static str; OPTION_COUNT],
    prompt: fn(usize) -> String,
}

fn template(category: Category) -> Template {
    match category {
        Category::Reading => Template {
            options: ["かんじ", "かんし", "がんじ", "かんぢ"],
            prompt: |n| format!("この<u>漢字</u>は難しい。［{n}］"),
        },
        Category::Writing => Template {
            options: ["漢字", "感じ", "幹事", "監事"],
            prompt: |n| format!("会の<u>かんじ</u>を決める。［{n}］"),
        },
        Category::Formation => Template {
            options: ["不", "無", "非", "未"],
            prompt: |n| format!("（　）完成の作品が{n}点ある。"),
        },
        Category::Context => Template {
            options: ["しっかり", "うっかり", "すっかり", "がっかり"],
            prompt: |n| format!("{n}回目なので（　）準備した。"),
        },
        Category::Paraphrase => Template {
            options: ["準備", "用意", "支度", "手配"],
            prompt: |n| format!("旅行の<u>下準備</u>をする。［{n}］"),
        },
        Category::Usage => Template {
            options: [
                "毎朝、手配をしてから出かける。",
                "ホテルの手配を済ませた。",
                "手配が明るい部屋だ。",
                "手配に水をあげる。",
            ],
            prompt: |n| format!("手配［{n}］"),
        },
    }
}

fn answer<R: Rng>(options: &[&str; OPTION_COUNT], rng: &mut R) -> AnswerKey {
    let index = rng.gen_range(0..OPTION_COUNT);
    // Some records carry the literal option text instead of an index.
    if rng.gen_bool(0.25) {
        AnswerKey::Literal(options[index].to_string())
    } else {
        AnswerKey::Index(index as i64)
    }
}

fn vocabulary_question<R: Rng>(category: Category, n: usize, rng: &mut R) -> RawQuestion {
    let t = template(category);
    RawQuestion::new(&(t.prompt)(n), t.options, answer(&t.options, rng))
}

fn grammar_question<R: Rng>(n: usize, rng: &mut R) -> RawQuestion {
    let options = ["降れば", "降ったら", "降るなら", "降っても"];
    let prompt = format!("雨が（　）、試合は中止になる。［{n}］");
    RawQuestion::new(&prompt, options, answer(&options, rng))
}

fn starred_question<R: Rng>(n: usize, rng: &mut R) -> RawQuestion {
    let options = ["いつも", "約束を", "守る", "必ず"];
    let prompt = format!("彼は ＿＿ ＿＿ ★ ＿＿ 人だ。［{n}］");
    RawQuestion::new(&prompt, options, answer(&options, rng))
}

fn reading_question<R: Rng>(n: usize, rng: &mut R) -> RawQuestion {
    let options = ["賛成している", "反対している", "迷っている", "関心がない"];
    let prompt = format!("筆者の考えに合うのはどれか。［{n}］");
    RawQuestion::new(&prompt, options, answer(&options, rng))
}

/// Build a bank with `chapters` structured chapters.
pub fn generate_bank(chapters: usize, seed: u64) -> BankFiles {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut bank = BankFiles::default();
    let mut n = 0;
    let mut next = || {
        n += 1;
        n
    };

    for category in Category::ALL {
        for _ in 0..category.exam_count() * chapters.max(1) {
            bank.vocabulary.push(vocabulary_question(category, next(), &mut rng));
        }
    }

    for _ in 0..chapters {
        let mut chapter = RawVocabularyChapter::new();
        for category in Category::ALL {
            let questions = (0..category.exam_count())
                .map(|_| vocabulary_question(category, next(), &mut rng))
                .collect();
            chapter.insert(category, questions);
        }
        bank.vocabulary_chapters.push(chapter);

        let mut grammar: Vec<RawQuestion> = (0..REGULAR_GRAMMAR_PER_CHAPTER)
            .map(|_| grammar_question(next(), &mut rng))
            .collect();
        grammar.extend((0..STARRED_GRAMMAR_PER_CHAPTER).map(|_| starred_question(next(), &mut rng)));
        bank.grammar_chapters.push(grammar);
    }

    for _ in 0..REGULAR_GRAMMAR_PER_CHAPTER * chapters.max(1) {
        bank.grammar.push(grammar_question(next(), &mut rng));
    }
    for _ in 0..STARRED_GRAMMAR_PER_CHAPTER * chapters.max(1) {
        bank.grammar_starred.push(starred_question(next(), &mut rng));
    }

    for ch in 1..=chapters {
        // Odd chapters use zero-padded file names, whose images carry the prompt.
        let image = if ch % 2 == 1 {
            format!("images/dokkai/{ch}/0{ch}.png")
        } else {
            format!("images/dokkai/{ch}/page{ch}.jpg")
        };
        let questions = (0..2 + ch % 2).map(|_| reading_question(next(), &mut rng)).collect();
        bank.photo_passages.push(RawPhotoPassage { image, questions });
    }

    for (band, kind) in DRILL_KINDS.iter().enumerate() {
        let numeral = band + 1;
        for k in 1..=PASSAGES_PER_BAND {
            // Integrated-comprehension passages share one text between sets.
            let text = if numeral == 4 {
                "AとBの意見を読んで、後の問いに答えなさい。".to_string()
            } else {
                format!("{kind}の本文 その{k}。")
            };
            let questions = (0..2).map(|_| reading_question(next(), &mut rng)).collect();
            bank.text_passages.push(RawTextPassage {
                title: format!("{numeral} {kind} {k}番"),
                text,
                questions,
            });
        }
    }

    bank
}

/// Normalized pools for the generated bank, without touching disk.
pub fn sample_pools(chapters: usize, seed: u64) -> Result<Pools, DataError> {
    let bank = generate_bank(chapters, seed);
    Ok(Pools {
        vocabulary: normalize_questions(bank.vocabulary, "vocabulary")?,
        vocabulary_chapters: normalize_vocabulary_chapters(
            bank.vocabulary_chapters,
            "vocabulary_chapters",
        )?,
        grammar: normalize_questions(bank.grammar, "grammar")?,
        grammar_starred: normalize_questions(bank.grammar_starred, "grammar_starred")?,
        grammar_chapters: normalize_grammar_chapters(bank.grammar_chapters, "grammar_chapters")?,
        photo_passages: normalize_photo_passages(bank.photo_passages, "photo_passages")?,
        text_passages: normalize_text_passages(bank.text_passages, "text_passages")?,
    })
}

/// Write the generated bank into `dir`.
pub fn write_bank(dir: &Path, chapters: usize, seed: u64) -> Result<JsonStore> {
    let store = JsonStore::with_base_dir(dir.to_path_buf())?;
    store.save_bank(&generate_bank(chapters, seed))?;
    Ok(store)
}
