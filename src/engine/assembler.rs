use rand::rngs::SmallRng;

use crate::engine::classifier::{self, FORMATION_MAX_MEAN_LEN};
use crate::engine::ids::IdGenerator;
use crate::engine::mode::{Chapter, Mode};
use crate::engine::sampler::{pick_index, sample, shuffled};
use crate::model::category::Category;
use crate::model::item::{Item, PassageGroup, PassageSource, Question, QuestionKind};
use crate::model::pools::{PhotoPassage, Pools, TextPassage};
use crate::model::question::QuestionData;

/// Regular grammar items in one sitting; anything after them in a chapter
/// is a starred (sentence ordering) item.
pub const GRAMMAR_REGULAR_COUNT: usize = 12;
pub const GRAMMAR_STARRED_COUNT: usize = 5;
pub const DRILL_RANDOM_COUNT: usize = 10;

/// Title numerals grouped for a full reading drill, in presentation order.
pub const DRILL_BANDS: &[&[u32]] = &[&[1, 2], &[3, 4], &[5], &[6]];

#[derive(Clone, Debug)]
pub struct AssemblyOptions {
    pub formation_max_mean_len: f64,
    pub drill_random_count: usize,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            formation_max_mean_len: FORMATION_MAX_MEAN_LEN,
            drill_random_count: DRILL_RANDOM_COUNT,
        }
    }
}

/// Builds the ordered item sequence for a session from the loaded pools.
///
/// Chapter-indexed modes only read the pools, so they produce the same
/// content every time; the mock test and random drills draw from `rng`.
/// Sections are always emitted vocabulary, then grammar, then reading.
pub struct Assembler<'a> {
    pools: &'a Pools,
    options: AssemblyOptions,
    rng: SmallRng,
    ids: IdGenerator,
}

impl<'a> Assembler<'a> {
    pub fn new(pools: &'a Pools, rng: SmallRng) -> Self {
        Self::with_options(pools, AssemblyOptions::default(), rng)
    }

    pub fn with_options(pools: &'a Pools, options: AssemblyOptions, rng: SmallRng) -> Self {
        Self {
            pools,
            options,
            rng,
            ids: IdGenerator::new(),
        }
    }

    pub fn assemble(&mut self, mode: Mode, chapter: Chapter) -> Vec<Item> {
        self.ids = IdGenerator::new();
        let mut items = Vec::new();

        match mode {
            Mode::MockTest => {
                self.mock_vocabulary(&mut items);
                self.mock_grammar(&mut items);
                self.mock_reading(&mut items);
            }
            Mode::ReadingDrill => self.reading_drill(chapter, &mut items),
            Mode::PhotoReadingFull => self.photo_reading_full(&mut items),
            Mode::Vocabulary | Mode::GrammarReading | Mode::Combined | Mode::Study => {
                if mode.has_chapter_vocabulary() {
                    self.chapter_vocabulary(chapter, &mut items);
                }
                if mode.has_chapter_grammar() {
                    self.chapter_grammar(chapter, &mut items);
                    self.chapter_reading(chapter, &mut items);
                }
            }
        }

        tracing::debug!(
            %mode,
            %chapter,
            items = items.len(),
            questions = items.iter().map(Item::question_count).sum::<usize>(),
            "assembled question set"
        );
        items
    }

    fn question(
        &mut self,
        data: &QuestionData,
        kind: QuestionKind,
        category: Option<Category>,
        index: usize,
    ) -> Question {
        let id = self.ids.fresh(kind.as_str(), index, &mut self.rng);
        Question::from_data(data, kind, category, id)
    }

    // --- Vocabulary ---

    fn chapter_vocabulary(&mut self, chapter: Chapter, items: &mut Vec<Item>) {
        let pools = self.pools;
        let Some(idx) = chapter.index() else {
            tracing::debug!(%chapter, "vocabulary needs a numbered chapter");
            return;
        };

        if !pools.vocabulary_chapters.is_empty() {
            let Some(data) = pools.vocabulary_chapters.get(idx) else {
                tracing::debug!(%chapter, "no structured vocabulary for chapter");
                return;
            };
            for category in Category::ALL {
                for (i, q) in data.get(&category).into_iter().flatten().enumerate() {
                    let question = self.question(q, QuestionKind::Vocabulary, Some(category), i);
                    items.push(Item::Question(question));
                }
            }
            return;
        }

        let flat = &pools.vocabulary;
        for category in Category::ALL {
            let count = category.exam_count();
            let start = category.flat_pool_offset() + idx * count;
            if start >= flat.len() {
                continue;
            }
            let end = (start + count).min(flat.len());
            for (i, q) in flat[start..end].iter().enumerate() {
                let question = self.question(q, QuestionKind::Vocabulary, Some(category), i);
                items.push(Item::Question(question));
            }
        }
    }

    fn mock_vocabulary(&mut self, items: &mut Vec<Item>) {
        let pools = self.pools;
        let buckets =
            classifier::classify_with(&pools.vocabulary, self.options.formation_max_mean_len);
        for category in Category::ALL {
            let bucket = buckets.get(&category).map(Vec::as_slice).unwrap_or_default();
            if bucket.len() < category.exam_count() {
                tracing::debug!(
                    category = category.to_key(),
                    available = bucket.len(),
                    "vocabulary bucket smaller than target"
                );
            }
            let picked = sample(bucket, category.exam_count(), &mut self.rng);
            for (i, q) in picked.into_iter().enumerate() {
                let question = self.question(q, QuestionKind::Vocabulary, Some(category), i);
                items.push(Item::Question(question));
            }
        }
    }

    // --- Grammar ---

    fn chapter_grammar(&mut self, chapter: Chapter, items: &mut Vec<Item>) {
        let pools = self.pools;
        let Some(data) = chapter.index().and_then(|idx| pools.grammar_chapters.get(idx)) else {
            tracing::debug!(%chapter, "no grammar for chapter");
            return;
        };
        for (i, q) in data.iter().enumerate() {
            let kind = if i < GRAMMAR_REGULAR_COUNT {
                QuestionKind::Grammar
            } else {
                QuestionKind::StarredGrammar
            };
            let question = self.question(q, kind, None, i);
            items.push(Item::Question(question));
        }
    }

    fn mock_grammar(&mut self, items: &mut Vec<Item>) {
        let pools = self.pools;
        let regular = sample(&pools.grammar, GRAMMAR_REGULAR_COUNT, &mut self.rng);
        for (i, q) in regular.iter().enumerate() {
            let question = self.question(q, QuestionKind::Grammar, None, i);
            items.push(Item::Question(question));
        }
        let starred = sample(&pools.grammar_starred, GRAMMAR_STARRED_COUNT, &mut self.rng);
        for (i, q) in starred.iter().enumerate() {
            let question =
                self.question(q, QuestionKind::StarredGrammar, None, GRAMMAR_REGULAR_COUNT + i);
            items.push(Item::Question(question));
        }
    }

    // --- Reading ---

    fn chapter_reading(&mut self, chapter: Chapter, items: &mut Vec<Item>) {
        let pools = self.pools;
        if let Some((idx, passage)) = chapter
            .index()
            .and_then(|idx| pools.photo_passages.get(idx).map(|p| (idx, p)))
        {
            items.push(self.photo_group(idx, passage, None));
        }
    }

    fn mock_reading(&mut self, items: &mut Vec<Item>) {
        let pools = self.pools;
        match pick_index(pools.photo_passages.len(), &mut self.rng) {
            Some(idx) => items.push(self.photo_group(idx, &pools.photo_passages[idx], None)),
            None => tracing::debug!("photo passage pool is empty"),
        }
    }

    fn photo_reading_full(&mut self, items: &mut Vec<Item>) {
        let pools = self.pools;
        for (idx, passage) in pools.photo_passages.iter().enumerate() {
            let title = format!("Set {}", idx + 1);
            items.push(self.photo_group(idx, passage, Some(title)));
        }
    }

    fn reading_drill(&mut self, chapter: Chapter, items: &mut Vec<Item>) {
        let pools = self.pools;
        let all: Vec<&TextPassage> = pools.text_passages.iter().collect();

        let selected: Vec<&TextPassage> = match chapter {
            Chapter::Random => sample(&all, self.options.drill_random_count, &mut self.rng),
            Chapter::Full => {
                let mut banded = Vec::with_capacity(all.len());
                for band in DRILL_BANDS {
                    let members: Vec<&TextPassage> = all
                        .iter()
                        .copied()
                        .filter(|p| p.leading_number().is_some_and(|n| band.contains(&n)))
                        .collect();
                    banded.extend(shuffled(&members, &mut self.rng));
                }
                if banded.len() < all.len() {
                    tracing::debug!(
                        skipped = all.len() - banded.len(),
                        "passages outside the drill bands"
                    );
                }
                banded
            }
            Chapter::Number(n) => all.into_iter().filter(|p| p.in_chapter(n)).collect(),
        };

        for (idx, passage) in selected.into_iter().enumerate() {
            items.push(self.text_group(chapter, idx, passage));
        }
    }

    fn photo_group(&mut self, idx: usize, passage: &PhotoPassage, title: Option<String>) -> Item {
        let id = self.ids.positional(format!("photo_{idx}"));
        let questions = passage
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let sub_id = self.ids.positional(format!("{id}_{i}"));
                Question::from_data(q, QuestionKind::Reading, None, sub_id)
            })
            .collect();
        Item::Passage(PassageGroup {
            id,
            source: PassageSource::Image(passage.image.clone()),
            title,
            table_layout: false,
            questions,
        })
    }

    fn text_group(&mut self, chapter: Chapter, idx: usize, passage: &TextPassage) -> Item {
        let id = self.ids.positional(format!("text_{chapter}_{idx}"));
        let questions = passage
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let sub_id = self.ids.positional(format!("{id}_{i}"));
                Question::from_data(q, QuestionKind::Reading, None, sub_id)
            })
            .collect();
        Item::Passage(PassageGroup {
            id,
            source: PassageSource::Text(passage.text.clone()),
            title: Some(passage.title.clone()),
            table_layout: passage.is_table_layout(),
            questions,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use rand::SeedableRng;

    use super::*;
    use crate::model::category::exam_vocabulary_total;
    use crate::model::item::flatten;

    fn data(text: &str) -> QuestionData {
        QuestionData::new(text, ["一", "二", "三", "四"], 0)
    }

    fn text_passage(title: &str) -> TextPassage {
        TextPassage {
            title: title.to_string(),
            text: format!("{title} 本文"),
            questions: vec![data("問1"), data("問2")],
        }
    }

    fn chapter_pools() -> Pools {
        let mut vocabulary_chapters = Vec::new();
        for ch in 0..3 {
            let mut chapter = BTreeMap::new();
            for category in Category::ALL {
                let qs = (0..category.exam_count())
                    .map(|i| data(&format!("{}-{ch}-{i}", category.to_key())))
                    .collect();
                chapter.insert(category, qs);
            }
            vocabulary_chapters.push(chapter);
        }
        Pools {
            vocabulary_chapters,
            grammar_chapters: (0..3)
                .map(|ch| (0..17).map(|i| data(&format!("g-{ch}-{i}"))).collect())
                .collect(),
            photo_passages: (0..3)
                .map(|ch| PhotoPassage {
                    image: format!("data/photo/{ch}1.png"),
                    questions: vec![data("p1"), data("p2"), data("p3")],
                })
                .collect(),
            ..Pools::default()
        }
    }

    fn assembler(pools: &Pools) -> Assembler<'_> {
        Assembler::new(pools, SmallRng::seed_from_u64(11))
    }

    #[test]
    fn vocabulary_chapter_follows_category_order() {
        let pools = chapter_pools();
        let items = assembler(&pools).assemble(Mode::Vocabulary, Chapter::Number(2));
        assert_eq!(items.len(), exam_vocabulary_total());
        let categories: Vec<Category> = items
            .iter()
            .filter_map(|i| match i {
                Item::Question(q) => q.category,
                Item::Passage(_) => None,
            })
            .collect();
        let mut deduped = categories.clone();
        deduped.dedup();
        assert_eq!(deduped, Category::ALL.to_vec());
        match &items[0] {
            Item::Question(q) => assert_eq!(q.text, "reading-1-0"),
            Item::Passage(_) => panic!("expected a question"),
        }
    }

    #[test]
    fn flat_vocabulary_fallback_uses_offsets() {
        let pools = Pools {
            vocabulary: (0..440).map(|i| data(&i.to_string())).collect(),
            ..Pools::default()
        };
        let items = assembler(&pools).assemble(Mode::Vocabulary, Chapter::Number(2));
        let texts: Vec<&str> = items
            .iter()
            .flat_map(Item::questions)
            .map(|q| q.text.as_str())
            .collect();
        assert_eq!(&texts[..5], &["5", "6", "7", "8", "9"]);
        assert_eq!(&texts[5..10], &["80", "81", "82", "83", "84"]);
        // context: 225 + 7
        assert_eq!(texts[15], "232");
        // usage starts at 410, pool ends at 440: full slice
        assert_eq!(texts.last(), Some(&"414"));
        assert_eq!(texts.len(), exam_vocabulary_total());
    }

    #[test]
    fn flat_fallback_tolerates_short_pool() {
        let pools = Pools {
            vocabulary: (0..153).map(|i| data(&i.to_string())).collect(),
            ..Pools::default()
        };
        let items = assembler(&pools).assemble(Mode::Vocabulary, Chapter::Number(1));
        // reading 0..5, writing 75..80, formation 150..153
        assert_eq!(items.len(), 13);
    }

    #[test]
    fn chapter_out_of_range_degrades_to_empty() {
        let pools = chapter_pools();
        let items = assembler(&pools).assemble(Mode::Combined, Chapter::Number(9));
        assert!(items.is_empty());
    }

    #[test]
    fn combined_orders_vocabulary_grammar_reading() {
        let pools = chapter_pools();
        let items = assembler(&pools).assemble(Mode::Combined, Chapter::Number(1));
        let vocabulary = exam_vocabulary_total();
        assert_eq!(items.len(), vocabulary + 17 + 1);
        let kinds: Vec<QuestionKind> = flatten(&items).map(|(_, q)| q.kind).collect();
        let first_grammar = kinds.iter().position(|k| k.is_grammar()).unwrap();
        let first_reading = kinds.iter().position(|k| *k == QuestionKind::Reading).unwrap();
        assert_eq!(first_grammar, vocabulary);
        assert_eq!(first_reading, vocabulary + 17);
        assert!(matches!(items.last(), Some(Item::Passage(_))));
    }

    fn short_mock_pools() -> Pools {
        fn with(text: String, options: [&str; 4]) -> QuestionData {
            QuestionData::new(&text, options, 0)
        }
        let mut vocabulary = Vec::new();
        for i in 0..10 {
            vocabulary.push(with(format!("<u>漢字</u>{i}"), ["かんじ", "かじ", "かんし", "がんじ"]));
            vocabulary.push(with(format!("<u>かんじ</u>{i}"), ["漢字", "感じ", "幹事", "監事"]));
            vocabulary.push(with(format!("会議の（　）{i}"), ["段取り", "手続き", "見込み", "日程表"]));
            vocabulary.push(with(format!("<u>大切{i}</u>な話"), ["重要", "簡単", "有名", "特別"]));
        }
        for i in 0..2 {
            vocabulary.push(with(format!("合理（　）{i}"), ["的", "性", "化", "式"]));
        }
        Pools {
            vocabulary,
            grammar: (0..7).map(|i| data(&format!("g{i}"))).collect(),
            grammar_starred: (0..3).map(|i| data(&format!("s{i}"))).collect(),
            ..Pools::default()
        }
    }

    #[test]
    fn mock_test_shrinks_only_where_pools_run_short() {
        let pools = short_mock_pools();
        let items = assembler(&pools).assemble(Mode::MockTest, Chapter::Random);
        let count = |category: Category| {
            items
                .iter()
                .filter(|i| matches!(i, Item::Question(q) if q.category == Some(category)))
                .count()
        };
        assert_eq!(count(Category::Reading), 5);
        assert_eq!(count(Category::Writing), 5);
        assert_eq!(count(Category::Formation), 2);
        assert_eq!(count(Category::Context), 7);
        assert_eq!(count(Category::Paraphrase), 5);
        assert_eq!(count(Category::Usage), 0);

        let kinds: Vec<QuestionKind> = flatten(&items).map(|(_, q)| q.kind).collect();
        assert_eq!(kinds.iter().filter(|k| **k == QuestionKind::Grammar).count(), 7);
        assert_eq!(kinds.iter().filter(|k| **k == QuestionKind::StarredGrammar).count(), 3);
        assert!(items.iter().all(|i| i.as_passage().is_none()));
    }

    #[test]
    fn chapter_grammar_marks_items_after_twelve_as_starred() {
        let pools = chapter_pools();
        let items = assembler(&pools).assemble(Mode::GrammarReading, Chapter::Number(1));
        let kinds: Vec<QuestionKind> = items
            .iter()
            .filter_map(|i| match i {
                Item::Question(q) => Some(q.kind),
                Item::Passage(_) => None,
            })
            .collect();
        assert_eq!(kinds.len(), 17);
        assert!(kinds[..12].iter().all(|k| *k == QuestionKind::Grammar));
        assert!(kinds[12..].iter().all(|k| *k == QuestionKind::StarredGrammar));
    }

    #[test]
    fn chapter_modes_are_deterministic() {
        let pools = chapter_pools();
        let a = Assembler::new(&pools, SmallRng::seed_from_u64(1))
            .assemble(Mode::Vocabulary, Chapter::Number(3));
        let b = Assembler::new(&pools, SmallRng::seed_from_u64(2))
            .assemble(Mode::Vocabulary, Chapter::Number(3));
        assert_eq!(a.len(), b.len());
        assert!(a.iter().zip(&b).all(|(x, y)| x.same_content(y)));
    }

    #[test]
    fn ids_are_unique_and_answers_start_empty() {
        let pools = chapter_pools();
        let items = assembler(&pools).assemble(Mode::Combined, Chapter::Number(1));
        let mut ids = HashSet::new();
        for item in &items {
            assert!(ids.insert(item.id().to_string()));
            if let Item::Passage(p) = item {
                for q in &p.questions {
                    assert!(ids.insert(q.id.clone()));
                }
            }
        }
        assert!(flatten(&items).all(|(_, q)| q.user_answer.is_none()));
    }

    #[test]
    fn photo_reading_full_titles_sets() {
        let pools = chapter_pools();
        let items = assembler(&pools).assemble(Mode::PhotoReadingFull, Chapter::Number(1));
        let titles: Vec<Option<&str>> = items
            .iter()
            .map(|i| i.as_passage().and_then(|p| p.title.as_deref()))
            .collect();
        assert_eq!(titles, vec![Some("Set 1"), Some("Set 2"), Some("Set 3")]);
    }

    #[test]
    fn reading_drill_filters_by_title_prefix() {
        let pools = Pools {
            text_passages: vec![
                text_passage("1 内容理解 1番"),
                text_passage("2 内容理解 1番"),
                text_passage("1 内容理解 2番"),
                text_passage("12 統合"),
            ],
            ..Pools::default()
        };
        let items = assembler(&pools).assemble(Mode::ReadingDrill, Chapter::Number(1));
        let titles: Vec<&str> = items
            .iter()
            .filter_map(|i| i.as_passage().and_then(|p| p.title.as_deref()))
            .collect();
        assert_eq!(titles, vec!["1 内容理解 1番", "1 内容理解 2番"]);
    }

    #[test]
    fn reading_drill_random_draws_ten() {
        let pools = Pools {
            text_passages: (0..25).map(|i| text_passage(&format!("{} 題 {i}", i % 6 + 1))).collect(),
            ..Pools::default()
        };
        let items = assembler(&pools).assemble(Mode::ReadingDrill, Chapter::Random);
        assert_eq!(items.len(), DRILL_RANDOM_COUNT);
    }

    #[test]
    fn reading_drill_full_keeps_band_order() {
        let titles = ["6 情報検索", "5 統合", "1 内容", "4 主張", "2 内容", "3 主張", "7 その他"];
        let pools = Pools {
            text_passages: titles.iter().map(|t| text_passage(t)).collect(),
            ..Pools::default()
        };
        let items = assembler(&pools).assemble(Mode::ReadingDrill, Chapter::Full);
        let numbers: Vec<u32> = items
            .iter()
            .filter_map(|i| i.as_passage())
            .filter_map(|p| p.title.as_deref())
            .map(|t| t.split(' ').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(numbers.len(), 6);
        let band_of = |n: u32| DRILL_BANDS.iter().position(|b| b.contains(&n)).unwrap();
        let bands: Vec<usize> = numbers.iter().map(|&n| band_of(n)).collect();
        assert_eq!(bands, vec![0, 0, 1, 1, 2, 3]);
        assert!(items.last().unwrap().as_passage().unwrap().table_layout);
    }

    #[test]
    fn missing_pools_produce_empty_sets() {
        let pools = Pools::default();
        for &mode in Mode::all() {
            for chapter in [Chapter::Number(1), Chapter::Random, Chapter::Full] {
                assert!(assembler(&pools).assemble(mode, chapter).is_empty());
            }
        }
    }
}
