use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use shiken::engine::assembler::Assembler;
use shiken::engine::classifier::classify;
use shiken::engine::mode::{Chapter, Mode};
use shiken::engine::sampler::sample;
use shiken::model::category::{Category, exam_vocabulary_total};
use shiken::model::item::{Item, PassageGroup, PassageSource, Question, QuestionKind};
use shiken::model::question::QuestionData;
use shiken::sample::sample_pools;
use shiken::session::layout::{build_layout, default_prompt_pattern};
use shiken::session::report::{SessionReport, collect_incorrect, compute_totals};
use shiken::session::state::SessionState;

fn question(id: &str, kind: QuestionKind, category: Option<Category>, correct: usize) -> Question {
    Question::from_data(
        &QuestionData::new("問題文", ["一", "二", "三", "四"], correct),
        kind,
        category,
        id.to_string(),
    )
}

fn count_kind(items: &[Item], kind: QuestionKind) -> usize {
    items
        .iter()
        .filter_map(|item| match item {
            Item::Question(q) if q.kind == kind => Some(()),
            _ => None,
        })
        .count()
}

#[test]
fn mock_test_has_exam_proportions() {
    let pools = sample_pools(3, 11).unwrap();
    let mut assembler = Assembler::new(&pools, SmallRng::seed_from_u64(1));
    let items = assembler.assemble(Mode::MockTest, Chapter::Random);

    assert_eq!(count_kind(&items, QuestionKind::Vocabulary), exam_vocabulary_total());
    assert_eq!(
        count_kind(&items, QuestionKind::Grammar) + count_kind(&items, QuestionKind::StarredGrammar),
        17
    );
    assert_eq!(count_kind(&items, QuestionKind::StarredGrammar), 5);
    assert_eq!(items.iter().filter(|i| i.as_passage().is_some()).count(), 1);

    let per_category = |c: Category| {
        items
            .iter()
            .filter(|i| matches!(i, Item::Question(q) if q.category == Some(c)))
            .count()
    };
    for category in Category::ALL {
        assert_eq!(per_category(category), category.exam_count(), "{category:?}");
    }
}

#[test]
fn sections_are_ordered_vocabulary_grammar_reading() {
    let pools = sample_pools(3, 11).unwrap();
    let mut assembler = Assembler::new(&pools, SmallRng::seed_from_u64(2));
    let items = assembler.assemble(Mode::Combined, Chapter::Number(2));

    let rank = |item: &Item| match item {
        Item::Question(q) if q.kind == QuestionKind::Vocabulary => 0,
        Item::Question(_) => 1,
        Item::Passage(_) => 2,
    };
    let ranks: Vec<u8> = items.iter().map(rank).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    assert!(ranks.contains(&0) && ranks.contains(&1) && ranks.contains(&2));
}

#[test]
fn grammar_reading_starts_at_question_33() {
    let pools = sample_pools(3, 11).unwrap();
    let mut assembler = Assembler::new(&pools, SmallRng::seed_from_u64(3));
    let items = assembler.assemble(Mode::GrammarReading, Chapter::Number(1));
    let layout = build_layout(Mode::GrammarReading, &items, default_prompt_pattern());

    let numbers: Vec<u32> = layout.entries().map(|e| e.number).collect();
    assert_eq!(numbers.first(), Some(&33));
    let expected: Vec<u32> = (33..33 + numbers.len() as u32).collect();
    assert_eq!(numbers, expected);
}

#[test]
fn chapter_vocabulary_is_deterministic() {
    let pools = sample_pools(4, 11).unwrap();
    let a = Assembler::new(&pools, SmallRng::seed_from_u64(1)).assemble(Mode::Vocabulary, Chapter::Number(3));
    let b = Assembler::new(&pools, SmallRng::seed_from_u64(99)).assemble(Mode::Vocabulary, Chapter::Number(3));

    assert_eq!(a.len(), exam_vocabulary_total());
    assert_eq!(a.len(), b.len());
    assert!(a.iter().zip(&b).all(|(x, y)| x.same_content(y)));
}

#[test]
fn out_of_range_chapter_degrades_to_empty() {
    let pools = sample_pools(2, 11).unwrap();
    let mut assembler = Assembler::new(&pools, SmallRng::seed_from_u64(4));
    assert!(assembler.assemble(Mode::GrammarReading, Chapter::Number(40)).is_empty());
}

#[test]
fn ids_are_unique_within_a_set() {
    let pools = sample_pools(3, 11).unwrap();
    let mut assembler = Assembler::new(&pools, SmallRng::seed_from_u64(5));
    let items = assembler.assemble(Mode::MockTest, Chapter::Random);
    let ids: Vec<&str> = items
        .iter()
        .flat_map(|i| i.questions())
        .map(|q| q.id.as_str())
        .collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
}

#[test]
fn classification_partitions_the_pool() {
    let pools = sample_pools(3, 11).unwrap();
    let buckets = classify(&pools.vocabulary);
    assert_eq!(buckets.len(), 6);
    let total: usize = buckets.values().map(Vec::len).sum();
    assert_eq!(total, pools.vocabulary.len());
}

#[test]
fn sampling_returns_distinct_members() {
    let list: Vec<u32> = (0..20).collect();
    let mut rng = SmallRng::seed_from_u64(6);
    for n in [0, 5, 20, 50] {
        let picked = sample(&list, n, &mut rng);
        assert_eq!(picked.len(), n.min(list.len()));
        let unique: HashSet<u32> = picked.iter().copied().collect();
        assert_eq!(unique.len(), picked.len());
        assert!(picked.iter().all(|x| list.contains(x)));
    }
}

/// Six vocabulary questions, two grammar questions and one passage with two
/// sub-questions; everything right except one grammar item and one sub-question.
#[test]
fn end_to_end_scoring_and_review() {
    let mut items: Vec<Item> = Category::ALL
        .iter()
        .enumerate()
        .map(|(i, &c)| Item::Question(question(&format!("v{i}"), QuestionKind::Vocabulary, Some(c), i % 4)))
        .collect();
    items.push(Item::Question(question("g0", QuestionKind::Grammar, None, 0)));
    items.push(Item::Question(question("g1", QuestionKind::Grammar, None, 1)));
    items.push(Item::Passage(PassageGroup {
        id: "photo_0".to_string(),
        source: PassageSource::Image("images/dokkai/1/01.png".to_string()),
        title: None,
        table_layout: false,
        questions: vec![
            question("photo_0_0", QuestionKind::Reading, None, 2),
            question("photo_0_1", QuestionKind::Reading, None, 3),
        ],
    }));

    let mut session = SessionState::new(Mode::Combined, Chapter::Number(1), false, items);
    let answers: Vec<(String, usize)> = session
        .items()
        .iter()
        .flat_map(|i| i.questions())
        .map(|q| {
            let wrong = q.id == "g1" || q.id == "photo_0_1";
            let pick = if wrong { (q.correct + 1) % 4 } else { q.correct };
            (q.id.clone(), pick)
        })
        .collect();
    for (id, pick) in &answers {
        assert!(session.submit_answer(id, *pick).unwrap().accepted);
    }
    // Replays never change the score.
    for (id, _) in &answers {
        assert!(!session.submit_answer(id, 0).unwrap().accepted);
    }

    let totals = compute_totals(session.items());
    assert_eq!((totals.total, totals.answered, totals.score), (10, 10, 8));
    assert_eq!((session.answered_count(), session.score()), (10, 8));

    let missed = collect_incorrect(session.items());
    assert_eq!(missed.len(), 2);
    assert!(missed[0].passage.is_none());
    assert_eq!(missed[0].question.id, "g1");
    assert_eq!(missed[1].passage.as_ref().map(|p| p.id.as_str()), Some("photo_0"));
    assert_eq!(missed[1].sub_index, Some(1));

    let report = SessionReport::from_session(&session);
    assert_eq!(report.review.len(), 2);
    assert_eq!(report.missed_count(), 2);
}
