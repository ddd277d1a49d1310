use serde::Serialize;

use crate::model::pools::Pools;
use crate::model::question::{OPTION_COUNT, QuestionData};

/// How often each option position holds the correct answer in a pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnswerDistribution {
    pub label: String,
    pub counts: [usize; OPTION_COUNT],
}

impl AnswerDistribution {
    pub fn from_questions<'q>(
        label: &str,
        questions: impl IntoIterator<Item = &'q QuestionData>,
    ) -> Self {
        let mut counts = [0; OPTION_COUNT];
        for q in questions {
            counts[q.correct] += 1;
        }
        Self {
            label: label.to_string(),
            counts,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Share of `option` (1-based) as a percentage.
    pub fn percent(&self, option: usize) -> f64 {
        let total = self.total();
        if total == 0 || option == 0 || option > OPTION_COUNT {
            return 0.0;
        }
        self.counts[option - 1] as f64 / total as f64 * 100.0
    }

    /// 1-based positions sharing the highest count.
    pub fn most_frequent(&self) -> Vec<usize> {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return Vec::new();
        }
        (0..OPTION_COUNT)
            .filter(|&i| self.counts[i] == max)
            .map(|i| i + 1)
            .collect()
    }
}

/// Per-pool distributions for the statistics page. Empty pools are skipped.
pub fn bank_statistics(pools: &Pools) -> Vec<AnswerDistribution> {
    let drill = pools.text_passages.iter().flat_map(|p| &p.questions);
    let grammar = pools.grammar_chapters.iter().flatten();
    let photo = pools.photo_passages.iter().flat_map(|p| &p.questions);
    let mock_pool = pools
        .vocabulary
        .iter()
        .chain(&pools.grammar)
        .chain(&pools.grammar_starred)
        .chain(photo.clone());

    [
        AnswerDistribution::from_questions("Reading drills", drill),
        AnswerDistribution::from_questions("Grammar", grammar),
        AnswerDistribution::from_questions("Photo reading", photo),
        AnswerDistribution::from_questions("Mock test pool", mock_pool),
    ]
    .into_iter()
    .filter(|d| d.total() > 0)
    .collect()
}
