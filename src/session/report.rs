use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::mode::{Chapter, Mode, session_title};
use crate::model::item::{Item, PassageSource, Question};
use crate::session::state::SessionState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total: usize,
    pub answered: usize,
    pub score: usize,
}

impl Totals {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.score as f64 / self.total as f64 * 100.0
        }
    }
}

/// Recompute the totals from the items themselves.
pub fn compute_totals(items: &[Item]) -> Totals {
    let mut totals = Totals::default();
    for q in items.iter().flat_map(Item::questions) {
        totals.total += 1;
        match q.is_correct() {
            Some(true) => {
                totals.answered += 1;
                totals.score += 1;
            }
            Some(false) => totals.answered += 1,
            None => {}
        }
    }
    totals
}

/// Passage context attached to a missed sub-question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PassageContext {
    pub id: String,
    pub source: PassageSource,
    pub title: Option<String>,
}

/// An answered question whose answer was wrong.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IncorrectEntry {
    pub passage: Option<PassageContext>,
    pub sub_index: Option<usize>,
    pub question: Question,
}

/// Every missed question in presentation order. Unanswered questions are
/// not listed.
pub fn collect_incorrect(items: &[Item]) -> Vec<IncorrectEntry> {
    let mut missed = Vec::new();
    for item in items {
        match item {
            Item::Question(q) if q.is_missed() => missed.push(IncorrectEntry {
                passage: None,
                sub_index: None,
                question: q.clone(),
            }),
            Item::Question(_) => {}
            Item::Passage(group) => {
                for (sub, q) in group.questions.iter().enumerate() {
                    if !q.is_missed() {
                        continue;
                    }
                    missed.push(IncorrectEntry {
                        passage: Some(PassageContext {
                            id: group.id.clone(),
                            source: group.source.clone(),
                            title: group.title.clone(),
                        }),
                        sub_index: Some(sub),
                        question: q.clone(),
                    });
                }
            }
        }
    }
    missed
}

/// Missed questions sharing a passage, so the passage is shown once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewGroup {
    pub passage: Option<PassageContext>,
    pub entries: Vec<IncorrectEntry>,
}

/// Group adjacent entries by passage id. Entries without a passage stay
/// in one run until a passage entry interrupts them.
pub fn group_by_passage(entries: Vec<IncorrectEntry>) -> Vec<ReviewGroup> {
    let mut groups: Vec<ReviewGroup> = Vec::new();
    for entry in entries {
        let key = entry.passage.as_ref().map(|p| p.id.as_str());
        match groups.last_mut() {
            Some(group) if group.passage.as_ref().map(|p| p.id.as_str()) == key => {
                group.entries.push(entry);
            }
            _ => groups.push(ReviewGroup {
                passage: entry.passage.clone(),
                entries: vec![entry],
            }),
        }
    }
    groups
}

/// `MM:SS`; minutes keep counting past an hour.
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// End-of-session summary.
#[derive(Clone, Debug, Serialize)]
pub struct SessionReport {
    pub title: String,
    pub mode: Mode,
    pub chapter: Chapter,
    pub study: bool,
    pub totals: Totals,
    pub elapsed_secs: u64,
    pub finished_at: DateTime<Utc>,
    pub review: Vec<ReviewGroup>,
}

impl SessionReport {
    pub fn from_session(session: &SessionState) -> Self {
        let totals = compute_totals(session.items());
        if totals.answered != session.answered_count() || totals.score != session.score() {
            tracing::warn!(
                answered = session.answered_count(),
                score = session.score(),
                ?totals,
                "running counters disagree with recomputed totals"
            );
        }
        Self {
            title: session_title(session.mode(), session.chapter(), session.is_study()),
            mode: session.mode(),
            chapter: session.chapter(),
            study: session.is_study(),
            totals,
            elapsed_secs: session.elapsed_secs(),
            finished_at: Utc::now(),
            review: group_by_passage(collect_incorrect(session.items())),
        }
    }

    pub fn elapsed_label(&self) -> String {
        format_elapsed(self.elapsed_secs)
    }

    pub fn missed_count(&self) -> usize {
        self.review.iter().map(|g| g.entries.len()).sum()
    }
}
