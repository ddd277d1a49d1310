use std::collections::HashMap;

use serde::Serialize;

use crate::engine::mode::{Chapter, Mode};
use crate::error::SessionError;
use crate::model::item::{Item, Question, QuestionRef, flatten};
use crate::model::question::OPTION_COUNT;

/// Outcome of one answer submission, for the renderer's feedback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub accepted: bool,
    pub correct: bool,
    /// Revealed once the submission is accepted.
    pub correct_index: Option<usize>,
}

impl Submission {
    fn rejected() -> Self {
        Self {
            accepted: false,
            correct: false,
            correct_index: None,
        }
    }
}

/// Live state of one test session. Items are fixed at construction; only
/// answers, the two counters and the clock change afterwards.
#[derive(Clone, Debug)]
pub struct SessionState {
    mode: Mode,
    chapter: Chapter,
    study: bool,
    items: Vec<Item>,
    index: HashMap<String, QuestionRef>,
    answered_count: usize,
    score: usize,
    elapsed_secs: u64,
}

impl SessionState {
    pub fn new(mode: Mode, chapter: Chapter, study: bool, items: Vec<Item>) -> Self {
        let index = flatten(&items)
            .map(|(r, q)| (q.id.clone(), r))
            .collect();
        // Legacy study mode always reveals.
        let study = study || mode == Mode::Study;
        Self {
            mode,
            chapter,
            study,
            items,
            index,
            answered_count: 0,
            score: 0,
            elapsed_secs: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn chapter(&self) -> Chapter {
        self.chapter
    }

    pub fn is_study(&self) -> bool {
        self.study
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn answered_count(&self) -> usize {
        self.answered_count
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn total_questions(&self) -> usize {
        self.items.iter().map(Item::question_count).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.answered_count >= self.total_questions()
    }

    pub fn find(&self, id: &str) -> Option<QuestionRef> {
        self.index.get(id).copied()
    }

    pub fn question(&self, at: QuestionRef) -> Option<&Question> {
        match (self.items.get(at.item)?, at.sub) {
            (Item::Question(q), None) => Some(q),
            (Item::Passage(p), Some(sub)) => p.questions.get(sub),
            _ => None,
        }
    }

    fn question_mut(&mut self, at: QuestionRef) -> Option<&mut Question> {
        match (self.items.get_mut(at.item)?, at.sub) {
            (Item::Question(q), None) => Some(q),
            (Item::Passage(p), Some(sub)) => p.questions.get_mut(sub),
            _ => None,
        }
    }

    /// Record the first answer to the question with this id.
    ///
    /// A question that already has an answer is left untouched and the
    /// submission comes back with `accepted: false`, so replays can never
    /// score twice. Read-only review sessions reject every submission.
    pub fn submit_answer(&mut self, id: &str, selected: usize) -> Result<Submission, SessionError> {
        let at = self
            .find(id)
            .ok_or_else(|| SessionError::UnknownQuestion(id.to_string()))?;
        self.submit_at(at, selected)
    }

    pub fn submit_at(&mut self, at: QuestionRef, selected: usize) -> Result<Submission, SessionError> {
        if selected >= OPTION_COUNT {
            return Err(SessionError::OptionOutOfRange(selected));
        }
        let read_only = self.mode.is_read_only();
        let question = self
            .question_mut(at)
            .ok_or_else(|| SessionError::UnknownQuestion(format!("{at:?}")))?;

        if read_only {
            tracing::debug!(id = %question.id, "submission ignored in review mode");
            return Ok(Submission::rejected());
        }
        if question.user_answer.is_some() {
            tracing::debug!(id = %question.id, "question already answered");
            return Ok(Submission::rejected());
        }

        question.user_answer = Some(selected);
        let correct = selected == question.correct;
        let correct_index = question.correct;

        self.answered_count += 1;
        if correct {
            self.score += 1;
        }

        Ok(Submission {
            accepted: true,
            correct,
            correct_index: Some(correct_index),
        })
    }

    /// One second of the session clock.
    pub fn tick(&mut self) {
        self.elapsed_secs += 1;
    }

    /// Correct option to highlight: always in study sessions, otherwise only
    /// after the question has been answered.
    pub fn revealed_answer(&self, at: QuestionRef) -> Option<usize> {
        let question = self.question(at)?;
        (self.study || question.is_answered()).then_some(question.correct)
    }

    /// "answered / total" progress text.
    pub fn progress_label(&self) -> String {
        format!("{} / {}", self.answered_count, self.total_questions())
    }
}
