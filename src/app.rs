use std::sync::mpsc;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use regex::Regex;

use crate::config::Config;
use crate::engine::answer_stats::{AnswerDistribution, bank_statistics};
use crate::engine::assembler::Assembler;
use crate::engine::mode::{Chapter, Mode};
use crate::lookup::{self, LookupOutcome};
use crate::model::item::Item;
use crate::model::pools::Pools;
use crate::session::layout::{Entry, Layout, build_layout};
use crate::session::report::SessionReport;
use crate::session::state::{SessionState, Submission};
use crate::store::json_store::JsonStore;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Idle,
    Session,
    Report,
}

/// What a line of user input did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feedback {
    Answered { number: u32, submission: Submission },
    /// Submission refused (read-only session or already answered).
    Rejected { number: u32 },
    Skipped,
    LookupStarted(String),
    Finished,
    Invalid(String),
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: Theme,
    pub pools: Pools,
    pub session: Option<SessionState>,
    pub layout: Layout,
    pub last_report: Option<SessionReport>,
    pub should_quit: bool,
    prompt_pattern: Regex,
    cursor: usize,
    pending_lookup: Option<mpsc::Receiver<LookupOutcome>>,
    rng: SmallRng,
}

impl App {
    /// Load the bank named by `config` and prepare an idle app.
    pub fn new(config: Config) -> Result<Self> {
        let store = JsonStore::with_base_dir(config.data_path())?;
        let pools = store
            .load_pools()
            .with_context(|| format!("loading question bank from {}", store.base_dir().display()))?;
        if pools.is_empty() {
            tracing::warn!(dir = %store.base_dir().display(), "question bank is empty");
        }
        Ok(Self::with_pools(config, pools, SmallRng::from_entropy()))
    }

    pub fn with_pools(config: Config, pools: Pools, rng: SmallRng) -> Self {
        let theme = Theme::load(&config.theme).unwrap_or_default();
        let prompt_pattern = config.prompt_pattern();
        Self {
            screen: AppScreen::Idle,
            config,
            theme,
            pools,
            session: None,
            layout: Layout::default(),
            last_report: None,
            should_quit: false,
            prompt_pattern,
            cursor: 0,
            pending_lookup: None,
            rng,
        }
    }

    pub fn assemble(&mut self, mode: Mode, chapter: Chapter) -> Vec<Item> {
        let rng = SmallRng::from_rng(&mut self.rng).unwrap_or_else(|_| SmallRng::from_entropy());
        let mut assembler = Assembler::with_options(&self.pools, self.config.assembly_options(), rng);
        assembler.assemble(mode, chapter)
    }

    pub fn start_session(&mut self, mode: Mode, chapter: Chapter, study: bool) {
        let items = self.assemble(mode, chapter);
        tracing::info!(
            mode = mode.as_str(),
            %chapter,
            study,
            items = items.len(),
            "session started"
        );
        let session = SessionState::new(mode, chapter, study, items);
        self.layout = build_layout(mode, session.items(), &self.prompt_pattern);
        self.session = Some(session);
        self.cursor = 0;
        self.last_report = None;
        self.should_quit = false;
        self.screen = AppScreen::Session;
    }

    /// Next entry still waiting for an answer, in display order.
    pub fn current_entry(&self) -> Option<Entry> {
        let session = self.session.as_ref()?;
        self.layout
            .entries()
            .skip(self.cursor)
            .find(|e| {
                session
                    .question(e.question)
                    .is_some_and(|q| !q.is_answered())
            })
            .copied()
    }

    fn advance_past(&mut self, entry: Entry) {
        if let Some(pos) = self.layout.entries().position(|e| *e == entry) {
            self.cursor = pos + 1;
        }
    }

    /// Interpret one line of input: `1`-`4` answers the current question,
    /// `n` or an empty line skips it, `l WORD` looks a word up, `q` finishes.
    pub fn handle_line(&mut self, line: &str) -> Feedback {
        let input = line.trim();
        match input {
            "q" | "quit" => {
                self.finish_session();
                return Feedback::Finished;
            }
            "" | "n" => {
                if let Some(entry) = self.current_entry() {
                    self.advance_past(entry);
                }
                return self.finish_if_done(Feedback::Skipped);
            }
            _ => {}
        }
        if let Some(word) = input.strip_prefix("l ").map(str::trim) {
            return self.start_lookup(word);
        }

        let Ok(option @ 1..=4) = input.parse::<usize>() else {
            return Feedback::Invalid(format!("expected 1-4, n, l WORD or q, got {input:?}"));
        };
        let Some(entry) = self.current_entry() else {
            self.finish_session();
            return Feedback::Finished;
        };
        let Some(session) = self.session.as_mut() else {
            return Feedback::Invalid("no active session".to_string());
        };
        let feedback = match session.submit_at(entry.question, option - 1) {
            Ok(submission) if submission.accepted => Feedback::Answered {
                number: entry.number,
                submission,
            },
            Ok(_) => Feedback::Rejected {
                number: entry.number,
            },
            Err(e) => Feedback::Invalid(e.to_string()),
        };
        self.advance_past(entry);
        self.finish_if_done(feedback)
    }

    fn finish_if_done(&mut self, feedback: Feedback) -> Feedback {
        let done = self
            .session
            .as_ref()
            .is_some_and(|s| s.is_complete() || self.current_entry().is_none());
        if done && !self.mode().is_some_and(Mode::is_read_only) {
            self.finish_session();
            return Feedback::Finished;
        }
        feedback
    }

    fn mode(&self) -> Option<Mode> {
        self.session.as_ref().map(SessionState::mode)
    }

    pub fn tick(&mut self) {
        if self.screen == AppScreen::Session
            && let Some(session) = self.session.as_mut()
        {
            session.tick();
        }
    }

    pub fn start_lookup(&mut self, word: &str) -> Feedback {
        if !lookup::should_lookup(word) {
            return Feedback::Invalid(format!("{word:?} is not a Japanese word of 1-30 characters"));
        }
        self.pending_lookup = Some(lookup::spawn_lookup(word.to_string()));
        Feedback::LookupStarted(word.to_string())
    }

    /// Lookup result, once the background request has finished.
    pub fn poll_lookup(&mut self) -> Option<LookupOutcome> {
        let rx = self.pending_lookup.as_ref()?;
        match rx.try_recv() {
            Ok(outcome) => {
                self.pending_lookup = None;
                Some(outcome)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.pending_lookup = None;
                None
            }
        }
    }

    pub fn finish_session(&mut self) -> Option<&SessionReport> {
        if self.screen == AppScreen::Session
            && let Some(session) = self.session.as_ref()
        {
            let report = SessionReport::from_session(session);
            tracing::info!(
                score = report.totals.score,
                answered = report.totals.answered,
                total = report.totals.total,
                elapsed = %report.elapsed_label(),
                "session finished"
            );
            self.last_report = Some(report);
            self.screen = AppScreen::Report;
            self.should_quit = true;
        }
        self.last_report.as_ref()
    }

    pub fn stats(&self) -> Vec<AnswerDistribution> {
        bank_statistics(&self.pools)
    }
}
