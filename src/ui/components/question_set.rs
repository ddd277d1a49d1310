use crate::engine::mode::session_title;
use crate::model::item::PassageSource;
use crate::session::layout::{Block, Entry, Layout};
use crate::session::state::SessionState;
use crate::ui::theme::Theme;
use crate::ui::{Canvas, Widget};

/// One numbered question with its four options.
pub struct QuestionCard<'a> {
    session: &'a SessionState,
    entry: Entry,
    theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(session: &'a SessionState, entry: Entry, theme: &'a Theme) -> Self {
        Self {
            session,
            entry,
            theme,
        }
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, canvas: &mut Canvas) {
        let colors = &self.theme.colors;
        let Some(question) = self.session.question(self.entry.question) else {
            return;
        };
        let number = format!("({})", self.entry.number);
        if self.entry.show_prompt {
            let text = canvas.rich(&question.text);
            canvas.line(format!("{} {text}", canvas.bold(&number, colors.accent())));
        } else {
            canvas.line(canvas.bold(&number, colors.accent()));
        }

        let revealed = self.session.revealed_answer(self.entry.question);
        for (i, option) in question.options.iter().enumerate() {
            let label = format!("  {}. {}", i + 1, canvas.rich(option));
            let line = if revealed == Some(i) {
                format!("{} ✓", canvas.fg(&label, colors.correct()))
            } else if question.user_answer == Some(i) {
                format!("{} ✗", canvas.fg(&label, colors.incorrect()))
            } else {
                label
            };
            canvas.line(line);
        }
    }
}

/// Passage body shown above its questions.
pub fn render_passage(canvas: &mut Canvas, block: &Block, theme: &Theme) {
    let colors = &theme.colors;
    if let Some(title) = &block.title {
        if matches!(block.passage, Some(PassageSource::Image(_))) {
            canvas.line(canvas.bold(title, colors.header()));
        }
    }
    match &block.passage {
        Some(PassageSource::Image(path)) => {
            canvas.line(canvas.fg(&format!("［画像］ {path}"), colors.muted()));
        }
        Some(PassageSource::Text(text)) if block.table_layout => {
            for line in text.lines() {
                canvas.line(format!("│ {line}"));
            }
        }
        Some(PassageSource::Text(text)) => {
            for line in text.lines() {
                canvas.line(format!("  {}", canvas.rich(line)));
            }
        }
        None => {}
    }
}

/// The whole laid-out set: title, section headers, passages, questions.
pub struct QuestionSet<'a> {
    session: &'a SessionState,
    layout: &'a Layout,
    theme: &'a Theme,
}

impl<'a> QuestionSet<'a> {
    pub fn new(session: &'a SessionState, layout: &'a Layout, theme: &'a Theme) -> Self {
        Self {
            session,
            layout,
            theme,
        }
    }
}

impl Widget for QuestionSet<'_> {
    fn render(self, canvas: &mut Canvas) {
        let colors = &self.theme.colors;
        let title = session_title(
            self.session.mode(),
            self.session.chapter(),
            self.session.is_study(),
        );
        canvas.line(canvas.bold(&title, colors.header()));

        if self.layout.sections.is_empty() {
            canvas.line(canvas.fg("問題がありません (no questions available)", colors.muted()));
            return;
        }

        for section in &self.layout.sections {
            canvas.blank();
            if let Some(header) = &section.header {
                canvas.line(canvas.bold(&format!("▍{header}"), colors.header()));
            }
            for block in &section.blocks {
                canvas.blank();
                render_passage(canvas, block, self.theme);
                for entry in &block.entries {
                    QuestionCard::new(self.session, *entry, self.theme).render(canvas);
                }
            }
        }
    }
}
