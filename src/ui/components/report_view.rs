use crate::model::item::PassageSource;
use crate::session::report::SessionReport;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;
use crate::ui::{Canvas, Widget};

pub struct ReportView<'a> {
    report: &'a SessionReport,
    theme: &'a Theme,
}

impl<'a> ReportView<'a> {
    pub fn new(report: &'a SessionReport, theme: &'a Theme) -> Self {
        Self { report, theme }
    }
}

impl Widget for ReportView<'_> {
    fn render(self, canvas: &mut Canvas) {
        let colors = &self.theme.colors;
        let totals = &self.report.totals;

        canvas.line(canvas.bold(&self.report.title, colors.header()));
        canvas.line(format!(
            "結果 (Score): {} / {} ({:.0}%)",
            totals.score,
            totals.total,
            totals.percent()
        ));
        canvas.line(format!("回答済み (Answered): {} / {}", totals.answered, totals.total));
        canvas.line(format!("時間 (Time): {}", self.report.elapsed_label()));
        ProgressBar::counts("正答率", totals.score, totals.total, self.theme).render(canvas);

        if self.report.review.is_empty() {
            canvas.blank();
            let msg = if totals.answered == 0 {
                "回答がありません (nothing answered)"
            } else {
                "全問正解！ (no mistakes)"
            };
            canvas.line(canvas.fg(msg, colors.correct()));
            return;
        }

        canvas.blank();
        canvas.line(canvas.bold(
            &format!("復習 (Review): {}", self.report.missed_count()),
            colors.header(),
        ));
        for group in &self.report.review {
            canvas.blank();
            if let Some(passage) = &group.passage {
                if let Some(title) = &passage.title {
                    canvas.line(canvas.bold(title, colors.accent()));
                }
                match &passage.source {
                    PassageSource::Image(path) => {
                        canvas.line(canvas.fg(&format!("［画像］ {path}"), colors.muted()));
                    }
                    PassageSource::Text(text) => {
                        for line in text.lines() {
                            canvas.line(format!("  {}", canvas.rich(line)));
                        }
                    }
                }
            }
            for entry in &group.entries {
                let q = &entry.question;
                canvas.line(format!("・{}", canvas.rich(&q.text)));
                if let Some(answer) = q.user_answer {
                    let yours = format!("    あなたの答え: {}. {}", answer + 1, canvas.rich(&q.options[answer]));
                    canvas.line(canvas.fg(&yours, colors.incorrect()));
                }
                let correct = format!("    正解: {}. {}", q.correct + 1, canvas.rich(&q.options[q.correct]));
                canvas.line(canvas.fg(&correct, colors.correct()));
            }
        }
    }
}
