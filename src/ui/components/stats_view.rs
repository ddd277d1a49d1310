use crate::engine::answer_stats::AnswerDistribution;
use crate::model::question::OPTION_COUNT;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;
use crate::ui::{Canvas, Widget};

/// Correct-answer position breakdown per pool.
pub struct StatsView<'a> {
    stats: &'a [AnswerDistribution],
    theme: &'a Theme,
}

impl<'a> StatsView<'a> {
    pub fn new(stats: &'a [AnswerDistribution], theme: &'a Theme) -> Self {
        Self { stats, theme }
    }
}

impl Widget for StatsView<'_> {
    fn render(self, canvas: &mut Canvas) {
        let colors = &self.theme.colors;
        canvas.line(canvas.bold("答えの位置 (Answer positions)", colors.header()));
        if self.stats.is_empty() {
            canvas.line(canvas.fg("問題がありません (empty bank)", colors.muted()));
            return;
        }

        for dist in self.stats {
            canvas.blank();
            canvas.line(canvas.bold(
                &format!("{} ({} questions)", dist.label, dist.total()),
                colors.accent(),
            ));
            for option in 1..=OPTION_COUNT {
                let label = format!("  {option}: {:>4}", dist.counts[option - 1]);
                ProgressBar::new(&label, dist.percent(option) / 100.0, self.theme).render(canvas);
            }
            let leaders: Vec<String> = dist.most_frequent().iter().map(|o| o.to_string()).collect();
            canvas.line(format!("  most frequent: {}", leaders.join(", ")));
        }
    }
}
