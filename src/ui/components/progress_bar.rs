use crate::ui::theme::Theme;
use crate::ui::{Canvas, Widget};

const BAR_WIDTH: usize = 20;

pub struct ProgressBar<'a> {
    pub label: String,
    pub ratio: f64,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(label: &str, ratio: f64, theme: &'a Theme) -> Self {
        Self {
            label: label.to_string(),
            ratio: if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 },
            theme,
        }
    }

    /// Bar for `done` out of `total`; an empty total reads as 0%.
    pub fn counts(label: &str, done: usize, total: usize, theme: &'a Theme) -> Self {
        let ratio = if total == 0 { 0.0 } else { done as f64 / total as f64 };
        Self::new(label, ratio, theme)
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, canvas: &mut Canvas) {
        let colors = &self.theme.colors;
        let filled = (self.ratio * BAR_WIDTH as f64).round() as usize;
        let bar = format!(
            "{}{}",
            canvas.fg(&"█".repeat(filled), colors.bar_filled()),
            canvas.fg(&"░".repeat(BAR_WIDTH - filled), colors.bar_empty()),
        );
        canvas.line(format!("{} {bar} {:.0}%", self.label, self.ratio * 100.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_half_filled_bar() {
        let theme = Theme::default();
        let mut canvas = Canvas::new(false);
        ProgressBar::counts("進捗", 5, 10, &theme).render(&mut canvas);
        let line = &canvas.lines()[0];
        assert!(line.starts_with("進捗 "));
        assert_eq!(line.matches('█').count(), 10);
        assert!(line.ends_with(" 50%"));
    }

    #[test]
    fn empty_total_is_zero() {
        let theme = Theme::default();
        let mut canvas = Canvas::new(false);
        ProgressBar::counts("x", 0, 0, &theme).render(&mut canvas);
        assert!(canvas.lines()[0].ends_with(" 0%"));
    }
}
