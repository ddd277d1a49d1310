use crate::lookup::{LookupOutcome, search_url};
use crate::ui::theme::Theme;
use crate::ui::{Canvas, Widget};

pub struct LookupPopup<'a> {
    outcome: &'a LookupOutcome,
    theme: &'a Theme,
}

impl<'a> LookupPopup<'a> {
    pub fn new(outcome: &'a LookupOutcome, theme: &'a Theme) -> Self {
        Self { outcome, theme }
    }
}

impl Widget for LookupPopup<'_> {
    fn render(self, canvas: &mut Canvas) {
        let colors = &self.theme.colors;
        let word = match self.outcome {
            LookupOutcome::Found(result) => {
                canvas.line(format!(
                    "{} — {}",
                    canvas.bold(&result.word, colors.accent()),
                    canvas.fg(&result.reading, colors.bar_filled())
                ));
                if !result.meanings.is_empty() {
                    canvas.line(canvas.fg(&result.meanings_line(), colors.muted()));
                }
                &result.word
            }
            LookupOutcome::NotFound(word) => {
                canvas.line(format!(
                    "{} {}",
                    canvas.bold(word, colors.accent()),
                    canvas.fg("— not found", colors.muted())
                ));
                word
            }
            LookupOutcome::Failed { word, reason } => {
                canvas.line(format!(
                    "{} {}",
                    canvas.bold(word, colors.accent()),
                    canvas.fg(&format!("— lookup failed ({reason})"), colors.incorrect())
                ));
                word
            }
        };
        canvas.line(search_url(word));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupResult;

    fn render(outcome: &LookupOutcome) -> String {
        let theme = Theme::default();
        let mut canvas = Canvas::new(false);
        LookupPopup::new(outcome, &theme).render(&mut canvas);
        canvas.into_string()
    }

    #[test]
    fn found_shows_reading_meanings_and_link() {
        let out = render(&LookupOutcome::Found(LookupResult {
            word: "猫".to_string(),
            reading: "ねこ".to_string(),
            meanings: vec!["cat".to_string()],
        }));
        assert!(out.starts_with("猫 — ねこ\ncat\n"));
        assert!(out.contains("https://jisho.org/search/%E7%8C%AB"));
    }

    #[test]
    fn not_found_still_links_search_page() {
        let out = render(&LookupOutcome::NotFound("ぬ".to_string()));
        assert!(out.contains("— not found"));
        assert!(out.contains("jisho.org/search/"));
    }
}
