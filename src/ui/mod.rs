pub mod components;
pub mod theme;

use std::sync::LazyLock;

use crossterm::style::{Attribute, Color, Stylize};
use regex::Regex;

static UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<u>(.*?)</u>").expect("valid underline pattern"));

/// Line buffer that components draw into. Styling is dropped when the
/// output is not a terminal.
pub struct Canvas {
    lines: Vec<String>,
    color: bool,
}

impl Canvas {
    pub fn new(color: bool) -> Self {
        Self {
            lines: Vec::new(),
            color,
        }
    }

    pub fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    pub fn fg(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).attribute(Attribute::Bold).to_string()
        } else {
            text.to_string()
        }
    }

    /// Render inline `<u>..</u>` markup: underlined on a terminal,
    /// bracketed otherwise.
    pub fn rich(&self, text: &str) -> String {
        UNDERLINE
            .replace_all(text, |caps: &regex::Captures| {
                if self.color {
                    caps[1].underlined().to_string()
                } else {
                    format!("［{}］", &caps[1])
                }
            })
            .into_owned()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_string(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Something that draws itself onto a canvas.
pub trait Widget {
    fn render(self, canvas: &mut Canvas);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rich_text_without_color_brackets_underlines() {
        let canvas = Canvas::new(false);
        assert_eq!(canvas.rich("彼の<u>努力</u>を見る"), "彼の［努力］を見る");
    }

    #[test]
    fn plain_canvas_has_no_escape_codes() {
        let mut canvas = Canvas::new(false);
        let text = canvas.bold("問題", Color::Red);
        canvas.line(text);
        canvas.blank();
        canvas.blank();
        assert_eq!(canvas.into_string(), "問題\n\n");
    }
}
