use std::fmt;

use serde::{Deserialize, Serialize};

/// Test mode requested for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Vocabulary,
    GrammarReading,
    Combined,
    MockTest,
    ReadingDrill,
    PhotoReadingFull,
    /// Legacy review mode: combined set, answers shown, no submissions.
    Study,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Vocabulary => "vocabulary",
            Mode::GrammarReading => "grammar_reading",
            Mode::Combined => "combined",
            Mode::MockTest => "mock_test",
            Mode::ReadingDrill => "reading_drill",
            Mode::PhotoReadingFull => "photo_reading_full",
            Mode::Study => "study",
        }
    }

    /// Accepts the current names and the older romanized ones.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "vocabulary" | "goi" => Some(Mode::Vocabulary),
            "grammar_reading" | "bunpo_dokkai" => Some(Mode::GrammarReading),
            "combined" => Some(Mode::Combined),
            "mock_test" | "shiken" => Some(Mode::MockTest),
            "reading_drill" | "dokkai_drill" => Some(Mode::ReadingDrill),
            "photo_reading_full" => Some(Mode::PhotoReadingFull),
            "study" => Some(Mode::Study),
            _ => None,
        }
    }

    pub fn all() -> &'static [Mode] {
        &[
            Mode::Vocabulary,
            Mode::GrammarReading,
            Mode::Combined,
            Mode::MockTest,
            Mode::ReadingDrill,
            Mode::PhotoReadingFull,
            Mode::Study,
        ]
    }

    pub fn title(self) -> &'static str {
        match self {
            Mode::Vocabulary => "語彙 (Vocabulary)",
            Mode::GrammarReading => "文法・読解 (Grammar & Reading)",
            Mode::Combined => "全部 (Combined)",
            Mode::MockTest => "模擬テスト (Mock Test)",
            Mode::ReadingDrill => "読解ドリル (Reading Drill)",
            Mode::PhotoReadingFull => "読解 全セット (Photo Reading)",
            Mode::Study => "スタディモード (Study)",
        }
    }

    /// Chapter-indexed vocabulary section.
    pub fn has_chapter_vocabulary(self) -> bool {
        matches!(self, Mode::Vocabulary | Mode::Combined | Mode::Study)
    }

    /// Chapter-indexed grammar section plus the chapter's photo passage.
    pub fn has_chapter_grammar(self) -> bool {
        matches!(self, Mode::GrammarReading | Mode::Combined | Mode::Study)
    }

    /// The set begins at the grammar section of a full exam, so display
    /// numbers continue after the vocabulary problems.
    pub fn starts_mid_exam(self) -> bool {
        matches!(self, Mode::GrammarReading)
    }

    pub fn is_read_only(self) -> bool {
        matches!(self, Mode::Study)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chapter selector: a 1-based chapter, or one of the drill sentinels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chapter {
    Number(u32),
    Random,
    Full,
}

impl Chapter {
    /// Unparseable or zero values fall back to chapter 1.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "random" => Chapter::Random,
            "full" => Chapter::Full,
            other => other
                .parse::<u32>()
                .ok()
                .filter(|&n| n > 0)
                .map_or(Chapter::Number(1), Chapter::Number),
        }
    }

    /// Zero-based index for chapter-indexed pools.
    pub fn index(self) -> Option<usize> {
        match self {
            Chapter::Number(n) if n > 0 => Some(n as usize - 1),
            _ => None,
        }
    }

    pub fn label(self) -> String {
        match self {
            Chapter::Number(n) => format!("第{n}回"),
            Chapter::Random => "ランダム (Random)".to_string(),
            Chapter::Full => "全部 (Full)".to_string(),
        }
    }
}

impl Default for Chapter {
    fn default() -> Self {
        Chapter::Number(1)
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chapter::Number(n) => write!(f, "{n}"),
            Chapter::Random => f.write_str("random"),
            Chapter::Full => f.write_str("full"),
        }
    }
}

/// Heading shown above a session: mode name, chapter, study marker.
pub fn session_title(mode: Mode, chapter: Chapter, study: bool) -> String {
    let mut title = if mode == Mode::Study {
        mode.title().to_string()
    } else {
        format!("{} - {}", mode.title(), chapter.label())
    };
    if study {
        title.push_str(" [Study]");
    }
    title
}
