use serde::{Deserialize, Serialize};

/// Vocabulary question type. Declaration order is exam order and is the
/// order in which chapter data is emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Reading,
    Writing,
    Formation,
    Context,
    Paraphrase,
    Usage,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Reading,
        Category::Writing,
        Category::Formation,
        Category::Context,
        Category::Paraphrase,
        Category::Usage,
    ];

    pub fn to_key(self) -> &'static str {
        match self {
            Category::Reading => "reading",
            Category::Writing => "writing",
            Category::Formation => "formation",
            Category::Context => "context",
            Category::Paraphrase => "paraphrase",
            Category::Usage => "usage",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.to_key() == key)
    }

    /// Questions per category in one exam sitting (mock-test targets and
    /// per-chapter slice length).
    pub const fn exam_count(self) -> usize {
        match self {
            Category::Context => 7,
            _ => 5,
        }
    }

    /// Start of this category's run inside the flat vocabulary pool.
    pub fn flat_pool_offset(self) -> usize {
        match self {
            Category::Reading => 0,
            Category::Writing => 75,
            Category::Formation => 150,
            Category::Context => 225,
            Category::Paraphrase => 330,
            Category::Usage => 405,
        }
    }

    /// Exam problem number (問題N) for the section header.
    pub fn problem_number(self) -> u32 {
        match self {
            Category::Reading => 1,
            Category::Writing => 2,
            Category::Formation => 3,
            Category::Context => 4,
            Category::Paraphrase => 5,
            Category::Usage => 6,
        }
    }

    pub fn instructions(self) -> &'static str {
        match self {
            Category::Reading => {
                "＿の言葉の読み方として最もよいものを、１・２・３・４から一つ選びなさい。"
            }
            Category::Writing => {
                "＿の言葉を漢字で書くとき、最もよいものを１・２・３・４から一つ選びなさい。"
            }
            Category::Formation | Category::Context => {
                "（　）に入れるのに最もよいものを、１・２・３・４から一つ選びなさい。"
            }
            Category::Paraphrase => {
                "＿の言葉に意味が最も近いものを、１・２・３・４から一つ選びなさい。"
            }
            Category::Usage => {
                "次の言葉の使い方として最もよいものを、１・２・３・４から一つ選びなさい。"
            }
        }
    }
}

/// Total vocabulary questions in one sitting.
pub const fn exam_vocabulary_total() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < Category::ALL.len() {
        total += Category::ALL[i].exam_count();
        i += 1;
    }
    total
}
