use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::category::Category;
use crate::model::question::QuestionData;

/// Options averaging this many characters or fewer are word-formation
/// affixes; longer ones are contextual vocabulary. Tuned against the bank.
pub const FORMATION_MAX_MEAN_LEN: f64 = 2.2;

const UNDERLINE_OPEN: &str = "<u>";
const PARENS: [char; 2] = ['(', '（'];

static UNDERLINED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<u>(.*?)</u>").expect("valid underline pattern"));

pub type Buckets<'a> = BTreeMap<Category, Vec<&'a QuestionData>>;

/// Partition an unstructured vocabulary pool into the six categories.
/// Every category key is present in the result, possibly empty.
pub fn classify(pool: &[QuestionData]) -> Buckets<'_> {
    classify_with(pool, FORMATION_MAX_MEAN_LEN)
}

pub fn classify_with(pool: &[QuestionData], formation_max_mean_len: f64) -> Buckets<'_> {
    let mut buckets: Buckets = Category::ALL.iter().map(|&c| (c, Vec::new())).collect();
    for q in pool {
        let category = classify_question(q, formation_max_mean_len);
        buckets.entry(category).or_default().push(q);
    }
    tracing::debug!(
        sizes = ?buckets.iter().map(|(c, qs)| (c.to_key(), qs.len())).collect::<Vec<_>>(),
        "classified vocabulary pool"
    );
    buckets
}

pub fn classify_question(q: &QuestionData, formation_max_mean_len: f64) -> Category {
    let text = q.text.as_str();
    let has_underline = text.contains(UNDERLINE_OPEN);
    let has_paren = text.contains(PARENS);

    if !has_underline && !has_paren {
        return Category::Usage;
    }

    if has_paren {
        return if q.mean_option_len() <= formation_max_mean_len {
            Category::Formation
        } else {
            Category::Context
        };
    }

    let target = underlined(text).unwrap_or("");
    if q.options.iter().all(|o| is_kana(o)) {
        Category::Reading
    } else if is_kana(target) {
        Category::Writing
    } else {
        Category::Paraphrase
    }
}

/// Text inside the first complete `<u>…</u>` span.
pub fn underlined(text: &str) -> Option<&str> {
    UNDERLINED
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Non-empty and made only of hiragana, katakana and the long-vowel mark.
pub fn is_kana(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| matches!(c, '\u{3040}'..='\u{309f}' | '\u{30a0}'..='\u{30ff}'))
}
