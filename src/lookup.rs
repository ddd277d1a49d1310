//! Best-effort dictionary lookup for a selected word.
//!
//! Lookups run on their own thread and report back over a channel. Nothing
//! here touches session state, so a slow or failed request never affects
//! scoring.

use std::sync::mpsc;
use std::thread;

use serde::Deserialize;

pub const MAX_SELECTION_CHARS: usize = 30;
const MAX_SENSES: usize = 2;
const MAX_DEFINITIONS: usize = 3;

const API_BASE: &str = "https://jisho.org/api/v1/search/words?keyword=";
const SEARCH_BASE: &str = "https://jisho.org/search/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupResult {
    pub word: String,
    pub reading: String,
    /// One entry per sense, definitions joined with ", ".
    pub meanings: Vec<String>,
}

impl LookupResult {
    pub fn meanings_line(&self) -> String {
        self.meanings.join("; ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(LookupResult),
    NotFound(String),
    Failed { word: String, reason: String },
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    #[serde(default)]
    japanese: Vec<Form>,
    #[serde(default)]
    senses: Vec<Sense>,
}

#[derive(Deserialize)]
struct Form {
    word: Option<String>,
    reading: Option<String>,
}

#[derive(Deserialize)]
struct Sense {
    #[serde(default)]
    english_definitions: Vec<String>,
}

fn is_japanese_char(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309f}' | '\u{30a0}'..='\u{30ff}' | '\u{4e00}'..='\u{9faf}')
}

/// Selections worth a lookup: 1 to 30 characters with some kana or kanji.
pub fn should_lookup(selection: &str) -> bool {
    let text = selection.trim();
    let len = text.chars().count();
    (1..=MAX_SELECTION_CHARS).contains(&len) && text.chars().any(is_japanese_char)
}

/// Search page for manual lookup; always available.
pub fn search_url(word: &str) -> String {
    format!("{SEARCH_BASE}{}", urlencoding::encode(word.trim()))
}

pub fn api_url(word: &str) -> String {
    format!("{API_BASE}{}", urlencoding::encode(word.trim()))
}

/// First entry of a word-search response, or `None` when nothing matched.
pub fn parse_jisho_response(word: &str, body: &str) -> Result<Option<LookupResult>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let Some(entry) = response.data.into_iter().next() else {
        return Ok(None);
    };
    let reading = entry
        .japanese
        .into_iter()
        .next()
        .and_then(|f| f.reading.or(f.word))
        .unwrap_or_else(|| word.to_string());
    let meanings = entry
        .senses
        .into_iter()
        .take(MAX_SENSES)
        .map(|s| {
            s.english_definitions
                .into_iter()
                .take(MAX_DEFINITIONS)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect();
    Ok(Some(LookupResult {
        word: word.to_string(),
        reading,
        meanings,
    }))
}

#[cfg(feature = "network")]
fn fetch(word: &str) -> anyhow::Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;
    let response = client.get(api_url(word)).send()?.error_for_status()?;
    Ok(response.text()?)
}

#[cfg(not(feature = "network"))]
fn fetch(_word: &str) -> anyhow::Result<String> {
    anyhow::bail!("built without network support")
}

/// Blocking lookup. Errors are folded into the outcome.
pub fn lookup(word: &str) -> LookupOutcome {
    let word = word.trim();
    let failed = |reason: String| {
        tracing::warn!(word, %reason, "dictionary lookup failed");
        LookupOutcome::Failed {
            word: word.to_string(),
            reason,
        }
    };
    let body = match fetch(word) {
        Ok(body) => body,
        Err(e) => return failed(format!("{e:#}")),
    };
    match parse_jisho_response(word, &body) {
        Ok(Some(result)) => LookupOutcome::Found(result),
        Ok(None) => LookupOutcome::NotFound(word.to_string()),
        Err(e) => failed(e.to_string()),
    }
}

/// Run `lookup` on a background thread; the outcome arrives on the
/// returned receiver.
pub fn spawn_lookup(word: String) -> mpsc::Receiver<LookupOutcome> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(lookup(&word));
    });
    rx
}
