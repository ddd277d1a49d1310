use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

use crate::model::pools::{
    Pools, RawPhotoPassage, RawTextPassage, RawVocabularyChapter, normalize_grammar_chapters,
    normalize_photo_passages, normalize_questions, normalize_text_passages,
    normalize_vocabulary_chapters,
};
use crate::model::question::RawQuestion;

pub const VOCABULARY_FILE: &str = "vocabulary.json";
pub const VOCABULARY_CHAPTERS_FILE: &str = "vocabulary_chapters.json";
pub const GRAMMAR_FILE: &str = "grammar.json";
pub const GRAMMAR_STARRED_FILE: &str = "grammar_starred.json";
pub const GRAMMAR_CHAPTERS_FILE: &str = "grammar_chapters.json";
pub const PHOTO_PASSAGES_FILE: &str = "photo_passages.json";
pub const TEXT_PASSAGES_FILE: &str = "text_passages.json";

/// Question bank in its on-disk shape, one field per file.
#[derive(Clone, Debug, Default)]
pub struct BankFiles {
    pub vocabulary: Vec<RawQuestion>,
    pub vocabulary_chapters: Vec<RawVocabularyChapter>,
    pub grammar: Vec<RawQuestion>,
    pub grammar_starred: Vec<RawQuestion>,
    pub grammar_chapters: Vec<Vec<RawQuestion>>,
    pub photo_passages: Vec<RawPhotoPassage>,
    pub text_passages: Vec<RawTextPassage>,
}

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shiken")
            .join("bank");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating bank directory {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// A missing file is an empty source; an unreadable or malformed one is
    /// an error.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.file_path(name);
        if !path.exists() {
            tracing::debug!(file = name, "bank file absent, using empty pool");
            return Ok(T::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }

    pub fn load_bank(&self) -> Result<BankFiles> {
        Ok(BankFiles {
            vocabulary: self.load(VOCABULARY_FILE)?,
            vocabulary_chapters: self.load(VOCABULARY_CHAPTERS_FILE)?,
            grammar: self.load(GRAMMAR_FILE)?,
            grammar_starred: self.load(GRAMMAR_STARRED_FILE)?,
            grammar_chapters: self.load(GRAMMAR_CHAPTERS_FILE)?,
            photo_passages: self.load(PHOTO_PASSAGES_FILE)?,
            text_passages: self.load(TEXT_PASSAGES_FILE)?,
        })
    }

    /// Load and normalize every pool. Fails on the first malformed record.
    pub fn load_pools(&self) -> Result<Pools> {
        let bank = self.load_bank()?;
        let pools = Pools {
            vocabulary: normalize_questions(bank.vocabulary, VOCABULARY_FILE)?,
            vocabulary_chapters: normalize_vocabulary_chapters(
                bank.vocabulary_chapters,
                VOCABULARY_CHAPTERS_FILE,
            )?,
            grammar: normalize_questions(bank.grammar, GRAMMAR_FILE)?,
            grammar_starred: normalize_questions(bank.grammar_starred, GRAMMAR_STARRED_FILE)?,
            grammar_chapters: normalize_grammar_chapters(
                bank.grammar_chapters,
                GRAMMAR_CHAPTERS_FILE,
            )?,
            photo_passages: normalize_photo_passages(bank.photo_passages, PHOTO_PASSAGES_FILE)?,
            text_passages: normalize_text_passages(bank.text_passages, TEXT_PASSAGES_FILE)?,
        };
        tracing::info!(
            dir = %self.base_dir.display(),
            vocabulary = pools.vocabulary.len(),
            vocabulary_chapters = pools.vocabulary_chapters.len(),
            grammar = pools.grammar.len(),
            grammar_starred = pools.grammar_starred.len(),
            grammar_chapters = pools.grammar_chapters.len(),
            photo_passages = pools.photo_passages.len(),
            text_passages = pools.text_passages.len(),
            "question bank loaded"
        );
        Ok(pools)
    }

    /// Write every file of the bank, each one atomically.
    pub fn save_bank(&self, bank: &BankFiles) -> Result<()> {
        self.save(VOCABULARY_FILE, &bank.vocabulary)?;
        self.save(VOCABULARY_CHAPTERS_FILE, &bank.vocabulary_chapters)?;
        self.save(GRAMMAR_FILE, &bank.grammar)?;
        self.save(GRAMMAR_STARRED_FILE, &bank.grammar_starred)?;
        self.save(GRAMMAR_CHAPTERS_FILE, &bank.grammar_chapters)?;
        self.save(PHOTO_PASSAGES_FILE, &bank.photo_passages)?;
        self.save(TEXT_PASSAGES_FILE, &bank.text_passages)?;
        Ok(())
    }
}
