use include_dir::{include_dir, Dir};
use rand::Rng;
use serde::Deserialize;
use serde_json::from_str;

use crate::error::{Error, Result};

static VOCAB_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/vocab");

/// Name of the vocabulary the game ships with.
pub const DEFAULT_VOCABULARY: &str = "physics";

/// A fixed, non-empty list of target words compiled into the binary.
#[derive(Deserialize, Clone, Debug)]
pub struct Vocabulary {
    pub name: String,
    pub size: u32,
    words: Vec<String>,
}

impl Vocabulary {
    /// Load one of the embedded vocabularies by name (without `.json`).
    pub fn load(name: &str) -> Result<Self> {
        let file = VOCAB_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| Error::UnknownVocabulary(name.to_string()))?;

        let contents = file
            .contents_utf8()
            .ok_or_else(|| Error::UnknownVocabulary(name.to_string()))?;

        let vocab: Vocabulary = from_str(contents)?;
        Self::new(vocab.name, vocab.words)
    }

    /// The physics word list.
    pub fn physics() -> Result<Self> {
        Self::load(DEFAULT_VOCABULARY)
    }

    /// Build a vocabulary from an explicit word list.
    ///
    /// Every word must be non-empty ASCII letters and the list must not be
    /// empty, so that [`Vocabulary::choose`] can always return a word.
    pub fn new(name: impl Into<String>, words: Vec<String>) -> Result<Self> {
        let name = name.into();
        if words.is_empty() {
            return Err(Error::EmptyVocabulary(name));
        }
        if let Some(bad) = words.iter().find(|w| !is_valid_word(w)) {
            return Err(Error::InvalidWord(bad.clone()));
        }

        Ok(Self {
            size: words.len() as u32,
            name,
            words,
        })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Pick a word uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // non-empty by construction
        &self.words[rng.gen_range(0..self.words.len())]
    }
}

/// True when `word` is one or more ASCII letters.
pub fn is_valid_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic())
}
