//! The hangman state machine.
//!
//! A [`Session`] is one playthrough. It is `Active` until either the word is
//! complete (`Won`) or [`MAX_ERRORS`] wrong letters have been guessed
//! (`Lost`). Both terminal checks run synchronously at the end of every
//! accepted guess; the win bonus and the result submission are guarded by a
//! latch so they happen at most once per session.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::reporter::{GameResult, ResultReporter};
use crate::vocabulary::{is_valid_word, Vocabulary};

/// Wrong guesses allowed before the game is lost.
pub const MAX_ERRORS: u32 = 10;
/// Points for each distinct correct letter.
pub const CORRECT_LETTER_REWARD: u32 = 20;
/// Bonus for completing the word.
pub const WIN_BONUS: u32 = 100;
/// Identifier of this game within the family of games on the scoring service.
pub const GAME_ID: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Active,
    Over(Outcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum_macros::Display)]
pub enum LetterStatus {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}

/// What a call to [`Session::guess`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    Hit,
    Miss,
    /// Game over, letter already guessed, or not a letter.
    Ignored,
}

/// Who is playing and which game they are playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub player_id: Option<String>,
    pub game_id: u32,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            player_id: None,
            game_id: GAME_ID,
        }
    }
}

pub struct Session {
    word: String,
    letters: HashSet<char>,
    guessed: Vec<char>,
    letter_status: BTreeMap<char, LetterStatus>,
    error_count: u32,
    score: u32,
    elapsed_secs: u64,
    phase: Phase,
    won: bool,
    context: SessionContext,
    reporter: Arc<dyn ResultReporter>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("word", &self.word)
            .field("guessed", &self.guessed)
            .field("error_count", &self.error_count)
            .field("score", &self.score)
            .field("elapsed_secs", &self.elapsed_secs)
            .field("phase", &self.phase)
            .field("context", &self.context)
            .finish()
    }
}

impl Session {
    /// Start a session on a word drawn at random from `vocabulary`.
    pub fn start(
        vocabulary: &Vocabulary,
        context: SessionContext,
        reporter: Arc<dyn ResultReporter>,
    ) -> Self {
        Self::start_with_rng(vocabulary, context, reporter, &mut rand::thread_rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(
        vocabulary: &Vocabulary,
        context: SessionContext,
        reporter: Arc<dyn ResultReporter>,
        rng: &mut R,
    ) -> Self {
        let word = vocabulary.choose(rng).to_ascii_uppercase();
        Self::fresh(word, context, reporter)
    }

    /// Start a session on a fixed word.
    pub fn with_word(
        word: &str,
        context: SessionContext,
        reporter: Arc<dyn ResultReporter>,
    ) -> Result<Self> {
        if !is_valid_word(word) {
            return Err(Error::InvalidWord(word.to_string()));
        }
        Ok(Self::fresh(word.to_ascii_uppercase(), context, reporter))
    }

    fn fresh(word: String, context: SessionContext, reporter: Arc<dyn ResultReporter>) -> Self {
        info!(
            len = word.len(),
            player_id = ?context.player_id,
            game_id = context.game_id,
            "session started"
        );

        Self {
            letters: word.chars().collect(),
            word,
            guessed: Vec::new(),
            letter_status: BTreeMap::new(),
            error_count: 0,
            score: 0,
            elapsed_secs: 0,
            phase: Phase::Active,
            won: false,
            context,
            reporter,
        }
    }

    /// Throw the current game away and start over on a new random word.
    pub fn restart(&mut self, vocabulary: &Vocabulary) {
        self.restart_with_rng(vocabulary, &mut rand::thread_rng());
    }

    pub fn restart_with_rng<R: Rng + ?Sized>(&mut self, vocabulary: &Vocabulary, rng: &mut R) {
        let word = vocabulary.choose(rng).to_ascii_uppercase();
        *self = Self::fresh(word, self.context.clone(), Arc::clone(&self.reporter));
    }

    /// Guess a letter. Case-insensitive.
    pub fn guess(&mut self, letter: char) -> GuessOutcome {
        if self.is_over() || !letter.is_ascii_alphabetic() {
            trace!(%letter, phase = %self.phase, "guess ignored");
            return GuessOutcome::Ignored;
        }

        let letter = letter.to_ascii_uppercase();
        if self.letter_status.contains_key(&letter) {
            trace!(%letter, "letter already guessed");
            return GuessOutcome::Ignored;
        }

        self.guessed.push(letter);
        let outcome = if self.letters.contains(&letter) {
            self.letter_status.insert(letter, LetterStatus::Correct);
            self.score += CORRECT_LETTER_REWARD;
            GuessOutcome::Hit
        } else {
            self.letter_status.insert(letter, LetterStatus::Incorrect);
            self.error_count += 1;
            GuessOutcome::Miss
        };

        debug!(
            %letter,
            ?outcome,
            score = self.score,
            errors = self.error_count,
            "guess"
        );

        self.evaluate();
        outcome
    }

    /// Run the loss and win checks. Safe to call any number of times.
    pub fn evaluate(&mut self) {
        self.check_loss();
        self.check_win();
    }

    fn check_loss(&mut self) {
        if self.phase != Phase::Active || self.error_count < MAX_ERRORS {
            return;
        }

        self.phase = Phase::Over(Outcome::Lost);
        info!(word = %self.word, score = self.score, "game lost");
        self.report();
    }

    fn check_win(&mut self) {
        if self.won || self.phase != Phase::Active || !self.is_word_complete() {
            return;
        }

        self.won = true;
        self.score += WIN_BONUS;
        self.phase = Phase::Over(Outcome::Won);
        info!(word = %self.word, score = self.score, "game won");
        self.report();
    }

    fn report(&self) {
        self.reporter.submit(GameResult {
            score: self.score,
            user_id: self.context.player_id.clone(),
            game_id: self.context.game_id,
            time: self.elapsed_secs,
        });
    }

    /// One second of play time. Frozen once the game is over.
    pub fn tick(&mut self) {
        if self.phase == Phase::Active {
            self.elapsed_secs += 1;
        }
    }

    pub fn is_word_complete(&self) -> bool {
        self.letters
            .iter()
            .all(|c| self.letter_status.get(c) == Some(&LetterStatus::Correct))
    }

    /// The board: `Some(letter)` where revealed, `None` where still hidden.
    pub fn board(&self) -> Vec<Option<char>> {
        self.word
            .chars()
            .map(|c| self.letter_status.contains_key(&c).then_some(c))
            .collect()
    }

    pub fn letter_status(&self, letter: char) -> LetterStatus {
        self.letter_status
            .get(&letter.to_ascii_uppercase())
            .copied()
            .unwrap_or_default()
    }

    /// Letters in the order they were guessed.
    pub fn guessed_letters(&self) -> &[char] {
        &self.guessed
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn errors_remaining(&self) -> u32 {
        MAX_ERRORS.saturating_sub(self.error_count)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Active => None,
            Phase::Over(outcome) => Some(outcome),
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Over(_))
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }
}
