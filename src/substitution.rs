//! Mapping of one base query word to one emulated word.

use crate::error::Result;
use crate::ranked_vocab::RankedVocabList;
use crate::vocab_index::VocabIndex;
use rand::Rng;
use rand::rngs::StdRng;
#[cfg(test)]
use std::collections::VecDeque;
use std::io::{self, Write};
use tracing::warn;

/// Prefix of the tokens emitted for out-of-vocabulary words in placeholder mode.
pub const PLACEHOLDER_PREFIX: &str = "noexist";

/// Source of uniformly distributed reals in `[0, 1)`.
pub trait UniformSource {
    fn draw(&mut self) -> f64;
}

impl UniformSource for StdRng {
    fn draw(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Replays a fixed sequence of draws, cycling when it runs out.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ScriptedDraws {
    draws: VecDeque<f64>,
}

#[cfg(test)]
impl ScriptedDraws {
    pub(crate) fn new(draws: Vec<f64>) -> Self {
        assert!(!draws.is_empty(), "ScriptedDraws needs at least one value");
        ScriptedDraws {
            draws: draws.into(),
        }
    }
}

#[cfg(test)]
impl UniformSource for ScriptedDraws {
    fn draw(&mut self) -> f64 {
        let r = self.draws[0];
        self.draws.rotate_left(1);
        r
    }
}

/// Mutable state shared by every word of a run: the random source and the
/// placeholder counter, plus a tally of the fallback cases.
pub struct RunContext<D> {
    draws: D,
    next_placeholder: u64,
    oov_words: u64,
    overflow_words: u64,
}

impl<D: UniformSource> RunContext<D> {
    pub fn new(draws: D) -> Self {
        RunContext {
            draws,
            next_placeholder: 0,
            oov_words: 0,
            overflow_words: 0,
        }
    }

    /// Number of placeholders handed out so far; also the next one's suffix.
    pub fn placeholders_issued(&self) -> u64 {
        self.next_placeholder
    }

    /// Words that were not in the base vocabulary.
    pub fn oov_words(&self) -> u64 {
        self.oov_words
    }

    /// Words whose base rank lies beyond the emulated vocabulary.
    pub fn overflow_words(&self) -> u64 {
        self.overflow_words
    }

    fn issue_placeholder(&mut self) -> u64 {
        let n = self.next_placeholder;
        self.next_placeholder += 1;
        n
    }
}

/// What gets written in place of one query word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution<'a> {
    Word(&'a [u8]),
    /// `noexist<n>`
    Placeholder(u64),
}

impl Substitution<'_> {
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Substitution::Word(word) => out.write_all(word),
            Substitution::Placeholder(n) => write!(out, "{PLACEHOLDER_PREFIX}{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubstitutionOptions {
    /// Randomly shift each found rank by one place up or down.
    pub obfuscate: bool,
    /// Emit numbered placeholders for out-of-vocabulary words instead of
    /// random emulated words.
    pub preserve_no_exists: bool,
    /// Log a warning for every out-of-vocabulary or out-of-range word.
    pub verbose: bool,
}

pub struct SubstitutionPolicy<'a> {
    index: &'a VocabIndex<'a>,
    emulated: &'a RankedVocabList<'a>,
    options: SubstitutionOptions,
}

impl<'a> SubstitutionPolicy<'a> {
    /// `emulated` must not be empty.
    pub fn new(
        index: &'a VocabIndex<'a>,
        emulated: &'a RankedVocabList<'a>,
        options: SubstitutionOptions,
    ) -> Self {
        debug_assert!(!emulated.is_empty());
        SubstitutionPolicy {
            index,
            emulated,
            options,
        }
    }

    /// Choose the emulated word for one base query word.
    ///
    /// The base rank selects the emulated word of the same rank. Words missing
    /// from the base vocabulary get a placeholder or a random emulated word;
    /// ranks past the end of the emulated vocabulary always get a random one.
    /// Only a malformed base vocabulary record is an error.
    pub fn resolve<D: UniformSource>(
        &self,
        word: &[u8],
        ctx: &mut RunContext<D>,
    ) -> Result<Substitution<'a>> {
        let mut rank0 = self.index.lookup_rank(word)?.map(|rank| rank - 1);
        if self.options.obfuscate {
            if let Some(r0) = rank0.as_mut() {
                *r0 = jitter(*r0, ctx.draws.draw());
            }
        }

        let Some(rank0) = rank0 else {
            ctx.oov_words += 1;
            if self.options.verbose {
                warn!("'{}' not found in base vocab", String::from_utf8_lossy(word));
            }
            return Ok(if self.options.preserve_no_exists {
                Substitution::Placeholder(ctx.issue_placeholder())
            } else {
                Substitution::Word(self.emulated.random_word(&mut ctx.draws))
            });
        };

        if rank0 >= self.emulated.len() {
            ctx.overflow_words += 1;
            if self.options.verbose {
                warn!(
                    "rank0 {rank0} of '{}' too high (>= {}), choosing a random substitute",
                    String::from_utf8_lossy(word),
                    self.emulated.len()
                );
            }
            return Ok(Substitution::Word(self.emulated.random_word(&mut ctx.draws)));
        }

        Ok(Substitution::Word(self.emulated.word_at(rank0)))
    }
}

/// Add one to a 0-origin rank for `r > 2/3`, subtract one for `r < 1/3`.
/// A rank of 0 stays at 0 on a low draw.
fn jitter(rank0: usize, r: f64) -> usize {
    if r > 2.0 / 3.0 {
        rank0 + 1
    } else if rank0 > 0 && r < 1.0 / 3.0 {
        rank0 - 1
    } else {
        rank0
    }
}
