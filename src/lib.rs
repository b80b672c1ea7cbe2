//! Emulation of a search query log for a corpus that has none.
//!
//! Each word of a base query log is replaced by the word at the same
//! frequency rank in the emulated corpus's vocabulary.

pub mod config;
pub mod error;
pub mod lines;
pub mod ranked_vocab;
pub mod run;
pub mod substitution;
pub mod tokenize;
pub mod transformer;
pub mod vocab_index;

pub use config::Config;
pub use error::{EmulatorError, Result};
pub use ranked_vocab::RankedVocabList;
pub use run::{RunReport, run};
pub use substitution::{
    PLACEHOLDER_PREFIX, RunContext, Substitution, SubstitutionOptions,
    SubstitutionPolicy, UniformSource,
};
pub use tokenize::Tokenizer;
pub use transformer::{LogStats, QueryTransformer};
pub use vocab_index::{VocabEntry, VocabIndex, compare_words};
