use crate::error::{EmulatorError, Result};
use crate::substitution::SubstitutionOptions;
use crate::tokenize::DEFAULT_MAX_WORDS;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const BASE_VOCAB_SUFFIX: &str = "_vocab.tsv";
pub const QUERY_LOG_SUFFIX: &str = ".qlog";
pub const EMU_VOCAB_SUFFIX: &str = "_vocab_by_freq.tsv";

/// Settings for one emulation run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Stem of the base corpus files: `<base>_vocab.tsv` and `<base>.qlog`.
    pub base_stem: PathBuf,
    /// Stem of the emulated corpus: `<emu>_vocab_by_freq.tsv` is read and
    /// `<emu>.qlog` is written.
    pub emu_stem: PathBuf,
    pub options: SubstitutionOptions,
    /// `None` or `Some(0)` seeds from the clock.
    pub seed: Option<u64>,
    pub max_words: usize,
    pub token_breaks: Vec<u8>,
    /// Verify the base vocabulary's sort order before processing.
    pub check_order: bool,
}

impl Config {
    pub fn new(base_stem: impl Into<PathBuf>, emu_stem: impl Into<PathBuf>) -> Self {
        Config {
            base_stem: base_stem.into(),
            emu_stem: emu_stem.into(),
            options: SubstitutionOptions::default(),
            seed: None,
            max_words: DEFAULT_MAX_WORDS,
            token_breaks: Vec::new(),
            check_order: false,
        }
    }

    pub fn base_vocab_path(&self) -> PathBuf {
        with_suffix(&self.base_stem, BASE_VOCAB_SUFFIX)
    }

    pub fn base_qlog_path(&self) -> PathBuf {
        with_suffix(&self.base_stem, QUERY_LOG_SUFFIX)
    }

    pub fn emu_vocab_path(&self) -> PathBuf {
        with_suffix(&self.emu_stem, EMU_VOCAB_SUFFIX)
    }

    pub fn emu_qlog_path(&self) -> PathBuf {
        with_suffix(&self.emu_stem, QUERY_LOG_SUFFIX)
    }

    /// Fail on the first missing input file, before anything is loaded.
    pub fn check_inputs(&self) -> Result<()> {
        for path in [
            self.base_vocab_path(),
            self.base_qlog_path(),
            self.emu_vocab_path(),
        ] {
            if !path.is_file() {
                return Err(EmulatorError::MissingInput(path));
            }
        }
        Ok(())
    }

    pub fn effective_seed(&self) -> u64 {
        match self.seed {
            Some(seed) if seed != 0 => seed,
            _ => SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(1),
        }
    }
}

fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
