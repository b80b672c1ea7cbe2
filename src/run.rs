//! One complete emulation run over stem-named files.

use crate::config::Config;
use crate::error::{EmulatorError, Result};
use crate::lines::{load_file, split_lines};
use crate::ranked_vocab::RankedVocabList;
use crate::substitution::{RunContext, SubstitutionPolicy};
use crate::tokenize::Tokenizer;
use crate::transformer::{LogStats, QueryTransformer};
use crate::vocab_index::VocabIndex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of [`run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: LogStats,
    pub oov_words: u64,
    pub overflow_words: u64,
    pub placeholders_issued: u64,
    pub seed: u64,
    pub base_vocab_size: usize,
    pub emu_vocab_size: usize,
    pub setup_time: Duration,
    pub generation_time: Duration,
}

/// Read `<base>.qlog` and write `<emu>.qlog`.
///
/// All inputs are checked and both vocabularies loaded before the first
/// query is read.
pub fn run(config: &Config) -> Result<RunReport> {
    let started = Instant::now();
    config.check_inputs()?;

    let base_path = config.base_vocab_path();
    let base_buf = load_file(&base_path)?;
    let index = VocabIndex::new(split_lines(&base_buf));
    if index.is_empty() {
        return Err(EmulatorError::EmptyVocabulary(base_path));
    }
    if config.check_order {
        index.verify_order()?;
    }
    info!("Base vocab: {} entries from {}", index.len(), base_path.display());

    let emu_path = config.emu_vocab_path();
    let emu_buf = load_file(&emu_path)?;
    let emulated = RankedVocabList::new(split_lines(&emu_buf));
    if emulated.is_empty() {
        return Err(EmulatorError::EmptyVocabulary(emu_path));
    }
    info!("Emu vocab: {} entries from {}", emulated.len(), emu_path.display());

    let seed = config.effective_seed();
    info!("Using random seed {seed}");
    let mut ctx = RunContext::new(StdRng::seed_from_u64(seed));

    let policy = SubstitutionPolicy::new(&index, &emulated, config.options);
    let tokenizer = Tokenizer::new(&config.token_breaks, config.max_words);
    let transformer = QueryTransformer::new(policy, tokenizer);

    let input = BufReader::new(File::open(config.base_qlog_path())?);
    let out_path = config.emu_qlog_path();
    let mut output = BufWriter::new(File::create(&out_path)?);
    let setup_time = started.elapsed();
    info!("Setup complete: elapsed time {:.3} sec.", setup_time.as_secs_f64());

    let generation_started = Instant::now();
    let stats = transformer.emulate(input, &mut output, &mut ctx)?;
    let generation_time = generation_started.elapsed();
    info!("Emulated query log written to {}", out_path.display());

    Ok(RunReport {
        stats,
        oov_words: ctx.oov_words(),
        overflow_words: ctx.overflow_words(),
        placeholders_issued: ctx.placeholders_issued(),
        seed,
        base_vocab_size: index.len(),
        emu_vocab_size: emulated.len(),
        setup_time,
        generation_time,
    })
}
