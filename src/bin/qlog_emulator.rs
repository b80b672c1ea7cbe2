use anyhow::{Context, Result};
use clap::Parser;
use qlog_emulator::{Config, SubstitutionOptions};
use tracing_subscriber::EnvFilter;

/// Generate a query log for one corpus from the query log of another.
///
/// Reads <base-stem>_vocab.tsv, <base-stem>.qlog and
/// <emu-stem>_vocab_by_freq.tsv; writes <emu-stem>.qlog.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stem of the base corpus files
    #[arg(long = "base-stem")]
    base_stem: String,

    /// Stem of the emulated corpus files
    #[arg(long = "emu-stem")]
    emu_stem: String,

    /// Randomly shift ranks by one place
    #[arg(long)]
    obfuscate: bool,

    /// Emit noexist<N> for words missing from the base vocabulary
    #[arg(long = "preserve-no-exists")]
    preserve_no_exists: bool,

    /// Log per-query and per-word diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Random seed; 0 seeds from the clock
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Maximum number of words kept per query
    #[arg(long = "max-words", default_value_t = qlog_emulator::tokenize::DEFAULT_MAX_WORDS)]
    max_words: usize,

    /// Extra ASCII characters that separate words, e.g. ",;"
    #[arg(long = "token-breaks", default_value = "")]
    token_breaks: String,

    /// Verify that the base vocabulary is sorted before starting
    #[arg(long = "check-order")]
    check_order: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = Config {
        options: SubstitutionOptions {
            obfuscate: args.obfuscate,
            preserve_no_exists: args.preserve_no_exists,
            verbose: args.verbose,
        },
        seed: Some(args.seed),
        max_words: args.max_words,
        token_breaks: args.token_breaks.into_bytes(),
        check_order: args.check_order,
        ..Config::new(&args.base_stem, &args.emu_stem)
    };

    let report = qlog_emulator::run(&config).with_context(|| {
        format!(
            "emulating {} from {}",
            config.emu_qlog_path().display(),
            config.base_qlog_path().display()
        )
    })?;

    let stats = &report.stats;
    println!(
        "Number of input queries: {}\nAve. query length: {:.2}",
        stats.queries_in,
        stats.average_query_length()
    );
    println!(
        "Words not in base vocab: {}\nWords ranked beyond emu vocab: {}",
        report.oov_words, report.overflow_words
    );
    if config.options.preserve_no_exists {
        println!("Placeholders issued: {}", report.placeholders_issued);
    }
    if stats.words_dropped > 0 {
        println!("Words dropped over the per-query limit: {}", stats.words_dropped);
    }
    let generation = report.generation_time.as_secs_f64();
    println!(
        "Total time taken: {:.1} sec. startup + {:.1} sec. generation time\nAverage generation time per query: {:.4} msec",
        report.setup_time.as_secs_f64(),
        generation,
        if stats.queries_out > 0 {
            1000.0 * generation / stats.queries_out as f64
        } else {
            0.0
        }
    );
    println!(
        "\nEmulated query log ({} queries) is in {}",
        stats.queries_out,
        config.emu_qlog_path().display()
    );

    Ok(())
}
