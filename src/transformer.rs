//! Rewriting whole query lines and whole query logs.

use crate::error::Result;
use crate::substitution::{RunContext, SubstitutionPolicy, UniformSource};
use crate::tokenize::Tokenizer;
use chrono::Local;
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Counters for one pass over a query log.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogStats {
    pub queries_in: u64,
    pub queries_out: u64,
    /// Words written, summed over all queries.
    pub words_out: u64,
    /// Words discarded because a query exceeded the tokenizer's capacity.
    pub words_dropped: u64,
}

impl LogStats {
    pub fn average_query_length(&self) -> f64 {
        if self.queries_out == 0 {
            0.0
        } else {
            self.words_out as f64 / self.queries_out as f64
        }
    }
}

pub struct QueryTransformer<'a> {
    policy: SubstitutionPolicy<'a>,
    tokenizer: Tokenizer,
}

impl<'a> QueryTransformer<'a> {
    pub fn new(policy: SubstitutionPolicy<'a>, tokenizer: Tokenizer) -> Self {
        QueryTransformer { policy, tokenizer }
    }

    /// Rewrite one query line, returning the new line with its `\n`.
    pub fn transform<D: UniformSource>(
        &self,
        line: &[u8],
        ctx: &mut RunContext<D>,
    ) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(line.len() + 1);
        self.transform_into(line, ctx, &mut out)?;
        Ok(out)
    }

    /// Append the rewritten form of `line` to `out`. Returns the number of
    /// words written and the number dropped.
    pub fn transform_into<D: UniformSource>(
        &self,
        line: &[u8],
        ctx: &mut RunContext<D>,
        out: &mut Vec<u8>,
    ) -> Result<(usize, usize)> {
        let end = line.iter().rposition(|&b| b >= b' ').map_or(0, |p| p + 1);
        let line = &line[..end];
        debug!("input query: {}", String::from_utf8_lossy(line));

        let (words, dropped) = self.tokenizer.split(line);
        if dropped > 0 {
            warn!(
                "query has more than {} words, dropped {dropped}",
                self.tokenizer.max_words()
            );
        }

        for (i, word) in words.iter().enumerate() {
            let substitute = self.policy.resolve(word, ctx)?;
            if i > 0 {
                out.push(b' ');
            }
            substitute.write_to(out)?;
        }
        out.push(b'\n');
        Ok((words.len(), dropped))
    }

    /// Rewrite every line of `input` to `output`, one output line per input line.
    pub fn emulate<R, W, D>(&self, mut input: R, output: &mut W, ctx: &mut RunContext<D>) -> Result<LogStats>
    where
        R: BufRead,
        W: Write,
        D: UniformSource,
    {
        let mut stats = LogStats::default();
        let mut line = Vec::new();
        let mut out = Vec::new();
        let mut printerval = 10;
        let started = Instant::now();

        loop {
            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            stats.queries_in += 1;

            if stats.queries_out > 0 && stats.queries_out % printerval == 0 {
                let time_str = Local::now().format("%x - %I:%M.%S%p");
                info!(
                    "{time_str}, {} queries generated, average time per query: {:.3} msec",
                    stats.queries_out,
                    1000.0 * started.elapsed().as_secs_f64() / stats.queries_out as f64
                );
                if stats.queries_out % (printerval * 10) == 0 {
                    printerval *= 10;
                }
            }

            out.clear();
            let (written, dropped) = self.transform_into(&line, ctx, &mut out)?;
            output.write_all(&out)?;
            stats.queries_out += 1;
            stats.words_out += written as u64;
            stats.words_dropped += dropped as u64;
        }

        output.flush()?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::split_lines;
    use crate::ranked_vocab::RankedVocabList;
    use crate::substitution::{ScriptedDraws, SubstitutionOptions};
    use crate::vocab_index::VocabIndex;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;
    use std::io::Cursor;

    const BASE: &[u8] = b"apple\t10\t5\t2\nbanana\t20\t8\t1\nfig\t1\t1\t5\n";
    const EMU: &[u8] = b"zeta\t30\nyak\t12\nxi\t3\n";

    fn run(options: SubstitutionOptions, input: &[u8], draws: Vec<f64>) -> (String, LogStats) {
        let index = VocabIndex::new(split_lines(BASE));
        let emu = RankedVocabList::new(split_lines(EMU));
        let policy = SubstitutionPolicy::new(&index, &emu, options);
        let transformer = QueryTransformer::new(policy, Tokenizer::default());
        let mut ctx = RunContext::new(ScriptedDraws::new(draws));
        let mut output = Vec::new();
        let stats = transformer
            .emulate(Cursor::new(input), &mut output, &mut ctx)
            .unwrap();
        (String::from_utf8(output).unwrap(), stats)
    }

    #[test]
    fn transforms_by_rank() {
        let (out, stats) = run(SubstitutionOptions::default(), b"banana apple\r\n", vec![0.0]);
        assert_eq!(out, "zeta yak\n");
        assert_eq!(stats.queries_in, 1);
        assert_eq!(stats.queries_out, 1);
        assert_eq!(stats.words_out, 2);
    }

    #[test]
    fn placeholders_continue_across_lines() {
        let options = SubstitutionOptions {
            preserve_no_exists: true,
            ..Default::default()
        };
        let (out, _) = run(options, b"kumquat banana\napple\nkumquat kiwi", vec![0.0]);
        assert_eq!(out, "noexist0 zeta\nyak\nnoexist1 noexist2\n");
    }

    #[test]
    fn empty_lines_stay_empty() {
        let (out, stats) = run(SubstitutionOptions::default(), b"\n  \nbanana\n", vec![0.0]);
        assert_eq!(out, "\n\nzeta\n");
        assert_eq!(stats.queries_out, 3);
        assert!((stats.average_query_length() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn no_trailing_newline_still_terminates_output() {
        let (out, _) = run(SubstitutionOptions::default(), b"apple", vec![0.0]);
        assert_eq!(out, "yak\n");
    }

    #[test]
    fn transform_single_line() {
        let index = VocabIndex::new(split_lines(BASE));
        let emu = RankedVocabList::new(split_lines(EMU));
        let policy = SubstitutionPolicy::new(&index, &emu, SubstitutionOptions::default());
        let transformer = QueryTransformer::new(policy, Tokenizer::new(b"", 1));
        let mut ctx = RunContext::new(ScriptedDraws::new(vec![0.0]));
        assert_eq!(transformer.transform(b"apple banana\n", &mut ctx).unwrap(), b"yak\n");
    }

    #[test]
    fn overflow_is_uniform_over_emulated_words() {
        let index = VocabIndex::new(split_lines(BASE));
        let emu = RankedVocabList::new(split_lines(EMU));
        let policy = SubstitutionPolicy::new(&index, &emu, SubstitutionOptions::default());
        let transformer = QueryTransformer::new(policy, Tokenizer::default());
        let mut ctx = RunContext::new(StdRng::seed_from_u64(42));

        let mut counts: HashMap<Vec<u8>, usize> = HashMap::new();
        const TRIALS: usize = 3000;
        for _ in 0..TRIALS {
            let line = transformer.transform(b"fig", &mut ctx).unwrap();
            *counts.entry(line).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 3);
        for word in [&b"zeta\n"[..], b"yak\n", b"xi\n"] {
            let n = counts[word];
            assert!((800..1200).contains(&n), "{} drawn {n} times", String::from_utf8_lossy(word));
        }
        assert_eq!(ctx.overflow_words(), TRIALS as u64);
    }

    #[test]
    fn malformed_vocab_aborts_the_run() {
        let index = VocabIndex::new(split_lines(b"apple\t10\n"));
        let emu = RankedVocabList::new(split_lines(EMU));
        let policy = SubstitutionPolicy::new(&index, &emu, SubstitutionOptions::default());
        let transformer = QueryTransformer::new(policy, Tokenizer::default());
        let mut ctx = RunContext::new(ScriptedDraws::new(vec![0.0]));
        let mut output = Vec::new();
        let result = transformer.emulate(Cursor::new(&b"pear\napple\n"[..]), &mut output, &mut ctx);
        assert!(result.is_err());
        // the line before the bad record was already written
        assert_eq!(output, b"zeta\n");
    }
}
