//! Splitting a query line into words.

/// Default per-line word capacity.
pub const DEFAULT_MAX_WORDS: usize = 500;

/// Splits on every byte `<= b' '` plus any configured extra ASCII characters.
/// Words past `max_words` are dropped.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    breaks: [bool; 256],
    max_words: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new(b"", DEFAULT_MAX_WORDS)
    }
}

impl Tokenizer {
    /// Non-ASCII bytes in `extra_breaks` are ignored so UTF-8 sequences stay whole.
    pub fn new(extra_breaks: &[u8], max_words: usize) -> Self {
        let mut breaks = [false; 256];
        for b in 0..=b' ' {
            breaks[b as usize] = true;
        }
        for &b in extra_breaks.iter().filter(|b| b.is_ascii()) {
            breaks[b as usize] = true;
        }
        Tokenizer { breaks, max_words }
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Words of `line` in order, and how many were dropped for exceeding
    /// the capacity.
    pub fn split<'l>(&self, line: &'l [u8]) -> (Vec<&'l [u8]>, usize) {
        let mut words = Vec::new();
        let mut dropped = 0;
        for word in line
            .split(|&b| self.breaks[b as usize])
            .filter(|w| !w.is_empty())
        {
            if words.len() < self.max_words {
                words.push(word);
            } else {
                dropped += 1;
            }
        }
        (words, dropped)
    }
}
