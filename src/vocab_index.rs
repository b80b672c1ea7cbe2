//! Word to frequency-rank lookup over the base corpus vocabulary.
//!
//! The base `_vocab.tsv` file lists one word per line, sorted by word, with
//! tab-separated columns `occurrence frequency`, `document frequency` and
//! `rank` (1 for the most frequent word). The index keeps one slice per line
//! and binary-searches them in file order.

use crate::error::{EmulatorError, Result};
use crate::lines::{display_record, word_len};
use rayon::prelude::*;
use std::cmp::Ordering;

const FIELD_NAMES: [&str; 3] = ["occurrence frequency", "document frequency", "rank"];

/// Compare two words, each terminated by the first byte `<= b' '` or by the
/// end of its slice.
///
/// A word that ends first sorts first, so `app` is never a match for `apple`.
/// Otherwise the first differing byte decides, compared unsigned.
pub fn compare_words(a: &[u8], b: &[u8]) -> Ordering {
    let mut i = 0;
    loop {
        let x = a.get(i).copied().filter(|&c| c > b' ');
        let y = b.get(i).copied().filter(|&c| c > b' ');
        match (x, y) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x != y => return x.cmp(&y),
            _ => i += 1,
        }
    }
}

/// One parsed base vocabulary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabEntry<'a> {
    pub word: &'a [u8],
    pub occurrence_frequency: u64,
    pub document_frequency: u64,
    /// 1-origin position in a frequency-descending ordering.
    pub rank: usize,
}

pub struct VocabIndex<'a> {
    lines: Vec<&'a [u8]>, // sorted by word, exactly as read
    first_line: usize,    // blank records skipped at the top of the file
}

impl<'a> VocabIndex<'a> {
    /// Wrap lines that are already sorted under [`compare_words`]. Nothing is
    /// copied or re-sorted.
    ///
    /// Records without a word sort first, so in a sorted file they can only
    /// lead; they are dropped and do not count towards [`Self::len`].
    pub fn new(mut lines: Vec<&'a [u8]>) -> Self {
        let first_line = lines
            .iter()
            .position(|l| word_len(l) > 0)
            .unwrap_or(lines.len());
        lines.drain(..first_line);
        VocabIndex { lines, first_line }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Check the sort order the binary search relies on.
    ///
    /// Adjacent pairs are compared in parallel; the first descending pair is
    /// reported. Equal neighbours are accepted.
    pub fn verify_order(&self) -> Result<()> {
        let bad = self
            .lines
            .par_windows(2)
            .position_first(|pair| compare_words(pair[0], pair[1]) == Ordering::Greater);

        match bad {
            None => Ok(()),
            Some(i) => Err(EmulatorError::OutOfOrder {
                line_no: self.first_line + i + 2,
                previous: display_record(&self.lines[i][..word_len(self.lines[i])]),
                next: display_record(&self.lines[i + 1][..word_len(self.lines[i + 1])]),
            }),
        }
    }

    /// Line position of `word` and the number of comparisons spent finding it.
    fn search(&self, word: &[u8]) -> (Option<usize>, usize) {
        let mut lo = 0;
        let mut hi = self.lines.len();
        let mut probes = 0;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            probes += 1;
            match compare_words(self.lines[mid], word) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return (Some(mid), probes),
            }
        }
        (None, probes)
    }

    /// Look up `word` and parse its numeric columns.
    ///
    /// `Ok(None)` means the word is not in the vocabulary. A matching record
    /// with missing or malformed columns is an error: the vocabulary itself
    /// is broken.
    pub fn entry(&self, word: &[u8]) -> Result<Option<VocabEntry<'a>>> {
        let Some(pos) = self.search(word).0 else {
            return Ok(None);
        };
        let record = self.lines[pos];
        let line_no = self.first_line + pos + 1;
        let [occurrence_frequency, document_frequency, rank] = parse_fields(record, line_no)?;
        if rank == 0 {
            return Err(EmulatorError::InvalidNumber {
                line_no,
                field: FIELD_NAMES[2],
                record: display_record(record),
            });
        }

        Ok(Some(VocabEntry {
            word: &record[..word_len(record)],
            occurrence_frequency,
            document_frequency,
            rank: rank as usize,
        }))
    }

    /// 1-origin frequency rank of `word`, or `None` if it is out of vocabulary.
    pub fn lookup_rank(&self, word: &[u8]) -> Result<Option<usize>> {
        Ok(self.entry(word)?.map(|e| e.rank))
    }
}

/// Parse the three numeric columns following the word of `record`.
///
/// The first two must each be followed by a tab. The rank may be followed by
/// a tab (extra columns are ignored), `\r`, `\n`, NUL or the end of the record.
fn parse_fields(record: &[u8], line_no: usize) -> Result<[u64; 3]> {
    let missing = |field: usize| EmulatorError::MissingField {
        line_no,
        field: FIELD_NAMES[field],
        record: display_record(record),
    };

    let mut rest = &record[word_len(record)..];
    if rest.is_empty() {
        return Err(missing(0));
    }
    rest = &rest[1..]; // the tab after the word

    let mut values = [0u64; 3];
    for (field, value) in values.iter_mut().enumerate() {
        let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        let next = rest.get(digits).copied();
        if digits == 0 && next.is_none_or(|c| c < b' ' && c != b'\t') {
            return Err(missing(field));
        }
        let last = field + 1 == FIELD_NAMES.len();
        match next {
            Some(b'\t') => {}
            // end of line: only allowed after the rank
            None | Some(b'\r' | b'\n' | 0) if last => {}
            Some(byte) if byte >= b' ' || last => {
                return Err(EmulatorError::UnexpectedByte {
                    line_no,
                    field: FIELD_NAMES[field],
                    byte,
                    record: display_record(record),
                });
            }
            _ => return Err(missing(field + 1)),
        }

        *value = std::str::from_utf8(&rest[..digits])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| EmulatorError::InvalidNumber {
                line_no,
                field: FIELD_NAMES[field],
                record: display_record(record),
            })?;
        rest = rest.get(digits + 1..).unwrap_or(&[]);
    }
    Ok(values)
}
