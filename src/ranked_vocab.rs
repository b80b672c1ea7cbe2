use crate::lines::word_len;
use crate::substitution::UniformSource;

/// Emulated corpus vocabulary, most frequent word first.
///
/// Index `i` holds the word of rank `i + 1`. Columns after the word are
/// dropped, as are records with no word; the caller guarantees the file is
/// in frequency order.
pub struct RankedVocabList<'a> {
    words: Vec<&'a [u8]>,
}

impl<'a> RankedVocabList<'a> {
    pub fn new(lines: Vec<&'a [u8]>) -> Self {
        let words = lines
            .into_iter()
            .map(|l| &l[..word_len(l)])
            .filter(|w| !w.is_empty())
            .collect();
        RankedVocabList { words }
    }

    /// Word at 0-origin `index`. Panics if `index >= self.len()`.
    #[inline]
    pub fn word_at(&self, index: usize) -> &'a [u8] {
        self.words[index]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// A uniformly chosen word. The list must not be empty.
    pub fn random_word<D: UniformSource + ?Sized>(&self, draws: &mut D) -> &'a [u8] {
        let index = (draws.draw() * self.words.len() as f64).floor() as usize;
        // tolerate a draw of exactly 1.0
        self.word_at(index.min(self.words.len() - 1))
    }
}
