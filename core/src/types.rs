use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Document identifiers come straight from the corpus markup (e.g.
/// "LA010189-0001") and are kept as strings throughout.
pub type DocId = String;

/// One document's contribution to a term's posting list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u64,
}

/// Lexicon record for one term: its summed frequency across the whole
/// corpus and the byte offset of its posting record in the posting store.
///
/// Note: `frequency` is the sum of per-document term frequencies, not the
/// number of documents containing the term. BM25 conventionally wants the
/// latter; the summed count is kept on purpose (see search::bm25).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub frequency: u64,
    pub offset: u64,
}

/// Corpus-wide statistics written once at the end of an indexing run.
/// `average_length` is floor(total tokens / corpus_size); the truncation
/// matters because the query engine must see the same value indexing saw.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Metadata {
    pub average_length: u64,
    pub corpus_size: u64,
}

/// Term -> count accumulator, used both for a single document's term
/// frequencies and for the corpus-wide running totals.
#[derive(Debug, Default, Clone)]
pub struct TermCounts(HashMap<String, u64>);

impl TermCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, term: &str, amount: u64) {
        *self.0.entry(term.to_string()).or_insert(0) += amount;
    }

    pub fn get(&self, term: &str) -> u64 {
        self.0.get(term).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_sums_increments() {
        let mut counts = TermCounts::new();
        counts.add("cat", 1);
        counts.add("cat", 1);
        counts.add("sat", 3);
        assert_eq!(counts.get("cat"), 2);
        assert_eq!(counts.get("sat"), 3);
        assert_eq!(counts.get("dog"), 0);
        assert_eq!(counts.len(), 2);
    }
}
