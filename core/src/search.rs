//! Query engine.
//!
//! Each call loads the lexicon, docmap, and metadata fresh from disk,
//! seeks the posting store once per query term, scores with BM25, and
//! ranks. No caching and no shared state, so concurrent queries are
//! trivially independent; the per-call reload is a known scaling limit
//! for large indexes.
//!
//! Two scoring behaviors are deliberate and carried from the original
//! ranking design, pending confirmation before any change:
//! - `bm25` receives the term's summed corpus frequency where canonical
//!   BM25 uses the distinct-document count.
//! - when a document matches several query terms, the last processed
//!   term's score replaces earlier ones instead of summing.

use crate::persist::{self, IndexPaths};
use crate::stoplist::Stoplist;
use crate::DocId;
use anyhow::Result;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Instant;

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// Ranked hits are truncated to this many documents.
pub const MAX_RESULTS: usize = 10;

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: DocId,
    pub relevance: f64,
}

#[derive(Debug, Serialize)]
pub struct QueryResults {
    pub documents: Vec<SearchHit>,
    pub total_results: u64,
    pub processing_time: String,
}

/// Okapi BM25 (https://en.wikipedia.org/wiki/Okapi_BM25#The_ranking_function).
///
/// `term_freq` is the term's frequency across the entire corpus (the
/// lexicon frequency), `doc_freq` its frequency within the document being
/// scored. When `term_freq` approaches the corpus size the idf goes
/// negative; that is well-defined and simply ranks the document low.
pub fn bm25(
    term_freq: f64,
    doc_freq: f64,
    doc_length: f64,
    avg_doc_length: f64,
    corpus_size: f64,
) -> f64 {
    let n = corpus_size;
    let idf = ((n - term_freq + 0.5) / (term_freq + 0.5)).ln();
    let k = K1 * ((1.0 - B) + B * (doc_length / avg_doc_length));
    idf * ((K1 + 1.0) * doc_freq) / (k + doc_freq)
}

/// Run one free-text query: space-delimited terms, lowercased and
/// stopword-filtered with the same stoplist used at indexing time.
/// Returns the top [`MAX_RESULTS`] documents by descending score plus the
/// pre-truncation match count.
pub fn search(paths: &IndexPaths, query: &str, stoplist: &Stoplist) -> Result<QueryResults> {
    let start = Instant::now();

    let scores = score_query(paths, query, stoplist)?;
    let mut documents: Vec<SearchHit> = scores
        .into_iter()
        .map(|(id, relevance)| SearchHit { id, relevance })
        .collect();
    documents.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(Ordering::Equal)
    });
    let total_results = documents.len() as u64;
    documents.truncate(MAX_RESULTS);

    Ok(QueryResults {
        documents,
        total_results,
        processing_time: format!("{:?}", start.elapsed()),
    })
}

fn score_query(
    paths: &IndexPaths,
    query: &str,
    stoplist: &Stoplist,
) -> Result<HashMap<DocId, f64>> {
    let metadata = persist::load_metadata(paths)?;
    let lexicon = persist::load_lexicon(paths)?;
    let docmap = persist::load_docmap(paths)?;

    let mut scores: HashMap<DocId, f64> = HashMap::new();
    for term in query.split(' ') {
        let term = term.trim().to_lowercase();
        if term.is_empty() || stoplist.contains(&term) {
            continue;
        }
        // a term the corpus never produced simply contributes nothing
        let Some(entry) = lexicon.get(&term) else {
            continue;
        };

        let postings = persist::read_postings_at(paths, entry.offset)?;
        for posting in postings {
            let doc_length = docmap.get(&posting.doc_id).copied().unwrap_or(0);
            let score = bm25(
                entry.frequency as f64,
                posting.tf as f64,
                doc_length as f64,
                metadata.average_length as f64,
                metadata.corpus_size as f64,
            );
            // replaces any score from an earlier query term (see module docs)
            scores.insert(posting.doc_id, score);
        }
    }
    Ok(scores)
}
