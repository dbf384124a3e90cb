//! Indexing pipeline.
//!
//! One tokenizer task per document fans out into four long-lived
//! aggregator tasks over bounded channels. Shutdown runs in two phases:
//! the coordinator broadcasts `parsing_done` once every tokenizer task has
//! finished; only the posting aggregator listens for it. Its flush assigns
//! the byte offsets that lexicon entries need, so only after the posting
//! file is written and synced does it broadcast `posting_done`, which
//! releases the lexicon, docmap, and metadata flushes. Every send strictly
//! precedes the signal its receiver finalizes on, so each aggregator can
//! drain its queue after the signal and know it has seen everything.

use crate::document::{Corpus, Document};
use crate::persist::{self, IndexPaths, PostingWriter};
use crate::stoplist::Stoplist;
use crate::tokenizer;
use crate::{DocId, LexiconEntry, Metadata, Posting, TermCounts};
use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

/// Tokenizer tasks block when an aggregator falls this far behind.
const CHANNEL_CAPACITY: usize = 250;

/// One tokenized document headed for the posting aggregator.
struct PostingEntry {
    doc_id: DocId,
    counts: TermCounts,
}

/// One document's length headed for the docmap aggregator.
struct DocLength {
    doc_id: DocId,
    length: u64,
}

/// Emitted by the posting aggregator during its flush, once the term's
/// byte offset is known.
struct LexiconRecord {
    term: String,
    entry: LexiconEntry,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexStats {
    pub num_docs: u64,
    pub num_terms: u64,
    pub average_length: u64,
}

/// Build the full on-disk index for a corpus. Returns only after all four
/// index files are written and synced.
pub async fn build_index(
    corpus: Corpus,
    stoplist: Stoplist,
    paths: &IndexPaths,
) -> Result<IndexStats> {
    let (posting_tx, posting_rx) = mpsc::channel::<PostingEntry>(CHANNEL_CAPACITY);
    let (docmap_tx, docmap_rx) = mpsc::channel::<DocLength>(CHANNEL_CAPACITY);
    let (doc_length_tx, doc_length_rx) = mpsc::channel::<u64>(CHANNEL_CAPACITY);
    let (lexicon_tx, lexicon_rx) = mpsc::channel::<LexiconRecord>(CHANNEL_CAPACITY);
    let (corpus_size_tx, corpus_size_rx) = mpsc::channel::<u64>(1);
    let (parsing_done_tx, parsing_done_rx) = watch::channel(false);
    let (posting_done_tx, posting_done_rx) = watch::channel(false);

    let posting_task = tokio::spawn(posting_aggregator(
        posting_rx,
        parsing_done_rx,
        lexicon_tx,
        posting_done_tx,
        paths.clone(),
    ));
    let lexicon_task = tokio::spawn(lexicon_aggregator(
        lexicon_rx,
        posting_done_rx.clone(),
        paths.clone(),
    ));
    let docmap_task = tokio::spawn(docmap_aggregator(
        docmap_rx,
        posting_done_rx.clone(),
        paths.clone(),
    ));
    let metadata_task = tokio::spawn(metadata_aggregator(
        doc_length_rx,
        corpus_size_rx,
        posting_done_rx,
        paths.clone(),
    ));

    // one tokenizer task per document; documents are independent and share
    // no mutable state
    let stoplist = Arc::new(stoplist);
    let mut parse_tasks = JoinSet::new();
    let mut num_docs: u64 = 0;
    for doc in corpus.documents {
        num_docs += 1;
        parse_tasks.spawn(parse_document(
            doc,
            Arc::clone(&stoplist),
            posting_tx.clone(),
            docmap_tx.clone(),
            doc_length_tx.clone(),
        ));
    }
    drop(posting_tx);
    drop(docmap_tx);
    drop(doc_length_tx);

    // parse barrier: every document must be tokenized and delivered before
    // the first shutdown phase begins
    while let Some(joined) = parse_tasks.join_next().await {
        joined??;
    }

    corpus_size_tx
        .send(num_docs)
        .await
        .map_err(|_| anyhow!("metadata aggregator stopped before corpus size was sent"))?;
    drop(corpus_size_tx);

    parsing_done_tx
        .send(true)
        .map_err(|_| anyhow!("posting aggregator stopped before parsing completed"))?;

    let num_terms = posting_task.await??;
    lexicon_task.await??;
    docmap_task.await??;
    let metadata = metadata_task.await??;

    tracing::info!(num_docs, num_terms, "indexing pipeline complete");
    Ok(IndexStats {
        num_docs,
        num_terms,
        average_length: metadata.average_length,
    })
}

async fn parse_document(
    doc: Document,
    stoplist: Arc<Stoplist>,
    posting_tx: mpsc::Sender<PostingEntry>,
    docmap_tx: mpsc::Sender<DocLength>,
    doc_length_tx: mpsc::Sender<u64>,
) -> Result<()> {
    let doc_id = doc.doc_id().to_string();
    let tokenized = tokenizer::tokenize(&doc, &stoplist);
    let length = tokenized.tokens.len() as u64;

    posting_tx
        .send(PostingEntry {
            doc_id: doc_id.clone(),
            counts: tokenized.counts,
        })
        .await
        .map_err(|_| anyhow!("posting aggregator stopped"))?;
    docmap_tx
        .send(DocLength { doc_id, length })
        .await
        .map_err(|_| anyhow!("docmap aggregator stopped"))?;
    doc_length_tx
        .send(length)
        .await
        .map_err(|_| anyhow!("metadata aggregator stopped"))?;
    Ok(())
}

/// Accumulates per-term posting lists and the corpus-wide term totals.
/// On `parsing_done` it writes the posting store, recording each record's
/// byte offset, emits one lexicon record per term, syncs the file, and
/// broadcasts `posting_done`. Returns the number of distinct terms.
async fn posting_aggregator(
    mut rx: mpsc::Receiver<PostingEntry>,
    mut parsing_done: watch::Receiver<bool>,
    lexicon_tx: mpsc::Sender<LexiconRecord>,
    posting_done: watch::Sender<bool>,
    paths: IndexPaths,
) -> Result<u64> {
    fn accumulate(
        entry: PostingEntry,
        postings: &mut HashMap<String, Vec<Posting>>,
        corpus_tf: &mut TermCounts,
    ) {
        for (term, freq) in entry.counts.iter() {
            corpus_tf.add(term, *freq);
            postings.entry(term.clone()).or_default().push(Posting {
                doc_id: entry.doc_id.clone(),
                tf: *freq,
            });
        }
    }

    let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
    let mut corpus_tf = TermCounts::new();

    loop {
        tokio::select! {
            biased;
            Some(entry) = rx.recv() => accumulate(entry, &mut postings, &mut corpus_tf),
            changed = parsing_done.changed() => {
                changed?;
                break;
            }
        }
    }
    while let Ok(entry) = rx.try_recv() {
        accumulate(entry, &mut postings, &mut corpus_tf);
    }

    // flush: iteration order over terms is arbitrary; only the recorded
    // offsets matter
    let mut writer = PostingWriter::create(&paths)?;
    let mut num_terms: u64 = 0;
    for (term, list) in &postings {
        let offset = writer.append(list)?;
        lexicon_tx
            .send(LexiconRecord {
                term: term.clone(),
                entry: LexiconEntry {
                    frequency: corpus_tf.get(term),
                    offset,
                },
            })
            .await
            .map_err(|_| anyhow!("lexicon aggregator stopped"))?;
        num_terms += 1;
    }
    writer.sync()?;
    drop(lexicon_tx);

    posting_done
        .send(true)
        .map_err(|_| anyhow!("no aggregator is waiting on the posting flush"))?;
    Ok(num_terms)
}

async fn lexicon_aggregator(
    mut rx: mpsc::Receiver<LexiconRecord>,
    mut posting_done: watch::Receiver<bool>,
    paths: IndexPaths,
) -> Result<()> {
    let mut lexicon: HashMap<String, LexiconEntry> = HashMap::new();
    loop {
        tokio::select! {
            biased;
            Some(record) = rx.recv() => {
                lexicon.insert(record.term, record.entry);
            }
            changed = posting_done.changed() => {
                changed?;
                break;
            }
        }
    }
    while let Ok(record) = rx.try_recv() {
        lexicon.insert(record.term, record.entry);
    }

    persist::save_lexicon(&paths, &lexicon)?;
    tracing::debug!(num_terms = lexicon.len(), "lexicon written");
    Ok(())
}

async fn docmap_aggregator(
    mut rx: mpsc::Receiver<DocLength>,
    mut posting_done: watch::Receiver<bool>,
    paths: IndexPaths,
) -> Result<()> {
    let mut docmap: HashMap<DocId, u64> = HashMap::new();
    loop {
        tokio::select! {
            biased;
            Some(entry) = rx.recv() => {
                docmap.insert(entry.doc_id, entry.length);
            }
            changed = posting_done.changed() => {
                changed?;
                break;
            }
        }
    }
    while let Ok(entry) = rx.try_recv() {
        docmap.insert(entry.doc_id, entry.length);
    }

    persist::save_docmap(&paths, &docmap)?;
    tracing::debug!(num_docs = docmap.len(), "docmap written");
    Ok(())
}

async fn metadata_aggregator(
    mut doc_length_rx: mpsc::Receiver<u64>,
    mut corpus_size_rx: mpsc::Receiver<u64>,
    mut posting_done: watch::Receiver<bool>,
    paths: IndexPaths,
) -> Result<Metadata> {
    let mut total_tokens: u64 = 0;
    let mut corpus_size: u64 = 0;
    loop {
        tokio::select! {
            biased;
            Some(length) = doc_length_rx.recv() => total_tokens += length,
            Some(size) = corpus_size_rx.recv() => corpus_size = size,
            changed = posting_done.changed() => {
                changed?;
                break;
            }
        }
    }
    while let Ok(length) = doc_length_rx.try_recv() {
        total_tokens += length;
    }
    while let Ok(size) = corpus_size_rx.try_recv() {
        corpus_size = size;
    }

    if corpus_size == 0 {
        bail!("cannot index an empty corpus");
    }
    // floor division; the query engine depends on the truncated value
    let metadata = Metadata {
        average_length: total_tokens / corpus_size,
        corpus_size,
    };
    persist::save_metadata(&paths, &metadata)?;
    Ok(metadata)
}
