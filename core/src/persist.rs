//! On-disk index layout.
//!
//! The posting store is newline-delimited JSON: one record per term, each
//! record the full `[{doc_id, tf}, ...]` list for that term. Byte offsets
//! recorded in the lexicon are the only way into the file — readers seek
//! to an offset and parse exactly one line. The lexicon, docmap, and
//! metadata sidecars are each a single JSON document.

use crate::{DocId, LexiconEntry, Metadata, Posting};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File layout under an index directory.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn postings(&self) -> PathBuf {
        self.root.join("postings.jsonl")
    }
    pub fn lexicon(&self) -> PathBuf {
        self.root.join("lexicon.json")
    }
    pub fn docmap(&self) -> PathBuf {
        self.root.join("docmap.json")
    }
    pub fn metadata(&self) -> PathBuf {
        self.root.join("metadata.json")
    }
}

/// Append-only writer for the posting store. There is exactly one writer
/// per indexing run; each append reports the byte offset where the record
/// begins, which becomes the term's lexicon offset.
pub struct PostingWriter {
    file: File,
}

impl PostingWriter {
    pub fn create(paths: &IndexPaths) -> Result<Self> {
        create_dir_all(&paths.root)?;
        let file = File::create(paths.postings())?;
        Ok(Self { file })
    }

    pub fn append(&mut self, postings: &[Posting]) -> Result<u64> {
        let offset = self.file.stream_position()?;
        let mut line = serde_json::to_vec(postings)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        Ok(offset)
    }

    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

/// Seek to `offset` in the posting store and deserialize exactly one
/// record. A miss here means a corrupt or mismatched index and is fatal.
pub fn read_postings_at(paths: &IndexPaths, offset: u64) -> Result<Vec<Posting>> {
    let file = File::open(paths.postings())
        .with_context(|| format!("failed to open posting store {}", paths.postings().display()))?;
    let mut reader = BufReader::new(file);
    reader.seek(SeekFrom::Start(offset))?;
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let postings = serde_json::from_str(&line)
        .with_context(|| format!("malformed posting record at offset {offset}"))?;
    Ok(postings)
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut file = File::create(path)?;
    let encoded = serde_json::to_vec(value)?;
    file.write_all(&encoded)?;
    file.sync_all()?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("malformed index file {}", path.display()))?;
    Ok(value)
}

pub fn save_lexicon(paths: &IndexPaths, lexicon: &HashMap<String, LexiconEntry>) -> Result<()> {
    save_json(&paths.lexicon(), lexicon)
}

pub fn load_lexicon(paths: &IndexPaths) -> Result<HashMap<String, LexiconEntry>> {
    load_json(&paths.lexicon())
}

pub fn save_docmap(paths: &IndexPaths, docmap: &HashMap<DocId, u64>) -> Result<()> {
    save_json(&paths.docmap(), docmap)
}

pub fn load_docmap(paths: &IndexPaths) -> Result<HashMap<DocId, u64>> {
    load_json(&paths.docmap())
}

pub fn save_metadata(paths: &IndexPaths, metadata: &Metadata) -> Result<()> {
    save_json(&paths.metadata(), metadata)
}

pub fn load_metadata(paths: &IndexPaths) -> Result<Metadata> {
    load_json(&paths.metadata())
}
