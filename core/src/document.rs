use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A group of `<P>` text lines nested under a corpus element, e.g.
/// `<HEADLINE><P>...</P><P>...</P></HEADLINE>`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Paragraphs {
    #[serde(rename = "P", default)]
    pub lines: Vec<String>,
}

/// One corpus record in the TREC-style markup. Only the id, headline,
/// byline, and body paragraphs feed the tokenizer; the rest of the schema
/// is carried so any corpus file in this shape parses cleanly.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Document {
    #[serde(rename = "DOCID", default)]
    pub id: String,
    #[serde(rename = "DOCNO", default)]
    pub number: String,
    #[serde(rename = "DATE", default)]
    pub date: Paragraphs,
    #[serde(rename = "LENGTH", default)]
    pub length: Paragraphs,
    #[serde(rename = "HEADLINE", default)]
    pub headline: Paragraphs,
    #[serde(rename = "BYLINE", default)]
    pub byline: Paragraphs,
    #[serde(rename = "TEXT", default)]
    pub text: Paragraphs,
    #[serde(rename = "GRAPHIC", default)]
    pub graphic: Paragraphs,
}

impl Document {
    /// Corpus ids carry surrounding whitespace in the markup; everything
    /// downstream keys on the trimmed form.
    pub fn doc_id(&self) -> &str {
        self.id.trim()
    }

    /// The byline is a single `<P>` line in practice; extra lines are
    /// tokenized too if a document carries them.
    pub fn byline_lines(&self) -> &[String] {
        &self.byline.lines
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Corpus {
    #[serde(rename = "DOC", default)]
    pub documents: Vec<Document>,
}

/// Read and parse a corpus file. A malformed file is fatal; there is no
/// partial-corpus recovery.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Corpus> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read corpus file {}", path.display()))?;
    let corpus: Corpus = quick_xml::de::from_str(&contents)
        .with_context(|| format!("failed to parse corpus file {}", path.display()))?;
    Ok(corpus)
}
