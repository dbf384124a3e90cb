use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Conventional stoplist location when none is given on the command line.
pub const DEFAULT_STOPLIST: &str = "./stoplist.txt";

/// Words excluded from indexing and querying, loaded from a plain text
/// file with one word per line. Passed explicitly to whichever component
/// needs the membership test.
#[derive(Debug, Default, Clone)]
pub struct Stoplist {
    words: HashSet<String>,
}

impl Stoplist {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open stoplist {}", path.display()))?;
        let mut words = HashSet::new();
        for line in BufReader::new(file).lines() {
            let word = line?.trim().to_string();
            if !word.is_empty() {
                words.insert(word);
            }
        }
        Ok(Self { words })
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}
