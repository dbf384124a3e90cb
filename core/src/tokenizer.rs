use crate::document::Document;
use crate::stoplist::Stoplist;
use crate::TermCounts;

/// Tokenizer output for one document: the surviving tokens in document
/// order (headline, byline, then body paragraphs) and their frequencies.
/// The token count — the document's length — is `tokens.len()`.
#[derive(Debug)]
pub struct TokenizedDocument {
    pub tokens: Vec<String>,
    pub counts: TermCounts,
}

/// Tokenize one document: strip embedded newlines, lowercase, split on
/// single spaces, trim each token, and drop stopwords. There is no
/// stemming and no punctuation handling, so "sat" and "sat." are distinct
/// terms. Whether punctuation should fold into the bare term is an open
/// tokenization question, tracked rather than fixed here.
pub fn tokenize(doc: &Document, stoplist: &Stoplist) -> TokenizedDocument {
    let mut tokens = Vec::new();

    for line in &doc.headline.lines {
        tokenize_unit(line, stoplist, &mut tokens);
    }
    for line in doc.byline_lines() {
        tokenize_unit(line, stoplist, &mut tokens);
    }
    for paragraph in &doc.text.lines {
        tokenize_unit(paragraph, stoplist, &mut tokens);
    }

    let mut counts = TermCounts::new();
    for token in &tokens {
        counts.add(token, 1);
    }

    TokenizedDocument { tokens, counts }
}

fn tokenize_unit(text: &str, stoplist: &Stoplist, tokens: &mut Vec<String>) {
    let stripped = text.replace('\n', "");
    for word in stripped.to_lowercase().split(' ') {
        let word = word.trim();
        if word.is_empty() || stoplist.contains(word) {
            continue;
        }
        tokens.push(word.to_string());
    }
}
