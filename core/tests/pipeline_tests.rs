use quarry_core::document::{Corpus, Document, Paragraphs};
use quarry_core::persist::{self, IndexPaths};
use quarry_core::pipeline::build_index;
use quarry_core::stoplist::Stoplist;
use std::collections::{HashMap, HashSet};
use tempfile::tempdir;

fn doc(id: &str, body: &str) -> Document {
    Document {
        id: id.to_string(),
        text: Paragraphs {
            lines: vec![body.to_string()],
        },
        ..Document::default()
    }
}

fn corpus(docs: Vec<Document>) -> Corpus {
    Corpus { documents: docs }
}

#[tokio::test]
async fn two_document_corpus_produces_expected_files() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let stoplist = Stoplist::from_words(["the"]);

    let stats = build_index(
        corpus(vec![doc("A", "the cat sat"), doc("B", "the cat ran")]),
        stoplist,
        &paths,
    )
    .await
    .unwrap();
    assert_eq!(stats.num_docs, 2);
    assert_eq!(stats.num_terms, 3);

    let lexicon = persist::load_lexicon(&paths).unwrap();
    assert_eq!(lexicon.len(), 3);
    assert_eq!(lexicon["cat"].frequency, 2);
    assert_eq!(lexicon["sat"].frequency, 1);
    assert_eq!(lexicon["ran"].frequency, 1);
    assert!(!lexicon.contains_key("the"));

    let docmap = persist::load_docmap(&paths).unwrap();
    assert_eq!(docmap["A"], 2);
    assert_eq!(docmap["B"], 2);

    let metadata = persist::load_metadata(&paths).unwrap();
    assert_eq!(metadata.average_length, 2);
    assert_eq!(metadata.corpus_size, 2);
}

#[tokio::test]
async fn lexicon_offsets_address_complete_posting_records() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());

    build_index(
        corpus(vec![
            doc("A", "cat sat cat"),
            doc("B", "cat ran"),
            doc("C", "dog ran ran"),
        ]),
        Stoplist::default(),
        &paths,
    )
    .await
    .unwrap();

    // expected (doc -> tf) per term
    let mut expected: HashMap<&str, HashMap<&str, u64>> = HashMap::new();
    expected.insert("cat", [("A", 2), ("B", 1)].into_iter().collect());
    expected.insert("sat", [("A", 1)].into_iter().collect());
    expected.insert("ran", [("B", 1), ("C", 2)].into_iter().collect());
    expected.insert("dog", [("C", 1)].into_iter().collect());

    let lexicon = persist::load_lexicon(&paths).unwrap();
    assert_eq!(lexicon.len(), expected.len());

    for (term, want) in &expected {
        let entry = lexicon
            .get(*term)
            .unwrap_or_else(|| panic!("term {term} missing from lexicon"));
        let postings = persist::read_postings_at(&paths, entry.offset).unwrap();
        let got: HashMap<&str, u64> = postings
            .iter()
            .map(|p| (p.doc_id.as_str(), p.tf))
            .collect();
        assert_eq!(&got, want, "postings for term {term}");

        let summed: u64 = want.values().sum();
        assert_eq!(entry.frequency, summed, "corpus frequency for term {term}");
    }
}

#[tokio::test]
async fn lexicon_covers_exactly_the_post_stopword_vocabulary() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let stoplist = Stoplist::from_words(["a", "of"]);

    build_index(
        corpus(vec![
            doc("A", "a tale of two cities"),
            doc("B", "two dogs"),
        ]),
        stoplist,
        &paths,
    )
    .await
    .unwrap();

    let lexicon = persist::load_lexicon(&paths).unwrap();
    let terms: HashSet<&str> = lexicon.keys().map(String::as_str).collect();
    let expected: HashSet<&str> = ["tale", "two", "cities", "dogs"].into_iter().collect();
    assert_eq!(terms, expected);
}

#[tokio::test]
async fn average_length_uses_floor_division() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());

    // lengths 3 and 4 must floor to 3
    build_index(
        corpus(vec![doc("A", "one two three"), doc("B", "one two three four")]),
        Stoplist::default(),
        &paths,
    )
    .await
    .unwrap();

    let metadata = persist::load_metadata(&paths).unwrap();
    assert_eq!(metadata.average_length, 3);
}

#[tokio::test]
async fn reindexing_is_deterministic() {
    let make = || {
        corpus(vec![
            doc("A", "green eggs and ham"),
            doc("B", "green ham again"),
            doc("C", "eggs eggs eggs"),
        ])
    };

    let dir1 = tempdir().unwrap();
    let paths1 = IndexPaths::new(dir1.path());
    build_index(make(), Stoplist::from_words(["and"]), &paths1)
        .await
        .unwrap();

    let dir2 = tempdir().unwrap();
    let paths2 = IndexPaths::new(dir2.path());
    build_index(make(), Stoplist::from_words(["and"]), &paths2)
        .await
        .unwrap();

    // term frequencies and document lengths are identical across runs;
    // posting file record order may differ, so offsets are not compared
    let lex1 = persist::load_lexicon(&paths1).unwrap();
    let lex2 = persist::load_lexicon(&paths2).unwrap();
    assert_eq!(lex1.len(), lex2.len());
    for (term, entry) in &lex1 {
        assert_eq!(entry.frequency, lex2[term].frequency, "term {term}");
    }

    assert_eq!(
        persist::load_docmap(&paths1).unwrap(),
        persist::load_docmap(&paths2).unwrap()
    );

    let meta1 = persist::load_metadata(&paths1).unwrap();
    let meta2 = persist::load_metadata(&paths2).unwrap();
    assert_eq!(meta1.average_length, meta2.average_length);
    assert_eq!(meta1.corpus_size, meta2.corpus_size);
}

#[tokio::test]
async fn document_ids_are_trimmed() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());

    build_index(
        corpus(vec![doc("  A-001  ", "cat")]),
        Stoplist::default(),
        &paths,
    )
    .await
    .unwrap();

    let docmap = persist::load_docmap(&paths).unwrap();
    assert_eq!(docmap["A-001"], 1);
}

#[tokio::test]
async fn empty_corpus_is_a_fatal_error() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let result = build_index(corpus(vec![]), Stoplist::default(), &paths).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn large_corpus_survives_channel_backpressure() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());

    // well past the channel capacity of 250
    let docs: Vec<Document> = (0..600)
        .map(|i| doc(&format!("D{i:04}"), "shared unique term"))
        .collect();
    let stats = build_index(corpus(docs), Stoplist::default(), &paths)
        .await
        .unwrap();
    assert_eq!(stats.num_docs, 600);

    let docmap = persist::load_docmap(&paths).unwrap();
    assert_eq!(docmap.len(), 600);

    let lexicon = persist::load_lexicon(&paths).unwrap();
    assert_eq!(lexicon["shared"].frequency, 600);
    let postings = persist::read_postings_at(&paths, lexicon["shared"].offset).unwrap();
    assert_eq!(postings.len(), 600);
}
