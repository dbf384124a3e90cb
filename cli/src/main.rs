use anyhow::Result;
use clap::{Parser, Subcommand};
use quarry_core::document;
use quarry_core::persist::IndexPaths;
use quarry_core::pipeline;
use quarry_core::search;
use quarry_core::stoplist::{Stoplist, DEFAULT_STOPLIST};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Build and query a BM25 inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the on-disk index from a corpus file
    Index {
        /// Corpus file in TREC-style markup
        #[arg(long)]
        corpus: String,
        /// Output index directory
        #[arg(long, default_value = "./index")]
        output: String,
        /// Stoplist file, one word per line
        #[arg(long, default_value = DEFAULT_STOPLIST)]
        stoplist: String,
    },
    /// Run a free-text query against an existing index
    Search {
        /// Space-delimited query terms
        query: String,
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: String,
        /// Stoplist file, one word per line
        #[arg(long, default_value = DEFAULT_STOPLIST)]
        stoplist: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            corpus,
            output,
            stoplist,
        } => {
            let start = Instant::now();
            let stoplist = Stoplist::load(&stoplist)?;
            let corpus = document::load_corpus(&corpus)?;
            tracing::info!(documents = corpus.documents.len(), "corpus loaded");
            let paths = IndexPaths::new(&output);
            let stats = pipeline::build_index(corpus, stoplist, &paths).await?;
            println!(
                "Indexed {} documents in {:?}",
                stats.num_docs,
                start.elapsed()
            );
        }
        Commands::Search {
            query,
            index,
            stoplist,
        } => {
            let stoplist = Stoplist::load(&stoplist)?;
            let paths = IndexPaths::new(&index);
            let results = search::search(&paths, &query, &stoplist)?;

            println!("Doc Id | Relevance");
            println!("------------------");
            for hit in &results.documents {
                println!("{} : {}", hit.id, hit.relevance);
            }
            println!(
                "Returning {} of {} documents that match your query: {}",
                results.documents.len(),
                results.total_results,
                query
            );
            println!("Query processed in {}", results.processing_time);
        }
    }
    Ok(())
}
