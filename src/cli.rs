use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "qrank",
    about = "Structured query evaluation over an in-memory inverted index",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate queries against a JSON corpus and print ranked results
    Search {
        /// Path to a JSON array of corpus documents
        #[arg(short, long)]
        index: PathBuf,

        /// Query, either `id:text` or bare text (repeatable)
        #[arg(short, long, required = true)]
        query: Vec<String>,

        /// Retrieval model: UnrankedBoolean, RankedBoolean, BM25, Indri
        #[arg(short, long, default_value = "bm25")]
        model: String,

        /// Model parameter override, `name=value` (repeatable)
        #[arg(short, long)]
        param: Vec<String>,

        /// Number of results to keep per query
        #[arg(long, default_value_t = 100)]
        top_k: usize,

        /// Enable pseudo-relevance feedback (Indri only)
        #[arg(long)]
        fb: bool,

        /// Feedback: seed documents to mine
        #[arg(long, default_value_t = 10)]
        fb_docs: usize,

        /// Feedback: expansion terms to keep
        #[arg(long, default_value_t = 10)]
        fb_terms: usize,

        /// Feedback: Dirichlet prior for expansion-term probabilities
        #[arg(long, default_value_t = 0.0)]
        fb_mu: f64,

        /// Feedback: weight of the original query in the combined tree
        #[arg(long, default_value_t = 0.5)]
        fb_orig_weight: f64,

        /// Feedback: precomputed initial ranking file
        #[arg(long)]
        fb_initial_ranking: Option<PathBuf>,
    },

    /// Print collection statistics for a JSON corpus
    Stats {
        /// Path to a JSON array of corpus documents
        #[arg(short, long)]
        index: PathBuf,
    },
}
