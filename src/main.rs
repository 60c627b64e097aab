mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use qrank::{
    EvalContext, Feedback, FeedbackParams, MemoryIndex, PostingSource, RetrievalModel,
    SimpleAnalyzer,
};
use std::fs;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = cli::Cli::parse();
    match cli.command {
        cli::Commands::Search {
            index,
            query,
            model,
            param,
            top_k,
            fb,
            fb_docs,
            fb_terms,
            fb_mu,
            fb_orig_weight,
            fb_initial_ranking,
        } => {
            let corpus = fs::read_to_string(&index)
                .with_context(|| format!("reading corpus {}", index.display()))?;
            let index = MemoryIndex::from_json(&corpus).context("parsing corpus JSON")?;

            let mut model: RetrievalModel = model.parse().map_err(anyhow::Error::msg)?;
            for pair in &param {
                let Some((name, value)) = pair.split_once('=') else {
                    bail!("expected name=value, got: {pair}");
                };
                let value: f64 = value.parse().with_context(|| format!("parsing {pair}"))?;
                model.set_parameter(name, value);
            }

            let feedback = if fb {
                let params = FeedbackParams {
                    fb_docs,
                    fb_terms,
                    fb_mu,
                    fb_orig_weight,
                };
                let mut expander = Feedback::new(params, &model)?;
                if let Some(path) = &fb_initial_ranking {
                    let text = fs::read_to_string(path)
                        .with_context(|| format!("reading ranking {}", path.display()))?;
                    expander = expander
                        .with_initial_rankings(Feedback::parse_initial_rankings(&text, fb_docs));
                }
                Some(expander)
            } else {
                None
            };

            let analyzer = SimpleAnalyzer::new();
            let ctx = EvalContext::new(&index, &index, model);
            for (i, raw) in query.iter().enumerate() {
                let (query_id, text) = match raw.split_once(':') {
                    Some((id, text)) => (id.to_string(), text),
                    None => ((i + 1).to_string(), raw.as_str()),
                };
                let tree = qrank::parse(text, &model, &analyzer)?;
                let mut ranked = match &feedback {
                    Some(expander) => expander.expand(&tree, &query_id, &ctx)?.scores,
                    None => ctx.evaluate(&tree)?,
                };
                ranked.truncate(top_k);

                for (rank, entry) in ranked.iter().enumerate() {
                    let external = index
                        .external_id(entry.doc_id)
                        .unwrap_or_else(|| entry.doc_id.to_string());
                    println!("{query_id} {external} {} {:.6}", rank + 1, entry.score);
                }
            }
        }

        cli::Commands::Stats { index } => {
            let corpus = fs::read_to_string(&index)
                .with_context(|| format!("reading corpus {}", index.display()))?;
            let index = MemoryIndex::from_json(&corpus).context("parsing corpus JSON")?;
            println!("documents: {}", index.num_docs());
            for field in qrank::Field::ALL {
                println!(
                    "{:<9} docs={:<6} tokens={:<8} vocab={}",
                    field.as_str(),
                    index.doc_count(field),
                    index.total_tokens(field),
                    index.vocab_size(field),
                );
            }
        }
    }
    Ok(())
}
