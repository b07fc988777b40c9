use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use skald::analysis::stopwords::StopWordSet;
use skald::core::config::{IndexerConfig, load_json};
use skald::core::context::IndexerContext;
use skald::core::error::Result;
use skald::index::builder::IndexBuilder;
use skald::walk::{Walker, roots_from_args};

/// Batch full-text indexer: walks the given roots and writes the index
/// file the search daemon serves.
#[derive(Parser, Debug)]
#[command(name = "skald-index", version, about)]
struct Args {
    /// Files or directories to index; a single `-` reads one path per
    /// line from stdin.
    #[arg(required = true)]
    roots: Vec<String>,

    /// JSON config file; command-line flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output index file path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prior index to merge with for an incremental run.
    #[arg(long, value_name = "INDEX")]
    merge: Option<PathBuf>,

    /// Stop-word list file, one word per line.
    #[arg(long, value_name = "FILE")]
    stopwords: Option<PathBuf>,

    /// Distinct in-memory words before spilling a partial index.
    #[arg(long)]
    spill_threshold: Option<usize>,

    /// Drop words occurring in more than this many files.
    #[arg(long)]
    word_file_max: Option<u32>,

    /// Drop words occurring in at least this percent of all files
    /// (values >= 100 disable the cap).
    #[arg(long)]
    word_percent_max: Option<u32>,

    /// Do not descend into subdirectories.
    #[arg(long)]
    no_recurse: bool,

    /// Follow symbolic links during the walk.
    #[arg(long)]
    follow_links: bool,

    /// Log per-file progress in addition to the run summary.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<(IndexerConfig, Vec<String>, Option<PathBuf>)> {
        let mut config: IndexerConfig = match &self.config {
            Some(path) => load_json(path)?,
            None => IndexerConfig::default(),
        };
        if let Some(output) = self.output {
            config.index_path = output;
        }
        if let Some(path) = self.stopwords {
            config.stopword_file = Some(path);
        }
        if let Some(threshold) = self.spill_threshold {
            config.spill_threshold = threshold;
        }
        if let Some(cap) = self.word_file_max {
            config.word_file_max = cap;
        }
        if let Some(cap) = self.word_percent_max {
            config.word_percent_max = cap;
        }
        if self.no_recurse {
            config.recurse = false;
        }
        if self.follow_links {
            config.follow_links = true;
        }
        Ok((config, self.roots, self.merge))
    }
}

fn run(args: Args) -> Result<()> {
    let (config, root_args, merge) = args.into_config()?;
    let roots = roots_from_args(&root_args)?;
    let walker = Walker::new(config.recurse, config.follow_links);

    let mut stop_words = StopWordSet::builtin();
    if let Some(path) = &config.stopword_file {
        stop_words.load_file(path)?;
    }
    let ctx = IndexerContext::new(config, stop_words);
    let mut builder = IndexBuilder::new(ctx);
    if let Some(prior) = &merge {
        builder.with_prior(prior)?;
    }

    for path in walker.collect(&roots)? {
        builder.index_file(&path)?;
    }
    builder.finish()
}

fn main() -> ExitCode {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("skald-index: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
