use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use skald::codec::reader::IndexReader;
use skald::core::config::{DaemonConfig, load_json};
use skald::core::error::Result;
use skald::pool::{PoolConfig, ThreadPool};
use skald::server::{Acceptor, SearchWorker};

/// Search daemon: serves queries against a finished index file over TCP
/// and/or a unix-domain socket.
#[derive(Parser, Debug)]
#[command(name = "skald-searchd", version, about)]
struct Args {
    /// JSON config file; command-line flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Index file to serve.
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// TCP listen port (0 disables the TCP listener).
    #[arg(short, long)]
    port: Option<u16>,

    /// Unix-domain socket path to listen on.
    #[arg(long, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Minimum worker threads held ready.
    #[arg(long)]
    min_threads: Option<usize>,

    /// Maximum worker threads the pool may grow to.
    #[arg(long)]
    max_threads: Option<usize>,
}

impl Args {
    fn into_config(self) -> Result<DaemonConfig> {
        let mut config: DaemonConfig = match &self.config {
            Some(path) => load_json(path)?,
            None => DaemonConfig::default(),
        };
        if let Some(index) = self.index {
            config.index_path = index;
        }
        if let Some(port) = self.port {
            config.port = if port == 0 { None } else { Some(port) };
        }
        if let Some(socket) = self.socket {
            config.socket_path = Some(socket);
        }
        if let Some(min) = self.min_threads {
            config.min_threads = min;
        }
        if let Some(max) = self.max_threads {
            config.max_threads = max;
        }
        Ok(config)
    }
}

fn run(args: Args) -> Result<()> {
    let config = Arc::new(args.into_config()?);

    let reader = Arc::new(IndexReader::open(&config.index_path)?);
    info!(
        index = %config.index_path.display(),
        words = reader.word_count(),
        files = reader.file_count(),
        "index mapped"
    );

    let pool = ThreadPool::new(
        SearchWorker::new(Arc::clone(&reader), Arc::clone(&config)),
        PoolConfig::new(config.min_threads, config.max_threads, config.idle_timeout()),
    );

    let acceptor = Acceptor::bind(&config)?;
    acceptor.run(&pool)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("skald-searchd: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
