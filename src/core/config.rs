use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Serialize, Deserialize};
use crate::core::error::Result;

/// Indexing-side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Final index file path.
    pub index_path: PathBuf,
    /// Distinct in-memory words allowed before a spill to a partial index.
    pub spill_threshold: usize,
    /// Absolute cap on the number of files a word may occur in.
    /// `u32::MAX` means no cap.
    pub word_file_max: u32,
    /// Percentage-of-corpus cap. Values >= 100 disable the cap.
    pub word_percent_max: u32,
    /// Optional stop-word list file, one word per line.
    pub stopword_file: Option<PathBuf>,
    /// Recurse into subdirectories.
    pub recurse: bool,
    /// Follow symbolic links during traversal.
    pub follow_links: bool,

    // Word acceptance knobs, see analysis::word.
    pub min_word_length: usize,
    pub min_normal_word_length: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        IndexerConfig {
            index_path: PathBuf::from("./skald.idx"),
            spill_threshold: 50_000,
            word_file_max: u32::MAX,
            word_percent_max: 100,
            stopword_file: None,
            recurse: true,
            follow_links: false,
            min_word_length: 2,
            min_normal_word_length: 3,
        }
    }
}

/// Daemon-side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    pub index_path: PathBuf,
    /// TCP listen port; `None` disables the TCP listener.
    pub port: Option<u16>,
    /// Unix-domain socket path; `None` disables the UDS listener.
    pub socket_path: Option<PathBuf>,

    pub min_threads: usize,
    pub max_threads: usize,
    /// Seconds an extra worker waits idle before shrinking away.
    pub idle_timeout_secs: u64,
    /// Seconds a client has to deliver its request line.
    pub socket_timeout_secs: u64,
    /// Default result-count cap when a request does not set one.
    pub max_results: usize,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            index_path: PathBuf::from("./skald.idx"),
            port: Some(7880),
            socket_path: None,
            min_threads: 2,
            max_threads: num_cpus::get().max(2),
            idle_timeout_secs: 30,
            socket_timeout_secs: 10,
            max_results: 20,
        }
    }
}

impl DaemonConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn socket_timeout(&self) -> Duration {
        Duration::from_secs(self.socket_timeout_secs)
    }
}

/// Load a config struct from a JSON file.
pub fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}
