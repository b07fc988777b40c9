use std::io::Write;
use std::sync::Arc;
use tracing::debug;
use crate::codec::reader::IndexReader;
use crate::core::config::DaemonConfig;
use crate::core::error::Result;
use crate::core::types::MetaId;
use crate::pool::PoolWorker;
use crate::search::{QueryEvaluator, format_response};
use crate::server::conn::Conn;
use crate::server::request::Request;

/// Per-connection request handler run on pool threads.
///
/// The pool clones one prototype per worker; the index reader and config
/// are shared behind `Arc`, so clones are cheap and all workers serve the
/// same mapped index.
#[derive(Clone)]
pub struct SearchWorker {
    pub reader: Arc<IndexReader>,
    pub config: Arc<DaemonConfig>,
}

impl SearchWorker {
    pub fn new(reader: Arc<IndexReader>, config: Arc<DaemonConfig>) -> Self {
        SearchWorker { reader, config }
    }

    /// Read, evaluate, and answer one request line.
    ///
    /// Response: `# ignored:` line when stop words were dropped, a
    /// `# results: N` line, then one `rank path size title` line per hit.
    fn serve(&self, conn: &mut Conn) -> Result<()> {
        let line = conn.read_line_deadline(self.config.socket_timeout())?;
        let request = Request::parse(&line)?;

        let meta = match &request.meta {
            Some(name) => match self.reader.find_meta(name)? {
                Some(id) => Some(MetaId(id)),
                // Unknown meta name matches nothing.
                None => {
                    conn.write_all(b"# results: 0\n")?;
                    conn.flush()?;
                    return Ok(());
                }
            },
            None => None,
        };

        let max = request.max_results.unwrap_or(self.config.max_results);
        let evaluator = QueryEvaluator::new(&self.reader, max);
        let outcome = evaluator.evaluate(&request.words, meta)?;

        let response = format_response(&outcome);
        conn.write_all(response.as_bytes())?;
        conn.flush()?;
        Ok(())
    }
}

impl PoolWorker for SearchWorker {
    type Job = Conn;

    fn run(&mut self, mut conn: Conn) {
        match self.serve(&mut conn) {
            Ok(()) => {
                // Clean close; drop sends FIN after the response.
            }
            Err(err) => {
                debug!(error = %err, "resetting connection");
                conn.reset();
            }
        }
    }
}
