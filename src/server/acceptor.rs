use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixListener;
use tracing::{info, warn};
use crate::core::config::DaemonConfig;
use crate::core::error::{Error, ErrorKind, Result};
use crate::pool::{PoolWorker, SubmitResult, ThreadPool};
use crate::server::conn::{Conn, poll_readable_set};

/// Listener front end: binds the configured endpoints, accepts, and hands
/// connections to the pool.
///
/// Submits are non-blocking; when the pool is saturated the connection is
/// reset on the spot rather than queued behind work we cannot start.
pub struct Acceptor {
    tcp: Option<TcpListener>,
    unix: Option<UnixListener>,
}

impl Acceptor {
    pub fn bind(config: &DaemonConfig) -> Result<Self> {
        let tcp = match config.port {
            Some(port) => {
                let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
                let listener = TcpListener::bind(addr).map_err(|e| {
                    Error::new(ErrorKind::Net, format!("cannot bind port {port}: {e}"))
                })?;
                info!(port, "listening on tcp");
                Some(listener)
            }
            None => None,
        };

        let unix = match &config.socket_path {
            Some(path) => {
                // A leftover socket from a previous run would fail the bind.
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
                let listener = UnixListener::bind(path).map_err(|e| {
                    Error::new(
                        ErrorKind::Net,
                        format!("cannot bind socket {}: {}", path.display(), e),
                    )
                })?;
                info!(path = %path.display(), "listening on unix socket");
                Some(listener)
            }
            None => None,
        };

        if tcp.is_none() && unix.is_none() {
            return Err(Error::new(
                ErrorKind::Config,
                "no listen endpoint configured".to_string(),
            ));
        }
        Ok(Acceptor { tcp, unix })
    }

    /// Accept loop; runs until a fatal listener error.
    pub fn run<W>(&self, pool: &ThreadPool<W>) -> Result<()>
    where
        W: PoolWorker<Job = Conn>,
    {
        loop {
            let mut fds = Vec::new();
            if let Some(tcp) = &self.tcp {
                fds.push(tcp.as_raw_fd());
            }
            if let Some(unix) = &self.unix {
                fds.push(unix.as_raw_fd());
            }
            let ready = poll_readable_set(&fds)?;
            let mut at = 0;

            if let Some(tcp) = &self.tcp {
                if ready[at] {
                    match tcp.accept() {
                        Ok((stream, _)) => self.dispatch(pool, Conn::Tcp(stream)),
                        Err(e) if accept_retryable(&e) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                at += 1;
            }
            if let Some(unix) = &self.unix {
                if ready[at] {
                    match unix.accept() {
                        Ok((stream, _)) => self.dispatch(pool, Conn::Unix(stream)),
                        Err(e) if accept_retryable(&e) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }
    }

    fn dispatch<W>(&self, pool: &ThreadPool<W>, conn: Conn)
    where
        W: PoolWorker<Job = Conn>,
    {
        if let SubmitResult::Rejected(conn) = pool.submit(conn, false) {
            warn!("pool saturated, resetting connection");
            conn.reset();
        }
    }
}

/// Accept failures that reflect the lost connection, not the listener.
fn accept_retryable(err: &std::io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::ECONNABORTED) | Some(libc::EINTR) | Some(libc::EPROTO)
    )
}
