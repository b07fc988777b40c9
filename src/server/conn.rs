use std::io::{Read, Write};
use std::net::TcpStream;
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::time::{Duration, Instant};
use crate::core::error::{Error, ErrorKind, Result};

/// Longest request line the daemon will buffer before giving up on the
/// client.
pub const MAX_REQUEST_LINE: usize = 4096;

/// One accepted connection, TCP or Unix-domain.
pub enum Conn {
    Tcp(TcpStream),
    Unix(UnixStream),
}

impl Conn {
    pub fn as_raw_fd(&self) -> RawFd {
        match self {
            Conn::Tcp(s) => s.as_raw_fd(),
            Conn::Unix(s) => s.as_raw_fd(),
        }
    }

    /// Abort the connection instead of closing it cleanly.
    ///
    /// For TCP this arms `SO_LINGER` with a zero timeout so the close
    /// emits an RST; a misbehaving or overload-triggering client gets no
    /// further I/O from us. Unix-domain sockets have no equivalent and are
    /// simply dropped.
    pub fn reset(self) {
        if let Conn::Tcp(stream) = &self {
            let linger = libc::linger {
                l_onoff: 1,
                l_linger: 0,
            };
            unsafe {
                libc::setsockopt(
                    stream.as_raw_fd(),
                    libc::SOL_SOCKET,
                    libc::SO_LINGER,
                    &linger as *const libc::linger as *const libc::c_void,
                    std::mem::size_of::<libc::linger>() as libc::socklen_t,
                );
            }
        }
    }

    /// Read one request line terminated by CR or LF under a wall-clock
    /// deadline.
    ///
    /// A line may arrive across several small reads, so the readiness wait
    /// runs with a shrinking timeout recomputed from elapsed time rather
    /// than a one-shot socket timeout.
    pub fn read_line_deadline(&mut self, timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;
        let mut buf: Vec<u8> = Vec::new();
        let fd = self.as_raw_fd();

        loop {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or_else(|| Error::new(ErrorKind::Io, "request timed out".to_string()))?;

            if !poll_readable(fd, remaining)? {
                return Err(Error::new(ErrorKind::Io, "request timed out".to_string()));
            }

            let mut chunk = [0u8; 512];
            let n = match self {
                Conn::Tcp(s) => s.read(&mut chunk)?,
                Conn::Unix(s) => s.read(&mut chunk)?,
            };
            if n == 0 {
                return Err(Error::new(
                    ErrorKind::Io,
                    "connection closed before request line".to_string(),
                ));
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.iter().position(|&b| b == b'\n' || b == b'\r') {
                let line = &buf[..end];
                if !line.is_ascii() {
                    return Err(Error::new(
                        ErrorKind::InvalidArgument,
                        "request is not ASCII text".to_string(),
                    ));
                }
                return Ok(String::from_utf8_lossy(line).into_owned());
            }
            if buf.len() > MAX_REQUEST_LINE {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    "request line too long".to_string(),
                ));
            }
        }
    }
}

impl Write for Conn {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        match self {
            Conn::Tcp(s) => s.write(data),
            Conn::Unix(s) => s.write(data),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Conn::Tcp(s) => s.flush(),
            Conn::Unix(s) => s.flush(),
        }
    }
}

/// Wait for `fd` to become readable, retrying on EINTR. Returns false on
/// timeout.
pub fn poll_readable(fd: RawFd, timeout: Duration) -> Result<bool> {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = timeout.as_millis().min(i32::MAX as u128) as libc::c_int;

    loop {
        let rc = unsafe { libc::poll(&mut pollfd, 1, millis) };
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err.into());
        }
        return Ok(rc > 0);
    }
}

/// Block until at least one of `fds` is readable; EINTR retries the wait.
/// Returns one readiness flag per fd.
pub fn poll_readable_set(fds: &[RawFd]) -> Result<Vec<bool>> {
    let mut pollfds: Vec<libc::pollfd> = fds
        .iter()
        .map(|&fd| libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        })
        .collect();

    loop {
        let rc = unsafe { libc::poll(pollfds.as_mut_ptr(), pollfds.len() as libc::nfds_t, -1) };
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err.into());
        }
        return Ok(pollfds.iter().map(|p| p.revents & libc::POLLIN != 0).collect());
    }
}
