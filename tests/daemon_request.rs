use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use skald::codec::reader::IndexReader;
use skald::codec::writer::IndexFileWriter;
use skald::core::config::DaemonConfig;
use skald::core::types::{FileIndex, FileOccurrence, FileRecord};
use skald::pool::PoolWorker;
use skald::server::{Conn, SearchWorker};

fn occ(file: u32, rank: u32) -> FileOccurrence {
    FileOccurrence {
        file: FileIndex(file),
        metas: vec![],
        count: 1,
        rank,
    }
}

fn write_fixture_index(path: &Path) {
    let mut writer = IndexFileWriter::create(path, [2, 1, 2, 0]).unwrap();
    writer.write_word("alpha", &[occ(0, 100), occ(1, 40)]).unwrap();
    writer.write_word("beta", &[occ(1, 60)]).unwrap();
    writer.write_stop_word("the").unwrap();
    for (i, name) in ["one.txt", "two.txt"].iter().enumerate() {
        let mut record = FileRecord::new(
            FileIndex(i as u32),
            PathBuf::from(name),
            10,
            name.to_string(),
        );
        record.word_count = 5;
        writer.write_file(&record).unwrap();
    }
    writer.finish().unwrap();
}

/// One worker serving one accepted connection, no pool involved.
fn serve_one(index: &Path, timeout_secs: u64) -> (TcpStream, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let reader = Arc::new(IndexReader::open(index).unwrap());
    let mut config = DaemonConfig::default();
    config.socket_timeout_secs = timeout_secs;
    let mut worker = SearchWorker::new(reader, Arc::new(config));

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        worker.run(Conn::Tcp(stream));
    });
    (TcpStream::connect(addr).unwrap(), handle)
}

#[test]
fn answers_a_query_line() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("fixture.idx");
    write_fixture_index(&index);

    let (mut client, handle) = serve_one(&index, 5);
    client.write_all(b"alpha beta\n").unwrap();

    let mut response = String::new();
    client.read_to_string(&mut response).unwrap();
    handle.join().unwrap();

    let lines: Vec<&str> = response.lines().collect();
    assert_eq!(lines[0], "# results: 2");
    // File 0 scores 100, file 1 scores 40 + 60; equal scores order by
    // file index.
    assert_eq!(lines[1], "100 one.txt 10 one.txt");
    assert_eq!(lines[2], "100 two.txt 10 two.txt");
}

#[test]
fn reports_ignored_stop_words() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("fixture.idx");
    write_fixture_index(&index);

    let (mut client, handle) = serve_one(&index, 5);
    client.write_all(b"the alpha\n").unwrap();

    let mut response = String::new();
    client.read_to_string(&mut response).unwrap();
    handle.join().unwrap();

    let lines: Vec<&str> = response.lines().collect();
    assert_eq!(lines[0], "# ignored: the");
    assert_eq!(lines[1], "# results: 2");
}

#[test]
fn silent_client_is_reset_after_the_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("fixture.idx");
    write_fixture_index(&index);

    let (mut client, handle) = serve_one(&index, 1);
    // Send nothing; the worker must give up on its own.
    let start = Instant::now();
    let mut buf = [0u8; 64];
    let result = client.read(&mut buf);
    handle.join().unwrap();

    // The reset shows up as either an error or an immediate EOF, and it
    // arrives once the timeout fires, not sooner.
    assert!(start.elapsed() >= Duration::from_millis(900));
    match result {
        Ok(0) => {}
        Ok(n) => panic!("unexpected {n} response bytes"),
        Err(_) => {}
    }
}

#[test]
fn non_ascii_request_is_reset() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("fixture.idx");
    write_fixture_index(&index);

    let (mut client, handle) = serve_one(&index, 5);
    client.write_all("caf\u{e9}\n".as_bytes()).unwrap();

    let mut buf = Vec::new();
    let _ = client.read_to_end(&mut buf);
    handle.join().unwrap();
    assert!(buf.is_empty());
}

#[test]
fn over_long_unterminated_line_is_reset() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("fixture.idx");
    write_fixture_index(&index);

    let (mut client, handle) = serve_one(&index, 5);
    // Past the request-line cap with no terminator in sight.
    client.write_all(&[b'a'; 5000]).unwrap();

    let mut buf = Vec::new();
    let _ = client.read_to_end(&mut buf);
    handle.join().unwrap();
    // The worker gives up on the line and resets without a response.
    assert!(buf.is_empty());
}

#[test]
fn malformed_request_gets_no_results() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("fixture.idx");
    write_fixture_index(&index);

    let (mut client, handle) = serve_one(&index, 5);
    client.write_all(b"alpha -z\n").unwrap();

    let mut buf = Vec::new();
    let _ = client.read_to_end(&mut buf);
    handle.join().unwrap();
    // The connection is reset without a response line.
    assert!(buf.is_empty());
}
