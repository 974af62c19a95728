//! End-to-end tests over TCP
//!
//! Each test starts a server on an ephemeral port backed by a temp
//! directory, talks to it with `Client`, then shuts it down.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use colldb::config::ConfigBuilder;
use colldb::network::{Server, ShutdownHandle, TOO_MANY_CONNECTIONS};
use colldb::{Client, CollError, Config, Engine};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    temp: TempDir,
    addr: SocketAddr,
    handle: ShutdownHandle,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start() -> Self {
        Self::start_with(|builder| builder)
    }

    fn start_with(tune: impl FnOnce(ConfigBuilder) -> ConfigBuilder) -> Self {
        let temp = TempDir::new().unwrap();
        let builder = Config::builder()
            .data_dir(temp.path())
            .listen_addr("127.0.0.1:0")
            .sync_writes(false);
        let config = tune(builder).build();
        let engine = Arc::new(Engine::open(config.clone()).unwrap());
        let server = Server::bind(config, engine).unwrap();

        let addr = server.local_addr().unwrap();
        let handle = server.shutdown_handle().unwrap();
        let thread = thread::spawn(move || server.run().unwrap());

        Self {
            temp,
            addr,
            handle,
            thread: Some(thread),
        }
    }

    fn client(&self) -> Client {
        Client::connect(self.addr).unwrap()
    }

    fn path(&self, file: &str) -> std::path::PathBuf {
        self.temp.path().join(file)
    }
}

/// Raw connection with a read timeout so a missing reply fails the test
fn raw_session(addr: SocketAddr) -> (TcpStream, BufReader<TcpStream>) {
    let stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let reader = BufReader::new(stream.try_clone().unwrap());
    (stream, reader)
}

fn read_reply(reader: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    line
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_session_scenarios() {
    let server = TestServer::start();
    let mut client = server.client();

    assert_eq!(client.send("set orders id1 shipped").unwrap(), "Key id1 added to orders");
    assert_eq!(client.send("get orders id1").unwrap(), "Value: shipped");
    assert_eq!(client.send("get orders missing").unwrap(), "No key 'missing' in 'orders'");
    assert_eq!(
        client.send("delete orders id1").unwrap(),
        "Key 'id1' was removed from 'orders'"
    );
    assert_eq!(client.send("get orders id1").unwrap(), "No key 'id1' in 'orders'");
    assert_eq!(client.send("foo bar").unwrap(), "Unknown command 'foo'.");
    assert_eq!(
        client.send("set orders id2 multi word value").unwrap(),
        "Key id2 added to orders"
    );
    assert_eq!(client.send("get orders id2").unwrap(), "Value: multi word value");
    assert_eq!(client.send("drop orders").unwrap(), "Drop collection 'orders'");
}

#[test]
fn test_blank_lines_get_no_reply() {
    let server = TestServer::start();
    let mut stream = TcpStream::connect(server.addr).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    stream.write_all(b"\n   \r\nget orders k\r\n").unwrap();

    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    assert_eq!(line, "No key 'k' in 'orders'\n");
}

#[test]
fn test_client_refuses_blank_request() {
    let server = TestServer::start();
    let mut client = server.client();

    assert!(matches!(client.send("   "), Err(CollError::Protocol(_))));
    // Session still usable
    assert_eq!(client.send("drop nothing").unwrap(), "Drop collection 'nothing'");
}

#[test]
fn test_failure_keeps_session_open() {
    let server = TestServer::start();
    let mut client = server.client();

    let response = client.send("set .. k v").unwrap();
    assert!(response.starts_with("Error: "));

    assert_eq!(client.send("set ok k v").unwrap(), "Key k added to ok");
}

#[test]
fn test_sessions_get_their_own_responses() {
    let server = TestServer::start();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let addr = server.addr;
            thread::spawn(move || {
                let mut client = Client::connect(addr).unwrap();
                let collection = format!("session{}", i);
                for j in 0..20 {
                    let value = format!("v{}-{}", i, j);
                    assert_eq!(
                        client.send(&format!("set {} k{} {}", collection, j, value)).unwrap(),
                        format!("Key k{} added to {}", j, collection)
                    );
                    assert_eq!(
                        client.send(&format!("get {} k{}", collection, j)).unwrap(),
                        format!("Value: {}", value)
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_shared_collection_from_many_sessions() {
    let server = TestServer::start();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let addr = server.addr;
            thread::spawn(move || {
                let mut client = Client::connect(addr).unwrap();
                client.send(&format!("set shared key{} value{}", i, i)).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let mut client = server.client();
    for i in 0..8 {
        assert_eq!(
            client.send(&format!("get shared key{}", i)).unwrap(),
            format!("Value: value{}", i)
        );
    }
}

#[test]
fn test_idle_sessions_do_not_block_new_ones() {
    let server = TestServer::start_with(|b| b.max_connections(16));

    // Connected but silent; each one holds a session thread
    let idle: Vec<TcpStream> = (0..8)
        .map(|_| TcpStream::connect(server.addr).unwrap())
        .collect();

    let (mut stream, mut reader) = raw_session(server.addr);
    stream.write_all(b"set orders id1 shipped\n").unwrap();
    assert_eq!(read_reply(&mut reader), "Key id1 added to orders\n");

    drop(idle);
}

#[test]
fn test_connections_over_limit_are_refused() {
    let server = TestServer::start_with(|b| b.max_connections(2));

    let (mut first, mut first_reader) = raw_session(server.addr);
    let (mut second, mut second_reader) = raw_session(server.addr);
    // Make sure both sessions are being served before the third arrives
    first.write_all(b"get a k\n").unwrap();
    assert_eq!(read_reply(&mut first_reader), "No key 'k' in 'a'\n");
    second.write_all(b"get b k\n").unwrap();
    assert_eq!(read_reply(&mut second_reader), "No key 'k' in 'b'\n");

    let (_third, mut third_reader) = raw_session(server.addr);
    assert_eq!(
        read_reply(&mut third_reader),
        format!("{}\n", TOO_MANY_CONNECTIONS)
    );
    assert_eq!(read_reply(&mut third_reader), "", "refused session is closed");

    // Freeing a slot lets a new session in
    drop(first);
    drop(first_reader);
    let mut accepted = None;
    for _ in 0..50 {
        let mut client = server.client();
        match client.send("get a k") {
            Ok(reply) if reply == "No key 'k' in 'a'" => {
                accepted = Some(reply);
                break;
            }
            _ => thread::sleep(Duration::from_millis(20)),
        }
    }
    assert!(accepted.is_some());
}

#[test]
fn test_io_failure_reported_and_session_survives() {
    let server = TestServer::start();
    fs::create_dir(server.path("orders.json")).unwrap();
    let mut client = server.client();

    let reply = client.send("set orders k v").unwrap();
    assert!(reply.starts_with("Error: "), "got {:?}", reply);

    assert_eq!(client.send("set other k v").unwrap(), "Key k added to other");
    assert_eq!(client.send("get other k").unwrap(), "Value: v");
}

#[test]
fn test_overlong_line_rejected_and_session_survives() {
    let server = TestServer::start_with(|b| b.max_line_bytes(64));
    let (mut stream, mut reader) = raw_session(server.addr);

    let mut request = format!("set orders big {}", "x".repeat(500)).into_bytes();
    request.extend_from_slice(b"\nget orders big\n");
    stream.write_all(&request).unwrap();

    assert!(read_reply(&mut reader).starts_with("Error: request line longer than 64 bytes"));
    assert_eq!(read_reply(&mut reader), "No key 'big' in 'orders'\n");
}

#[test]
fn test_bind_rejects_zero_connection_cap() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .listen_addr("127.0.0.1:0")
        .max_connections(0)
        .build();
    let engine = Arc::new(Engine::open(config.clone()).unwrap());

    assert!(matches!(Server::bind(config, engine), Err(CollError::Config(_))));
}
