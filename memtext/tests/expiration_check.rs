mod common;

use common::{MemtextTestServer, SWEEP_INTERVAL};
use std::thread;
use std::time::Duration;

#[test]
fn negative_ttl_is_immediately_unreadable() {
    let server = MemtextTestServer::start();
    assert_eq!(server.request(&["set key 0 -1 5", "value"]), "STORED\r\n");
    assert_eq!(server.request(&["get key"]), "END\r\n");
}

#[test]
fn zero_ttl_survives_sweeps() {
    let server = MemtextTestServer::start();
    server.request(&["set key 0 0 5", "value"]);
    thread::sleep(SWEEP_INTERVAL * 4);
    assert_eq!(
        server.request(&["get key"]),
        "VALUE key 0 5\r\nvalue\r\nEND\r\n"
    );
}

#[test]
fn value_expires_after_ttl() {
    let server = MemtextTestServer::start();
    server.request(&["set key 0 1 5", "value"]);
    assert_eq!(
        server.request(&["get key"]),
        "VALUE key 0 5\r\nvalue\r\nEND\r\n"
    );
    thread::sleep(Duration::from_millis(1200));
    assert_eq!(server.request(&["get key"]), "END\r\n");
    assert_eq!(server.request(&["add key 0 0 3", "new"]), "STORED\r\n");
}
