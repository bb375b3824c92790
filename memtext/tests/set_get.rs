mod common;

use common::MemtextTestServer;

#[test]
fn get_of_never_stored_key() {
    let server = MemtextTestServer::start();
    assert_eq!(server.request(&["get never_stored"]), "END\r\n");
}

#[test]
fn set_then_get() {
    let server = MemtextTestServer::start();
    assert_eq!(
        server.request(&["set key1 15 0 5", "check"]),
        "STORED\r\n"
    );
    assert_eq!(
        server.request(&["get key1"]),
        "VALUE key1 15 5\r\ncheck\r\nEND\r\n"
    );
}

#[test]
fn get_multiple_keys_in_request_order() {
    let server = MemtextTestServer::start();
    server.request(&["set a 1 0 1", "x"]);
    server.request(&["set b 2 0 1", "y"]);
    assert_eq!(
        server.request(&["get b missing a"]),
        "VALUE b 2 1\r\ny\r\nVALUE a 1 1\r\nx\r\nEND\r\n"
    );
}

#[test]
fn set_overwrites() {
    let server = MemtextTestServer::start();
    server.request(&["set key 1 0 3", "old"]);
    assert_eq!(server.request(&["set key 2 0 3", "new"]), "STORED\r\n");
    assert_eq!(
        server.request(&["get key"]),
        "VALUE key 2 3\r\nnew\r\nEND\r\n"
    );
}

#[test]
fn noreply_is_silent() {
    let server = MemtextTestServer::start();
    assert_eq!(
        server.request(&["set key 0 0 5 noreply", "quiet", "get key"]),
        "VALUE key 0 5\r\nquiet\r\nEND\r\n"
    );
}

#[test]
fn many_values() {
    let server = MemtextTestServer::start();
    let mut lines = Vec::new();
    for idx in 0..50 {
        lines.push(format!("set key_{} {} 0 {} noreply", idx, idx, idx.to_string().len()));
        lines.push(idx.to_string());
    }
    lines.push(String::from("get key_0 key_49"));
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    assert_eq!(
        server.request(&lines),
        "VALUE key_0 0 1\r\n0\r\nVALUE key_49 49 2\r\n49\r\nEND\r\n"
    );
}
