mod common;

use common::MemtextTestServer;

fn cas_of(response: &str) -> u64 {
    let header = response.lines().next().unwrap();
    header.split(' ').nth(4).unwrap().parse().unwrap()
}

#[test]
fn cas_on_missing_key() {
    let server = MemtextTestServer::start();
    assert_eq!(
        server.request(&["cas no_key 15 0 5 1", "aaaaa"]),
        "NOT FOUND\r\n"
    );
}

#[test]
fn cas_ids_increase_across_keys() {
    let server = MemtextTestServer::start();
    server.request(&["set a 0 0 1", "x"]);
    server.request(&["set b 0 0 1", "y"]);
    let first = cas_of(&server.request(&["gets a"]));
    let second = cas_of(&server.request(&["gets b"]));
    assert!(second > first);
}

#[test]
fn cas_with_current_and_stale_id() {
    let server = MemtextTestServer::start();
    server.request(&["set key 0 0 3", "one"]);
    let current = cas_of(&server.request(&["gets key"]));

    let stale = format!("cas key 0 0 3 {}", current + 1);
    assert_eq!(server.request(&[&stale, "two"]), "EXISTS\r\n");
    assert_eq!(
        server.request(&["get key"]),
        "VALUE key 0 3\r\none\r\nEND\r\n"
    );

    let fresh = format!("cas key 4 0 3 {}", current);
    assert_eq!(server.request(&[&fresh, "two"]), "STORED\r\n");
    let response = server.request(&["gets key"]);
    assert!(response.starts_with("VALUE key 4 3 "));
    assert!(cas_of(&response) > current);
    assert!(response.ends_with("\r\ntwo\r\nEND\r\n"));
}
