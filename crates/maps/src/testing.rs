//! Shared test fixtures

use std::net::TcpListener;
use std::thread;

/// Base URL of a server that accepts connections and never answers
pub(crate) fn stalled_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stalled listener");
    let addr = listener.local_addr().expect("listener address");
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });
    format!("http://{addr}")
}
