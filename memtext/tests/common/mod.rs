use memtext::memcache::store::MemcStore;
use memtext::memcache_server::handler::TextHandler;
use memtext::memcache_server::reactor::{MemtextServerConfig, Reactor};
use memtext::memcache_server::runtime_builder::create_current_thread_runtime;
use memtext::server::timer::SystemTimer;
use memtextclt::MemcachedClient;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const SWEEP_INTERVAL: Duration = Duration::from_millis(50);

/// Server running on its own thread, on an ephemeral port. The thread is
/// detached and ends with the test process.
pub struct MemtextTestServer {
    addr: SocketAddr,
}

impl MemtextTestServer {
    pub fn start() -> MemtextTestServer {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let runtime = create_current_thread_runtime().unwrap();
            runtime.block_on(async move {
                let config = MemtextServerConfig::new(
                    IpAddr::V4(Ipv4Addr::LOCALHOST),
                    0,
                    128,
                    SWEEP_INTERVAL,
                    20,
                );
                let handler = TextHandler::new(MemcStore::new(Arc::new(SystemTimer::new())));
                let mut reactor = Reactor::bind(config, handler).unwrap();
                sender.send(reactor.local_addr().unwrap()).unwrap();
                reactor.run().await
            })
        });
        let addr = receiver.recv().unwrap();
        MemtextTestServer { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Sends `lines` on a fresh connection and returns the reply.
    pub fn request(&self, lines: &[&str]) -> String {
        MemcachedClient::connect(self.addr)
            .unwrap()
            .with_input_delay(Duration::from_millis(5))
            .resolve_request(lines)
            .unwrap()
    }
}
