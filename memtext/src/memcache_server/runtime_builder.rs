use super::handler::TextHandler;
use super::reactor::{MemtextServerConfig, Reactor};
use crate::memcache::store::MemcStore;
use crate::server::timer::Timer;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

fn get_worker_thread_name() -> String {
    static ATOMIC_ID: AtomicUsize = AtomicUsize::new(0);
    let id = ATOMIC_ID.fetch_add(1, Ordering::SeqCst);
    format!("memtextd-wrk-{}", id)
}

pub fn create_current_thread_runtime() -> io::Result<Runtime> {
    Builder::new_current_thread()
        .thread_name_fn(get_worker_thread_name)
        .enable_all()
        .build()
}

/// Serves clients on the calling thread until a fatal I/O error.
pub fn run_memtext_server(
    config: MemtextServerConfig,
    timer: Arc<dyn Timer + Send + Sync>,
) -> io::Result<()> {
    let runtime = create_current_thread_runtime()?;
    let handler = TextHandler::new(MemcStore::new(timer));
    runtime.block_on(async move {
        let mut reactor = Reactor::bind(config, handler)?;
        info!("Listening on {}", reactor.local_addr()?);
        reactor.run().await
    })
}
