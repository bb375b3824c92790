use bytes::BytesMut;
use futures::stream::{FuturesUnordered, StreamExt};
use socket2::{Domain, SockAddr, Socket, Type};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::{self, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, Instant};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, error, trace};

use super::handler::TextHandler;
use super::time_events::{TimeEvents, TimerAction, TimerOutcome};
use crate::protocol::text::decoder::MemcacheTextDecoder;
use crate::protocol::text::encoder::MemcacheTextEncoder;

const READ_BUFFER_CAPACITY: usize = 4096;

#[derive(Clone, Copy, Debug)]
pub struct MemtextServerConfig {
    listen_address: IpAddr,
    port: u16,
    listen_backlog: u32,
    expiration_check_interval: Duration,
    expiration_checks_per_cycle: usize,
}

impl MemtextServerConfig {
    pub fn new(
        listen_address: IpAddr,
        port: u16,
        listen_backlog: u32,
        expiration_check_interval: Duration,
        expiration_checks_per_cycle: usize,
    ) -> Self {
        MemtextServerConfig {
            listen_address,
            port,
            listen_backlog,
            expiration_check_interval,
            expiration_checks_per_cycle,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_address, self.port)
    }

    pub fn expiration_check_interval(&self) -> Duration {
        self.expiration_check_interval
    }

    pub fn expiration_checks_per_cycle(&self) -> usize {
        self.expiration_checks_per_cycle
    }
}

/// Accepted client: socket plus the bytes it sent that were not consumed yet
struct Connection {
    stream: TcpStream,
    addr: SocketAddr,
    decoder: MemcacheTextDecoder,
    buffer: BytesMut,
}

impl Connection {
    fn new(stream: TcpStream, addr: SocketAddr) -> Connection {
        Connection {
            stream,
            addr,
            decoder: MemcacheTextDecoder::new(),
            buffer: BytesMut::with_capacity(READ_BUFFER_CAPACITY),
        }
    }
}

/// Event that woke the reactor up
enum Readiness {
    Listener(io::Result<(TcpStream, SocketAddr)>),
    Client(usize, io::Result<()>),
    Timeout,
}

/// Single task event loop. It owns the listener, every connection, the store
/// (through the handler) and the timers, so requests are served one at a
/// time and run to completion.
pub struct Reactor {
    listener: TcpListener,
    connections: Vec<Connection>,
    handler: TextHandler,
    encoder: MemcacheTextEncoder,
    time_events: TimeEvents,
    config: MemtextServerConfig,
}

impl Reactor {
    /// Binds the listening socket, has to be called from within a tokio runtime.
    pub fn bind(config: MemtextServerConfig, handler: TextHandler) -> io::Result<Reactor> {
        let listener = get_tcp_listener(config.socket_addr(), config.listen_backlog)?;
        Ok(Reactor {
            listener,
            connections: Vec::new(),
            handler,
            encoder: MemcacheTextEncoder::new(),
            time_events: TimeEvents::new(),
            config,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(&mut self) -> io::Result<()> {
        self.time_events.schedule(
            self.config.expiration_check_interval,
            TimerAction::ExpirationSweep,
        );
        loop {
            match self.wait().await {
                Readiness::Listener(Ok((socket, addr))) => self.accept(socket, addr),
                Readiness::Listener(Err(err)) => error!("Accept error: {}", err),
                Readiness::Client(index, Ok(())) => self.serve_client(index).await,
                Readiness::Client(index, Err(err)) => {
                    debug!("Readiness error: {}", err);
                    self.drop_connection(index);
                }
                Readiness::Timeout => {}
            }
            self.process_time_events();
        }
    }

    async fn wait(&self) -> Readiness {
        let timeout = self.time_events.time_to_nearest(Instant::now());
        debug!("select with a timeout of {:?}", timeout);

        let mut readable: FuturesUnordered<_> = self
            .connections
            .iter()
            .enumerate()
            .map(|(index, connection)| async move { (index, connection.stream.readable().await) })
            .collect();

        tokio::select! {
            accepted = self.listener.accept() => Readiness::Listener(accepted),
            Some((index, result)) = readable.next() => Readiness::Client(index, result),
            _ = sleep(timeout.unwrap_or_default()), if timeout.is_some() => Readiness::Timeout,
        }
    }

    fn accept(&mut self, socket: TcpStream, addr: SocketAddr) {
        if let Err(err) = socket.set_nodelay(true) {
            error!("Can't set nodelay for {}: {}", addr, err);
            return;
        }
        debug!("New client connected: {}", addr);
        self.connections.push(Connection::new(socket, addr));
    }

    async fn serve_client(&mut self, index: usize) {
        match self.read_and_respond(index).await {
            Ok(true) => {}
            Ok(false) => self.drop_connection(index),
            Err(err) => {
                debug!("Error on client connection: {}", err);
                self.drop_connection(index);
            }
        }
    }

    /// Returns false once the peer closed the connection.
    async fn read_and_respond(&mut self, index: usize) -> io::Result<bool> {
        let Reactor {
            connections,
            handler,
            encoder,
            ..
        } = self;
        let connection = &mut connections[index];

        match connection.stream.try_read_buf(&mut connection.buffer) {
            Ok(0) => return Ok(false),
            Ok(read) => trace!("Read {} bytes from {}", read, connection.addr),
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(true),
            Err(err) => return Err(err),
        }

        let mut output = BytesMut::new();
        while let Some(request) = connection.decoder.decode(&mut connection.buffer)? {
            trace!("Got request {:?}", request);
            if let Some(response) = handler.handle_request(request) {
                encoder.encode(response, &mut output)?;
            }
        }

        if !output.is_empty() {
            connection.stream.write_all(&output).await?;
        }
        Ok(true)
    }

    fn drop_connection(&mut self, index: usize) {
        let connection = self.connections.swap_remove(index);
        debug!("Connection closed: {}", connection.addr);
    }

    fn process_time_events(&mut self) {
        let Reactor {
            time_events,
            handler,
            config,
            ..
        } = self;
        time_events.process(Instant::now(), |action| match action {
            TimerAction::ExpirationSweep => {
                let started = std::time::Instant::now();
                let stats = handler
                    .storage_mut()
                    .remove_expired(config.expiration_checks_per_cycle);
                debug!(
                    "Processed {} keys in {:.3} ms, evicted {}",
                    stats.checked,
                    started.elapsed().as_secs_f64() * 1000.0,
                    stats.evicted
                );
                TimerOutcome::Reschedule(config.expiration_check_interval)
            }
        });
    }
}

fn get_tcp_listener(addr: SocketAddr, listen_backlog: u32) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;

    debug!("Binding to addr: {:?}", addr);
    let sock_addr = SockAddr::from(addr);
    if let Err(err) = socket.bind(&sock_addr) {
        error!("Can't bind to: {:?}, err {:?}", addr, err);
        return Err(err);
    }

    if let Err(err) = socket.listen(listen_backlog as i32) {
        error!("Listen error: {:?}", err);
        return Err(err);
    }

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
