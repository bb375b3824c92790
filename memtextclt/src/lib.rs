//! Blocking memcached text protocol client used by the integration tests and
//! the load generator.

use log::{debug, trace};
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

/// Pause after every line written, gives the server time to react to
/// partial input.
pub const DEFAULT_INPUT_DELAY: Duration = Duration::from_millis(20);

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Response lines after which the server has nothing more to say
pub const TERMINATION_MESSAGES: [&str; 7] = [
    "END",
    "ERROR",
    "STORED",
    "NOT STORED",
    "EXISTS",
    "NOT FOUND",
    "CLIENT_ERROR bad command line format",
];

pub fn is_termination_message(line: &str) -> bool {
    TERMINATION_MESSAGES.contains(&line.trim())
}

pub struct MemcachedClient {
    stream: TcpStream,
    input_delay: Duration,
}

impl MemcachedClient {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<MemcachedClient> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(Some(DEFAULT_READ_TIMEOUT))?;
        stream.set_nodelay(true)?;
        Ok(MemcachedClient {
            stream,
            input_delay: DEFAULT_INPUT_DELAY,
        })
    }

    pub fn with_input_delay(mut self, input_delay: Duration) -> MemcachedClient {
        self.input_delay = input_delay;
        self
    }

    /// Writes every line followed by `\r\n`, then returns everything the
    /// server answered up to and including the first termination message.
    /// The connection is closed afterwards.
    pub fn resolve_request(mut self, lines: &[&str]) -> io::Result<String> {
        for line in lines {
            trace!("Sending {:?}", line);
            self.stream.write_all(line.as_bytes())?;
            self.stream.write_all(b"\r\n")?;
            self.stream.flush()?;
            thread::sleep(self.input_delay);
        }
        let response = self.read_response()?;
        debug!("Received {:?}", response);
        Ok(response)
    }

    fn read_response(&mut self) -> io::Result<String> {
        let mut reader = BufReader::new(&self.stream);
        let mut buffer = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before the response was complete",
                ));
            }
            buffer.push_str(&line);
            if is_termination_message(&line) {
                return Ok(buffer);
            }
        }
    }
}
