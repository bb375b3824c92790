//! memcached text protocol: command line validation, the per connection
//! framing state machine and response encoding.

pub mod command;
pub mod decoder;
pub mod encoder;

/// Errors reported to the client, none of them closes the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// First token is not a supported command
    UnknownCommand,
    /// Storage command line with wrong field count or field shape
    BadCommandLineFormat,
    /// Data block longer than the declared length
    BadDataChunk,
}
