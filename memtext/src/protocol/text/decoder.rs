use super::command::{parse_command_line, CommandLine, RetrievalCommand, StorageCommand};
use super::ProtocolError;
use bytes::{Bytes, BytesMut};
use std::io;
use std::mem;
use tokio_util::codec::Decoder;

/// Bytes that terminate a data block on top of its declared length
pub const DATA_TERMINATOR_ALLOWANCE: usize = 2;

/// Client request
#[derive(Debug, PartialEq, Eq)]
pub enum TextRequest {
    Retrieval(RetrievalCommand),
    Storage {
        command: StorageCommand,
        value: Bytes,
    },
    Error(ProtocolError),
}

#[derive(Debug, PartialEq, Eq)]
enum ConnectionState {
    AwaitingCommand,
    AwaitingData(StorageCommand),
}

/// Per connection state machine: a command line first, then for storage
/// commands a data block of the declared length.
pub struct MemcacheTextDecoder {
    state: ConnectionState,
    data_block: BytesMut,
}

impl MemcacheTextDecoder {
    pub fn new() -> MemcacheTextDecoder {
        MemcacheTextDecoder {
            state: ConnectionState::AwaitingCommand,
            data_block: BytesMut::new(),
        }
    }

    /// True while the next bytes are expected to be a command line
    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::AwaitingCommand
    }

    /// Declared data block length of the pending storage command
    pub fn expected_length(&self) -> Option<usize> {
        match &self.state {
            ConnectionState::AwaitingCommand => None,
            ConnectionState::AwaitingData(command) => Some(command.length),
        }
    }

    fn reset(&mut self) -> Option<StorageCommand> {
        self.data_block.clear();
        match mem::replace(&mut self.state, ConnectionState::AwaitingCommand) {
            ConnectionState::AwaitingData(command) => Some(command),
            ConnectionState::AwaitingCommand => None,
        }
    }

    fn decode_command_line(&mut self, src: &mut BytesMut) -> Option<TextRequest> {
        let end = src.iter().position(|byte| *byte == b'\n')?;
        let mut line = src.split_to(end + 1);
        line.truncate(end);
        if line.last() == Some(&b'\r') {
            line.truncate(end - 1);
        }
        let line = line.freeze();

        match parse_command_line(&line) {
            Ok(CommandLine::Retrieval(command)) => Some(TextRequest::Retrieval(command)),
            Ok(CommandLine::Storage(command)) => {
                trace!("Awaiting {} bytes of data", command.length);
                self.state = ConnectionState::AwaitingData(command);
                None
            }
            Err(err) => {
                debug!("Rejected command line {:?}: {:?}", line, err);
                Some(TextRequest::Error(err))
            }
        }
    }

    fn decode_data_block(&mut self, src: &mut BytesMut, expected: usize) -> Option<TextRequest> {
        // one line at a time so that a command pipelined after the block
        // stays in the read buffer
        let chunk_end = src
            .iter()
            .position(|byte| *byte == b'\n')
            .map_or(src.len(), |position| position + 1);
        self.data_block.extend_from_slice(&src.split_to(chunk_end));

        let received = self.data_block.len();
        if received > expected + DATA_TERMINATOR_ALLOWANCE {
            debug!(
                "Data block of {} bytes exceeds declared length {}",
                received, expected
            );
            self.reset();
            return Some(TextRequest::Error(ProtocolError::BadDataChunk));
        }

        if received == expected + DATA_TERMINATOR_ALLOWANCE {
            let value = self.data_block.split_to(expected).freeze();
            return self
                .reset()
                .map(|command| TextRequest::Storage { command, value });
        }
        None
    }
}

impl Default for MemcacheTextDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for MemcacheTextDecoder {
    type Item = TextRequest;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if src.is_empty() {
                return Ok(None);
            }
            let request = match self.expected_length() {
                None => {
                    if !src.contains(&b'\n') {
                        return Ok(None);
                    }
                    self.decode_command_line(src)
                }
                Some(expected) => self.decode_data_block(src, expected),
            };
            if request.is_some() {
                return Ok(request);
            }
        }
    }
}
