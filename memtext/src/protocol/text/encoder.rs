use super::ProtocolError;
use crate::cache::error::CacheError;
use bytes::{BufMut, Bytes, BytesMut};
use std::io;
use tokio_util::codec::Encoder;

const LINE_END: &[u8] = b"\r\n";

/// One `VALUE` block of a retrieval response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedValue {
    pub key: Bytes,
    pub flags: Bytes,
    pub value: Bytes,
    /// Present only for `gets`
    pub cas: Option<u64>,
}

/// Server response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextResponse {
    Values(Vec<RetrievedValue>),
    Stored,
    NotStored,
    Exists,
    NotFound,
    Error(ProtocolError),
}

pub fn storage_error_to_response(err: CacheError) -> TextResponse {
    match err {
        CacheError::NotFound => TextResponse::NotFound,
        CacheError::KeyExists => TextResponse::Exists,
        CacheError::NotStored => TextResponse::NotStored,
    }
}

fn protocol_error_message(err: ProtocolError) -> &'static str {
    match err {
        ProtocolError::UnknownCommand => "ERROR",
        ProtocolError::BadCommandLineFormat => "CLIENT_ERROR bad command line format",
        ProtocolError::BadDataChunk => "CLIENT_ERROR bad data chunk\r\nERROR",
    }
}

#[derive(Default)]
pub struct MemcacheTextEncoder {}

impl MemcacheTextEncoder {
    pub fn new() -> MemcacheTextEncoder {
        MemcacheTextEncoder {}
    }

    /// Exact number of bytes `msg` encodes to
    pub fn get_length(&self, msg: &TextResponse) -> usize {
        match msg {
            TextResponse::Values(values) => {
                values.iter().map(Self::value_block_length).sum::<usize>() + "END\r\n".len()
            }
            TextResponse::Error(err) => protocol_error_message(*err).len() + LINE_END.len(),
            TextResponse::Stored
            | TextResponse::NotStored
            | TextResponse::Exists
            | TextResponse::NotFound => Self::status_line(msg).len() + LINE_END.len(),
        }
    }

    pub fn encode_message(&self, msg: &TextResponse) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.get_length(msg));
        self.write_message(msg, &mut dst);
        dst.freeze()
    }

    fn write_message(&self, msg: &TextResponse, dst: &mut BytesMut) {
        match msg {
            TextResponse::Values(values) => {
                for value in values {
                    Self::write_value_block(value, dst);
                }
                dst.put_slice(b"END");
            }
            TextResponse::Error(err) => dst.put_slice(protocol_error_message(*err).as_bytes()),
            _ => dst.put_slice(Self::status_line(msg).as_bytes()),
        }
        dst.put_slice(LINE_END);
    }

    fn status_line(msg: &TextResponse) -> &'static str {
        match msg {
            TextResponse::Stored => "STORED",
            TextResponse::NotStored => CacheError::NotStored.to_static_string(),
            TextResponse::Exists => CacheError::KeyExists.to_static_string(),
            TextResponse::NotFound => CacheError::NotFound.to_static_string(),
            TextResponse::Values(_) | TextResponse::Error(_) => "",
        }
    }

    /// Length and optional cas fields that follow the flags
    fn value_line_tail(value: &RetrievedValue) -> String {
        match value.cas {
            Some(cas) => format!(" {} {}", value.value.len(), cas),
            None => format!(" {}", value.value.len()),
        }
    }

    fn value_block_length(value: &RetrievedValue) -> usize {
        "VALUE ".len()
            + value.key.len()
            + 1
            + value.flags.len()
            + Self::value_line_tail(value).len()
            + LINE_END.len()
            + value.value.len()
            + LINE_END.len()
    }

    fn write_value_block(value: &RetrievedValue, dst: &mut BytesMut) {
        dst.put_slice(b"VALUE ");
        dst.put_slice(&value.key);
        dst.put_u8(b' ');
        dst.put_slice(&value.flags);
        dst.put_slice(Self::value_line_tail(value).as_bytes());
        dst.put_slice(LINE_END);
        dst.put_slice(&value.value);
        dst.put_slice(LINE_END);
    }
}

impl Encoder<TextResponse> for MemcacheTextEncoder {
    type Error = io::Error;

    fn encode(&mut self, msg: TextResponse, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(self.get_length(&msg));
        self.write_message(&msg, dst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn encode(msg: TextResponse) -> Bytes {
        let encoder = MemcacheTextEncoder::new();
        let data = encoder.encode_message(&msg);
        assert_eq!(data.len(), encoder.get_length(&msg));
        data
    }

    fn value(key: &'static str, flags: &'static str, data: &'static str) -> RetrievedValue {
        RetrievedValue {
            key: Bytes::from(key),
            flags: Bytes::from(flags),
            value: Bytes::from(data),
            cas: None,
        }
    }

    #[test_case(TextResponse::Stored, "STORED\r\n")]
    #[test_case(TextResponse::NotStored, "NOT STORED\r\n")]
    #[test_case(TextResponse::Exists, "EXISTS\r\n")]
    #[test_case(TextResponse::NotFound, "NOT FOUND\r\n")]
    #[test_case(TextResponse::Error(ProtocolError::UnknownCommand), "ERROR\r\n" ; "unknown command")]
    #[test_case(
        TextResponse::Error(ProtocolError::BadCommandLineFormat),
        "CLIENT_ERROR bad command line format\r\n" ;
        "bad command line format"
    )]
    #[test_case(
        TextResponse::Error(ProtocolError::BadDataChunk),
        "CLIENT_ERROR bad data chunk\r\nERROR\r\n" ;
        "bad data chunk"
    )]
    fn status_lines(msg: TextResponse, expected: &'static str) {
        assert_eq!(encode(msg), Bytes::from(expected));
    }

    #[test]
    fn empty_retrieval() {
        assert_eq!(encode(TextResponse::Values(Vec::new())), Bytes::from("END\r\n"));
    }

    #[test]
    fn single_value() {
        let data = encode(TextResponse::Values(vec![value("key1", "15", "check")]));
        assert_eq!(data, Bytes::from("VALUE key1 15 5\r\ncheck\r\nEND\r\n"));
    }

    #[test]
    fn values_with_cas() {
        let mut first = value("a", "0", "x");
        first.cas = Some(7);
        let mut second = value("b", "00012", "");
        second.cas = Some(12);
        let data = encode(TextResponse::Values(vec![first, second]));
        assert_eq!(
            data,
            Bytes::from("VALUE a 0 1 7\r\nx\r\nVALUE b 00012 0 12\r\n\r\nEND\r\n")
        );
    }

    #[test]
    fn tokio_encoder_appends() {
        let mut encoder = MemcacheTextEncoder::new();
        let mut dst = BytesMut::new();
        encoder.encode(TextResponse::Stored, &mut dst).unwrap();
        encoder.encode(TextResponse::Exists, &mut dst).unwrap();
        assert_eq!(&dst[..], b"STORED\r\nEXISTS\r\n");
    }

    #[test_case(CacheError::NotFound, TextResponse::NotFound)]
    #[test_case(CacheError::KeyExists, TextResponse::Exists)]
    #[test_case(CacheError::NotStored, TextResponse::NotStored)]
    fn storage_errors(err: CacheError, expected: TextResponse) {
        assert_eq!(storage_error_to_response(err), expected);
    }
}
