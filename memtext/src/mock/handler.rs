use crate::memcache_server::handler::TextHandler;
use crate::mock::mock_server::{create_server, MockSystemTimer};
use crate::protocol::text::decoder::{MemcacheTextDecoder, TextRequest};
use crate::protocol::text::encoder::{MemcacheTextEncoder, TextResponse};
use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use tokio_util::codec::Decoder;

pub struct TextHandlerWithTimer {
    pub handler: TextHandler,
    pub timer: Arc<MockSystemTimer>,
}

impl TextHandlerWithTimer {
    pub fn new(handler: TextHandler, timer: Arc<MockSystemTimer>) -> TextHandlerWithTimer {
        TextHandlerWithTimer { handler, timer }
    }

    pub fn handle_request(&mut self, req: TextRequest) -> Option<TextResponse> {
        self.handler.handle_request(req)
    }
}

pub fn create_handler() -> TextHandlerWithTimer {
    let server = create_server();
    TextHandlerWithTimer::new(TextHandler::new(server.storage), server.timer)
}

/// Decodes raw protocol text into the requests it contains.
pub fn decode_requests(input: &str) -> Vec<TextRequest> {
    let mut decoder = MemcacheTextDecoder::new();
    let mut src = BytesMut::from(input);
    let mut requests = Vec::new();
    while let Ok(Some(request)) = decoder.decode(&mut src) {
        requests.push(request);
    }
    requests
}

/// Runs raw protocol text through decoder, handler and encoder and returns
/// everything the server would write back.
pub fn execute(handler: &mut TextHandlerWithTimer, input: &str) -> String {
    let encoder = MemcacheTextEncoder::new();
    let mut output = BytesMut::new();
    for request in decode_requests(input) {
        if let Some(response) = handler.handle_request(request) {
            output.extend_from_slice(&encoder.encode_message(&response));
        }
    }
    String::from_utf8_lossy(&output).into_owned()
}

pub fn insert_value(handler: &mut TextHandlerWithTimer, key: &str, value: &str) {
    insert_value_with_expire(handler, key, value, 0)
}

pub fn insert_value_with_expire(
    handler: &mut TextHandlerWithTimer,
    key: &str,
    value: &str,
    time_to_live: i64,
) {
    let input = format!(
        "set {} 0 {} {} noreply\r\n{}\r\n",
        key,
        time_to_live,
        value.len(),
        value
    );
    assert_eq!(execute(handler, &input), "");
}

pub fn get_value(handler: &mut TextHandlerWithTimer, key: &str) -> Option<Bytes> {
    handler
        .handler
        .storage_mut()
        .get(&Bytes::copy_from_slice(key.as_bytes()))
        .ok()
        .map(|record| record.value().clone())
}
